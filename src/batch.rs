//! Batch analysis of many contract files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use globset::{Glob, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::clause_category::most_common;
use crate::analysis::{ContractAnalyzer, RiskTier};

/// Texts shorter than this many characters are rejected.
pub const MIN_CONTRACT_CHARS: usize = 100;

/// Formats that need an external converter before analysis.
pub const UNSUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];

/// Patterns used by [`collect_inputs`] when none are given.
pub const DEFAULT_INPUT_PATTERNS: &[&str] = &["*.txt", "*.md"];

/// Number of party names kept per contract.
const PARTIES_KEPT: usize = 3;

/// Key figures for one successfully analyzed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedContract {
    /// File name.
    pub file: String,
    /// Detected contract type.
    pub contract_type: String,
    /// Classifier confidence.
    pub confidence: f64,
    /// Number of parties found.
    pub parties_count: usize,
    /// First few party names.
    pub parties: Vec<String>,
    /// Number of dates found.
    pub dates_found: usize,
    /// Number of monetary amounts found.
    pub amounts_found: usize,
    /// Number of obligation sentences.
    pub total_obligations: usize,
    /// Number of scored clauses.
    pub total_clauses_analyzed: usize,
    /// High-risk clause count.
    pub high_risk_clauses: usize,
    /// Medium-risk clause count.
    pub medium_risk_clauses: usize,
    /// Contract-level risk.
    pub overall_risk: RiskTier,
    /// Missing compliance rules.
    pub compliance_issues: usize,
    /// Text length in characters.
    pub file_size_chars: usize,
}

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum BatchEntry {
    /// The file was analyzed.
    Processed(ProcessedContract),
    /// The file could not be analyzed.
    Failed {
        /// File name.
        file: String,
        /// Why it failed.
        error: String,
    },
}

impl BatchEntry {
    /// File name of the entry.
    pub fn file(&self) -> &str {
        match self {
            Self::Processed(contract) => &contract.file,
            Self::Failed { file, .. } => file,
        }
    }
}

/// Aggregate figures over the processed contracts.
///
/// Every field is independent of the order in which files were processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of processed contracts.
    pub total_analyzed: usize,
    /// Contracts with High overall risk.
    pub high_risk_contracts: usize,
    /// Contracts with Medium overall risk.
    pub medium_risk_contracts: usize,
    /// Contracts with Low overall risk.
    pub low_risk_contracts: usize,
    /// Contract count per type.
    pub contract_type_distribution: BTreeMap<String, usize>,
    /// Most frequent type; ties go to the alphabetically first name.
    pub most_common_type: Option<String>,
    /// Mean missing compliance rules per contract, two decimals.
    pub average_compliance_issues: f64,
    /// Mean parties per contract, one decimal.
    pub average_parties_per_contract: f64,
    /// High-risk clauses across all contracts.
    pub total_high_risk_clauses: usize,
}

impl BatchSummary {
    /// Summarizes the processed entries; failed entries are ignored.
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let processed: Vec<&ProcessedContract> = entries
            .iter()
            .filter_map(|entry| match entry {
                BatchEntry::Processed(contract) => Some(contract),
                BatchEntry::Failed { .. } => None,
            })
            .collect();
        if processed.is_empty() {
            return Self::default();
        }

        let count_at = |tier: RiskTier| processed.iter().filter(|c| c.overall_risk == tier).count();
        let mut contract_type_distribution = BTreeMap::new();
        for contract in &processed {
            *contract_type_distribution
                .entry(contract.contract_type.clone())
                .or_insert(0) += 1;
        }

        let compliance_total: usize = processed.iter().map(|c| c.compliance_issues).sum();
        let parties_total: usize = processed.iter().map(|c| c.parties_count).sum();

        Self {
            total_analyzed: processed.len(),
            high_risk_contracts: count_at(RiskTier::High),
            medium_risk_contracts: count_at(RiskTier::Medium),
            low_risk_contracts: count_at(RiskTier::Low),
            most_common_type: most_common(&contract_type_distribution),
            contract_type_distribution,
            average_compliance_issues: mean(compliance_total, processed.len(), 2),
            average_parties_per_contract: mean(parties_total, processed.len(), 1),
            total_high_risk_clauses: processed.iter().map(|c| c.high_risk_clauses).sum(),
        }
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn mean(total: usize, count: usize, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    (total as f64 / count as f64 * scale).round() / scale
}

/// Result of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Batch identifier, `YYYYmmdd_HHMMSS_<8 hex digits>`.
    pub batch_id: String,
    /// When the batch started.
    pub timestamp: DateTime<Utc>,
    /// Number of input files.
    pub total_files: usize,
    /// Files analyzed successfully.
    pub processed_count: usize,
    /// Files that failed.
    pub failed_count: usize,
    /// Per-file outcomes in input order.
    pub contracts: Vec<BatchEntry>,
    /// Aggregate figures.
    pub summary: BatchSummary,
}

impl BatchReport {
    /// File name used by [`write_report`](Self::write_report).
    pub fn file_name(&self) -> String {
        format!("batch_analysis_{}.json", self.batch_id)
    }

    /// Writes the report as pretty JSON into `dir`, creating it if needed.
    pub fn write_report(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self).context("Failed to serialize batch report")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write batch report: {}", path.display()))?;
        info!(path = %path.display(), "Wrote batch report");
        Ok(path)
    }
}

/// Runs the analyzer over many files.
#[derive(Debug, Clone, Copy)]
pub struct BatchProcessor<'a> {
    analyzer: &'a ContractAnalyzer,
}

impl<'a> BatchProcessor<'a> {
    /// Creates a processor sharing `analyzer`.
    pub fn new(analyzer: &'a ContractAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Analyzes every path in order. Per-file failures are recorded, not raised.
    pub fn process<P: AsRef<Path>>(&self, paths: &[P]) -> BatchReport {
        let timestamp = Utc::now();
        let contracts: Vec<BatchEntry> = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                match self.process_file(path) {
                    Ok(contract) => BatchEntry::Processed(contract),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping contract");
                        BatchEntry::Failed {
                            file: file_name(path),
                            error: format!("{e:#}"),
                        }
                    }
                }
            })
            .collect();

        let processed_count = contracts
            .iter()
            .filter(|entry| matches!(entry, BatchEntry::Processed(_)))
            .count();

        BatchReport {
            batch_id: batch_id(timestamp),
            timestamp,
            total_files: paths.len(),
            processed_count,
            failed_count: contracts.len() - processed_count,
            summary: BatchSummary::from_entries(&contracts),
            contracts,
        }
    }

    /// Analyzes one file.
    pub fn process_file(&self, path: &Path) -> Result<ProcessedContract> {
        let text = read_contract_text(path)?;
        let char_count = text.chars().count();
        if text.trim().chars().count() < MIN_CONTRACT_CHARS {
            bail!("File too small or empty");
        }

        let file = file_name(path);
        let analysis = self.analyzer.analyze(&file, &text);
        debug!(file = %file, clauses = analysis.clauses.len(), "Processed contract");

        Ok(ProcessedContract {
            file,
            contract_type: analysis.classification.contract_type.clone(),
            confidence: analysis.classification.confidence,
            parties_count: analysis.entities.parties.len(),
            parties: analysis
                .entities
                .parties
                .iter()
                .take(PARTIES_KEPT)
                .cloned()
                .collect(),
            dates_found: analysis.entities.dates.len(),
            amounts_found: analysis.entities.amounts.len(),
            total_obligations: analysis.entities.obligations.len(),
            total_clauses_analyzed: analysis.clauses.len(),
            high_risk_clauses: analysis.verdict.high_count,
            medium_risk_clauses: analysis.verdict.medium_count,
            overall_risk: analysis.verdict.overall_risk,
            compliance_issues: analysis.compliance.missing_count,
            file_size_chars: char_count,
        })
    }
}

/// Reads a contract as text: UTF-8, falling back to Latin-1.
///
/// Binary office formats are rejected.
pub fn read_contract_text(path: &Path) -> Result<String> {
    if let Some(ext) = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
    {
        if UNSUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            bail!("Unsupported file type: .{ext} (convert to plain text first)");
        }
    }

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!(path = %path.display(), "Not UTF-8, decoding as Latin-1");
            e.into_bytes().into_iter().map(char::from).collect()
        }
    })
}

/// Lists files under `dir` (recursively) whose relative path or file name
/// matches any of `patterns`, sorted by path. Symlinked directories are
/// not descended into.
pub fn collect_inputs(dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut builder = GlobSetBuilder::new();
    if patterns.is_empty() {
        for pattern in DEFAULT_INPUT_PATTERNS {
            builder.add(Glob::new(pattern)?);
        }
    } else {
        for pattern in patterns {
            builder.add(
                Glob::new(pattern).with_context(|| format!("Invalid input pattern: {pattern}"))?,
            );
        }
    }
    let globs = builder.build().context("Failed to build input patterns")?;

    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current)
            .with_context(|| format!("Failed to read directory: {}", current.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read directory: {}", current.display()))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .with_context(|| format!("Failed to read file type: {}", path.display()))?;
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            let relative = path.strip_prefix(dir).unwrap_or(&path);
            let name_matches = path.file_name().is_some_and(|name| globs.is_match(name));
            if name_matches || globs.is_match(relative) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn batch_id(timestamp: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", timestamp.format("%Y%m%d_%H%M%S"), &suffix[..8])
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::AnalysisConfig;

    const RISKY: &str = "This Service Agreement is made between Acme Private Limited and Beta Traders LLP.\n\
        The Service Provider shall indemnify and hold harmless the Client against all claims.\n\
        Disputes shall be resolved by arbitration in Mumbai under the laws of India.\n";

    fn analyzer() -> ContractAnalyzer {
        ContractAnalyzer::new(&AnalysisConfig::default()).unwrap()
    }

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn processes_and_records_failures() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "msa.txt", RISKY.as_bytes());
        let tiny = write(&dir, "tiny.txt", b"Too short.");
        let pdf = write(&dir, "scan.pdf", b"%PDF-1.4");
        let missing = dir.path().join("absent.txt");

        let analyzer = analyzer();
        let report = BatchProcessor::new(&analyzer).process(&[good, tiny, pdf, missing]);

        assert_eq!(report.total_files, 4);
        assert_eq!(report.processed_count, 1);
        assert_eq!(report.failed_count, 3);
        match &report.contracts[0] {
            BatchEntry::Processed(contract) => {
                assert_eq!(contract.file, "msa.txt");
                assert_eq!(contract.overall_risk, RiskTier::High);
                assert!(contract.high_risk_clauses >= 1);
            }
            other => panic!("expected processed entry, got {other:?}"),
        }
        match &report.contracts[1] {
            BatchEntry::Failed { error, .. } => assert_eq!(error, "File too small or empty"),
            other => panic!("expected failure, got {other:?}"),
        }
        match &report.contracts[2] {
            BatchEntry::Failed { error, .. } => assert!(error.contains("Unsupported file type: .pdf")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(report.summary.total_analyzed, 1);
        assert_eq!(report.summary.high_risk_contracts, 1);
    }

    #[test]
    fn latin1_fallback() {
        let dir = TempDir::new().unwrap();
        let mut bytes = RISKY.as_bytes().to_vec();
        bytes.extend_from_slice(b"Signed at Caf\xe9 Noir.\n");
        let path = write(&dir, "latin1.txt", &bytes);
        let text = read_contract_text(&path).unwrap();
        assert!(text.ends_with("Signed at Café Noir.\n"));
    }

    #[test]
    fn report_is_written_as_json() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "msa.txt", RISKY.as_bytes());
        let analyzer = analyzer();
        let report = BatchProcessor::new(&analyzer).process(&[good]);

        let out = report.write_report(&dir.path().join("out")).unwrap();
        assert!(out
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("batch_analysis_"));
        let parsed: BatchReport = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn collect_inputs_filters_by_pattern() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.txt", b"x");
        write(&dir, "b.pdf", b"x");
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.md"), b"x").unwrap();

        let found = collect_inputs(dir.path(), &[]).unwrap();
        let names: Vec<String> = found.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["a.txt", "c.md"]);

        let found = collect_inputs(dir.path(), &["*.pdf".to_string()]).unwrap();
        assert_eq!(found.len(), 1);
        assert!(collect_inputs(dir.path(), &["[".to_string()]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn collect_inputs_does_not_follow_directory_symlinks() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("c.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path(), nested.join("loop")).unwrap();

        let found = collect_inputs(dir.path(), &[]).unwrap();
        assert_eq!(found, [nested.join("c.txt")]);
    }

    #[test]
    fn batches_started_together_get_distinct_reports() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "msa.txt", RISKY.as_bytes());
        let analyzer = analyzer();
        let processor = BatchProcessor::new(&analyzer);
        let first = processor.process(&[&good]);
        let second = processor.process(&[&good]);

        assert_ne!(first.file_name(), second.file_name());
        let (stamp, suffix) = first.batch_id.rsplit_once('_').unwrap();
        assert_eq!(stamp.len(), "20260101_120000".len());
        assert_eq!(suffix.len(), 8);

        let out = dir.path().join("out");
        let first_path = first.write_report(&out).unwrap();
        let second_path = second.write_report(&out).unwrap();
        assert_ne!(first_path, second_path);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
    }

    #[test]
    fn empty_summary() {
        let summary = BatchSummary::from_entries(&[BatchEntry::Failed {
            file: "x".to_string(),
            error: "e".to_string(),
        }]);
        assert_eq!(summary, BatchSummary::default());
    }

    fn contract(contract_type: &str, risk: RiskTier, parties: usize) -> BatchEntry {
        BatchEntry::Processed(ProcessedContract {
            file: format!("{contract_type}.txt"),
            contract_type: contract_type.to_string(),
            confidence: 1.0,
            parties_count: parties,
            parties: Vec::new(),
            dates_found: 0,
            amounts_found: 0,
            total_obligations: 0,
            total_clauses_analyzed: 3,
            high_risk_clauses: usize::from(risk == RiskTier::High),
            medium_risk_clauses: 0,
            overall_risk: risk,
            compliance_issues: parties,
            file_size_chars: 200,
        })
    }

    #[test]
    fn most_common_type_breaks_ties_by_name() {
        let summary = BatchSummary::from_entries(&[
            contract("nda", RiskTier::Low, 2),
            contract("employment", RiskTier::High, 2),
        ]);
        assert_eq!(summary.most_common_type.as_deref(), Some("employment"));
        assert_eq!(summary.average_parties_per_contract, 2.0);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn entry() -> impl Strategy<Value = BatchEntry> {
            (
                proptest::sample::select(vec!["nda", "lease", "service_agreement"]),
                proptest::sample::select(RiskTier::ALL.to_vec()),
                0usize..5,
            )
                .prop_map(|(t, r, p)| contract(t, r, p))
        }

        proptest! {
            #[test]
            fn summary_is_order_independent(
                entries in proptest::collection::vec(entry(), 0..12),
                seed in any::<u64>(),
            ) {
                let mut shuffled = entries.clone();
                // Deterministic rotation keyed on the seed.
                if !shuffled.is_empty() {
                    let k = (seed % shuffled.len() as u64) as usize;
                    shuffled.rotate_left(k);
                    shuffled.reverse();
                }
                prop_assert_eq!(
                    BatchSummary::from_entries(&entries),
                    BatchSummary::from_entries(&shuffled)
                );
            }
        }
    }
}
