//! Batch command: analyze many contracts and write a JSON summary.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use termcolor::WriteColor;

use super::analyze::{open_audit_log, record};
use super::output;
use crate::analysis::ContractAnalyzer;
use crate::audit::{AuditEvent, AuditLog};
use crate::batch::{collect_inputs, BatchEntry, BatchProcessor, BatchReport};
use crate::config::AnalysisConfig;
use crate::data::OutputFormat;
use crate::utils::format_bytes;

/// Batch command options.
#[derive(Parser)]
pub struct BatchCommand {
    /// Contract files or directories to scan.
    #[arg(value_name = "PATH", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Glob patterns selecting files inside directories (default: *.txt, *.md).
    #[arg(long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,

    /// Directory the JSON report is written to.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Output format for the summary: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Normalizes Hindi legal terms to English before analysis.
    #[arg(long)]
    pub hindi: bool,
}

impl BatchCommand {
    /// Executes the batch command.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = AnalysisConfig::load(config_path)?.with_hindi(self.hindi);
        let files = self.expand_inputs()?;
        if files.is_empty() {
            bail!("No contract files found");
        }

        let analyzer = ContractAnalyzer::new(&config)?;
        let report = BatchProcessor::new(&analyzer).process(&files);
        let path = report.write_report(&self.output_dir)?;
        let size = fs::metadata(&path)
            .with_context(|| format!("Failed to read report metadata: {}", path.display()))?
            .len();
        record_batch(open_audit_log(&config).as_ref(), &report);

        if let Some(rendered) = output::structured(&report, self.format)? {
            print!("{rendered}");
            return Ok(());
        }
        write_summary(&mut output::stdout(), &report)?;
        println!("Report: {} ({})", path.display(), format_bytes(size));
        Ok(())
    }

    fn expand_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for input in &self.inputs {
            if input.is_dir() {
                files.extend(collect_inputs(input, &self.patterns)?);
            } else {
                files.push(input.clone());
            }
        }
        Ok(files)
    }
}

/// Records one audit entry per file plus the report export.
fn record_batch(audit: Option<&AuditLog>, report: &BatchReport) {
    for entry in &report.contracts {
        let event = match entry {
            BatchEntry::Processed(contract) => AuditEvent::RiskAnalysis {
                document: contract.file.clone(),
                clause_count: contract.total_clauses_analyzed,
                overall_risk: contract.overall_risk,
                high_risk_clauses: contract.high_risk_clauses,
                medium_risk_clauses: contract.medium_risk_clauses,
            },
            BatchEntry::Failed { file, error } => AuditEvent::Error {
                message: error.clone(),
                context: format!("batch {file}"),
            },
        };
        record(audit, event);
    }
    record(
        audit,
        AuditEvent::DataExported {
            document: format!("batch_{}", report.batch_id),
            format: "json".to_string(),
            record_count: report.processed_count,
        },
    );
}

fn write_summary(out: &mut dyn WriteColor, report: &BatchReport) -> std::io::Result<()> {
    let summary = &report.summary;
    output::heading(out, &format!("Batch {}", report.batch_id))?;
    writeln!(
        out,
        "Files: {} total, {} processed, {} failed",
        report.total_files, report.processed_count, report.failed_count
    )?;
    writeln!(
        out,
        "Risk: {} high, {} medium, {} low",
        summary.high_risk_contracts, summary.medium_risk_contracts, summary.low_risk_contracts
    )?;
    if let Some(most_common) = &summary.most_common_type {
        writeln!(out, "Most common type: {most_common}")?;
    }
    writeln!(
        out,
        "Average compliance issues: {:.2}; average parties: {:.1}",
        summary.average_compliance_issues, summary.average_parties_per_contract
    )?;

    for entry in &report.contracts {
        match entry {
            BatchEntry::Processed(contract) => {
                write!(out, "  ")?;
                output::tier_label(out, contract.overall_risk)?;
                writeln!(out, " {} ({})", contract.file, contract.contract_type)?;
            }
            BatchEntry::Failed { file, error } => {
                writeln!(out, "  FAILED {file}: {error}")?;
            }
        }
    }
    Ok(())
}
