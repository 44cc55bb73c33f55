use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use contract_lens::analysis::{aggregate_risk, ContractAnalyzer, RiskTier};
use contract_lens::audit::{AuditEvent, AuditFilter, AuditLog};
use contract_lens::batch::{collect_inputs, BatchEntry, BatchProcessor, BatchReport};
use contract_lens::cli::analyze::AnalyzeCommand;
use contract_lens::cli::batch::BatchCommand;
use contract_lens::cli::{Cli, Commands};
use contract_lens::data::report::render_markdown;
use contract_lens::data::{OutputFormat, SummaryReport};
use contract_lens::AnalysisConfig;
use tempfile::TempDir;

const SERVICE_CONTRACT: &str = "\
SERVICE AGREEMENT

This Agreement is made between Acme Traders Pvt Ltd and Bright Software LLP.
Party A shall indemnify and hold harmless Party B from all claims.
This agreement shall automatically renew unless either party opts out.
The Service Provider shall deliver the website within 45 days of signing.
Any dispute shall be referred to arbitration in Mumbai, India.
Total fee: Rs. 5,00,000 payable within 30 days of invoice.
";

/// Temporary workspace holding contracts, a config file and an audit log.
struct Workspace {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().to_path_buf();
        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    fn audit_path(&self) -> PathBuf {
        self.root.join("logs").join("audit.jsonl")
    }

    /// Writes a config that disables the LLM and logs into the workspace.
    fn write_config(&self) -> Result<PathBuf> {
        let yaml = format!(
            "llm:\n  provider: none\naudit:\n  path: {}\n",
            self.audit_path().display()
        );
        self.write("config.yaml", &yaml)
    }
}

fn analyzer() -> Result<ContractAnalyzer> {
    ContractAnalyzer::new(&AnalysisConfig::default())
}

#[test]
fn test_indemnity_scenario() -> Result<()> {
    let analysis = analyzer()?.analyze(
        "indemnity.txt",
        "Party A shall indemnify and hold harmless Party B from all claims.",
    );

    assert_eq!(analysis.clauses.len(), 1);
    let clause = &analysis.clauses[0];
    assert_eq!(clause.overall_risk, RiskTier::High);
    assert!(clause.issues.iter().any(|i| i.rule_name == "Broad Indemnity"));
    assert_eq!(aggregate_risk(&[clause.overall_risk]), RiskTier::High);
    assert_eq!(analysis.verdict.overall_risk, RiskTier::High);
    Ok(())
}

#[test]
fn test_auto_renewal_scenario() -> Result<()> {
    let analysis = analyzer()?.analyze(
        "renewal.txt",
        "This agreement shall automatically renew unless either party opts out.",
    );

    assert_eq!(analysis.clauses.len(), 1);
    let clause = &analysis.clauses[0];
    assert_eq!(clause.overall_risk, RiskTier::Medium);
    assert_eq!(clause.issues.len(), 1);
    assert_eq!(clause.issues[0].rule_name, "Auto-Renewal");
    assert_eq!(analysis.verdict.overall_risk, RiskTier::Medium);
    Ok(())
}

#[test]
fn test_full_contract_report() -> Result<()> {
    let analysis = analyzer()?.analyze("service.txt", SERVICE_CONTRACT);
    let report = SummaryReport::from_analysis(&analysis);

    assert_eq!(report.summary.overall_risk_level, RiskTier::High);
    assert_eq!(report.summary.contract_type, "service");
    assert!(!report.risk_analysis.high_risk_clauses.is_empty());
    assert!(report
        .risk_analysis
        .medium_risk_clauses
        .iter()
        .any(|c| c.issues.iter().any(|i| i.rule_name == "Auto-Renewal")));
    assert!(report
        .compliance
        .generic
        .iter()
        .any(|f| f.rule_name == "Dispute Resolution Mechanism" && !f.is_missing()));

    let markdown = render_markdown(&report);
    assert!(markdown.starts_with("# Contract Analysis Report\n\n**Document**: service.txt\n"));
    assert!(markdown.contains("## Risk Analysis"));
    assert!(markdown.contains("## Compliance Checklist"));
    Ok(())
}

#[test]
fn test_config_file_limits_segmentation() -> Result<()> {
    let workspace = Workspace::new()?;
    let path = workspace.write(
        "limited.yaml",
        "segmentation:\n  max_clauses: 2\nnormalize_hindi: false\n",
    )?;

    let config = AnalysisConfig::load(Some(&path))?;
    assert_eq!(config.segmentation.max_clauses, 2);
    assert!(!config.normalize_hindi);

    let analysis = ContractAnalyzer::new(&config)?.analyze("service.txt", SERVICE_CONTRACT);
    assert_eq!(analysis.clauses.len(), 2);
    Ok(())
}

#[test]
fn test_batch_over_directory() -> Result<()> {
    let workspace = Workspace::new()?;
    workspace.write("contracts/service.txt", SERVICE_CONTRACT)?;
    workspace.write(
        "contracts/nested/nda.md",
        "NON-DISCLOSURE AGREEMENT\n\
         The Recipient shall keep all confidential information of the Discloser secret.\n\
         Disclosure to third parties requires prior written consent of the Discloser.\n",
    )?;
    workspace.write("contracts/stub.txt", "Too short")?;
    workspace.write("contracts/notes.csv", "ignored")?;

    let files = collect_inputs(&workspace.root.join("contracts"), &[])?;
    assert_eq!(files.len(), 3);

    let analyzer = analyzer()?;
    let report = BatchProcessor::new(&analyzer).process(&files);
    assert_eq!(report.total_files, 3);
    assert_eq!(report.processed_count, 2);
    assert_eq!(report.failed_count, 1);
    assert!(report.contracts.iter().any(|entry| matches!(
        entry,
        BatchEntry::Failed { file, .. } if file.ends_with("stub.txt")
    )));
    assert_eq!(report.summary.total_analyzed, 2);
    assert_eq!(report.summary.high_risk_contracts, 1);

    let written = report.write_report(&workspace.root.join("out"))?;
    assert_eq!(
        written.file_name().and_then(|n| n.to_str()),
        Some(report.file_name().as_str())
    );
    let parsed: BatchReport = serde_json::from_str(&fs::read_to_string(&written)?)?;
    assert_eq!(parsed, report);
    Ok(())
}

#[test]
fn test_audit_log_tracks_analysis() -> Result<()> {
    let workspace = Workspace::new()?;
    let log = AuditLog::open(workspace.audit_path())?;
    let analysis = analyzer()?.analyze("service.txt", SERVICE_CONTRACT);

    let first = log.record(AuditEvent::risk_analysis(&analysis))?;
    let second = log.record(AuditEvent::compliance_check(
        "service.txt",
        &analysis.compliance,
    ))?;
    assert_ne!(first.id, second.id);
    assert!(first.timestamp <= second.timestamp);

    let reopened = AuditLog::open(workspace.audit_path())?;
    assert_eq!(reopened.entries()?.len(), 2);
    assert!(reopened.session_entries()?.is_empty());

    let risk_only = reopened.filter(&AuditFilter {
        event_type: Some("risk_analysis".to_string()),
        ..AuditFilter::default()
    })?;
    assert_eq!(risk_only.len(), 1);
    assert!(matches!(
        risk_only[0].event,
        AuditEvent::RiskAnalysis {
            overall_risk: RiskTier::High,
            ..
        }
    ));
    Ok(())
}

#[test]
fn test_batch_command_audits_each_contract() -> Result<()> {
    let workspace = Workspace::new()?;
    let config_path = workspace.write_config()?;
    let first = workspace.write("a.txt", SERVICE_CONTRACT)?;
    let second = workspace.write(
        "b.txt",
        "This agreement shall automatically renew unless either party opts out.\n\
         The Service Provider shall deliver the website within 45 days of signing.\n",
    )?;

    let command = BatchCommand {
        inputs: vec![first, second],
        patterns: Vec::new(),
        output_dir: workspace.root.join("out"),
        format: OutputFormat::Json,
        hindi: false,
    };
    command.execute(Some(&config_path))?;

    let entries = AuditLog::open(workspace.audit_path())?.entries()?;
    let kinds: Vec<&str> = entries.iter().map(|entry| entry.event.kind()).collect();
    assert_eq!(kinds, ["risk_analysis", "risk_analysis", "data_exported"]);

    let analyzed: Vec<(&str, RiskTier)> = entries
        .iter()
        .filter_map(|entry| match &entry.event {
            AuditEvent::RiskAnalysis {
                document,
                overall_risk,
                ..
            } => Some((document.as_str(), *overall_risk)),
            _ => None,
        })
        .collect();
    assert_eq!(
        analyzed,
        [("a.txt", RiskTier::High), ("b.txt", RiskTier::Medium)]
    );
    assert!(entries.iter().all(|e| e.session_id == entries[0].session_id));
    assert!(matches!(
        entries[2].event,
        AuditEvent::DataExported {
            record_count: 2,
            ..
        }
    ));
    Ok(())
}

#[tokio::test]
async fn test_analyze_command_writes_report_and_audit() -> Result<()> {
    let workspace = Workspace::new()?;
    let config_path = workspace.write_config()?;
    let contract = workspace.write("service.txt", SERVICE_CONTRACT)?;
    let report_path = workspace.root.join("report.md");

    let command = AnalyzeCommand {
        input: contract,
        format: OutputFormat::Markdown,
        output: Some(report_path.clone()),
        explain: true,
        explain_limit: 1,
        summary: true,
        no_suggestions: true,
        no_audit: false,
        hindi: false,
    };
    command.execute(Some(&config_path)).await?;

    let markdown = fs::read_to_string(&report_path)?;
    assert!(markdown.contains("**Document**: service.txt"));
    assert!(markdown.contains("### Plain-Language Summary (Rule-based)"));
    assert!(markdown.contains("## Clause Explanations"));

    let entries = AuditLog::open(workspace.audit_path())?.entries()?;
    let kinds: Vec<&str> = entries.iter().map(|entry| entry.event.kind()).collect();
    assert_eq!(
        kinds,
        [
            "contract_uploaded",
            "risk_analysis",
            "compliance_check",
            "data_exported",
            "report_generated"
        ]
    );
    match &entries[0].event {
        AuditEvent::ContractUploaded {
            document,
            contract_type,
            ..
        } => {
            assert_eq!(document, "service.txt");
            assert_eq!(contract_type.as_deref(), Some("service"));
        }
        other => panic!("expected an upload entry, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_cli_parses_analyze_flags() -> Result<()> {
    let cli = Cli::try_parse_from([
        "contract-lens",
        "--config",
        "custom.yaml",
        "analyze",
        "lease.txt",
        "--format",
        "md",
        "--explain",
        "--explain-limit",
        "5",
        "--hindi",
    ])?;

    assert_eq!(cli.config.as_deref(), Some(Path::new("custom.yaml")));
    match cli.command {
        Commands::Analyze(cmd) => {
            assert_eq!(cmd.input, PathBuf::from("lease.txt"));
            assert_eq!(cmd.format, OutputFormat::Markdown);
            assert!(cmd.explain);
            assert_eq!(cmd.explain_limit, 5);
            assert!(!cmd.summary);
            assert!(cmd.hindi);
        }
        _ => panic!("expected the analyze command"),
    }

    assert!(Cli::try_parse_from(["contract-lens", "analyze", "x.txt", "--format", "pdf"]).is_err());
    Ok(())
}
