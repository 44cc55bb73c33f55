//! Analyze command: full risk report for one contract.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use termcolor::{NoColor, WriteColor};
use tracing::warn;

use super::output;
use crate::analysis::ContractAnalyzer;
use crate::audit::{AuditEvent, AuditLog};
use crate::batch::read_contract_text;
use crate::config::AnalysisConfig;
use crate::data::report::{render_html, render_markdown, DEFAULT_EXPLANATION_LIMIT};
use crate::data::{OutputFormat, SummaryReport};
use crate::knowledge::KnowledgeBase;
use crate::llm::Explainer;

/// Analyze command options.
#[derive(Parser)]
pub struct AnalyzeCommand {
    /// Contract file to analyze, or `-` for standard input.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output format: text (default), json, yaml, markdown, html.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Writes the report to a file instead of standard output.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Adds LLM explanations for the highest-risk clauses.
    #[arg(long)]
    pub explain: bool,

    /// Number of flagged clauses to explain.
    #[arg(long, default_value_t = DEFAULT_EXPLANATION_LIMIT)]
    pub explain_limit: usize,

    /// Adds a plain-language summary of the whole contract.
    #[arg(long)]
    pub summary: bool,

    /// Skips knowledge-base suggestions in text output.
    #[arg(long)]
    pub no_suggestions: bool,

    /// Does not record the run in the audit log.
    #[arg(long)]
    pub no_audit: bool,

    /// Normalizes Hindi legal terms to English before analysis.
    #[arg(long)]
    pub hindi: bool,
}

impl AnalyzeCommand {
    /// Executes the analyze command.
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = AnalysisConfig::load(config_path)?.with_hindi(self.hindi);
        let (document_id, text) = read_document(&self.input)?;
        let audit = if self.no_audit {
            None
        } else {
            open_audit_log(&config)
        };

        let analyzer = ContractAnalyzer::new(&config)?;
        let analysis = analyzer.analyze(&document_id, &text);
        record(
            audit.as_ref(),
            AuditEvent::ContractUploaded {
                document: document_id.clone(),
                size_bytes: text.len() as u64,
                contract_type: Some(analysis.classification.contract_type.clone()),
            },
        );
        record(audit.as_ref(), AuditEvent::risk_analysis(&analysis));
        record(
            audit.as_ref(),
            AuditEvent::compliance_check(&document_id, &analysis.compliance),
        );

        let mut report = SummaryReport::from_analysis(&analysis);
        if self.explain || self.summary {
            let explainer = Explainer::from_config(&config.llm);
            if self.summary {
                report = report.with_plain_summary(&explainer, &text).await;
            }
            if self.explain {
                report = report.with_explanations(&explainer, self.explain_limit).await;
            }
        }

        let knowledge = if self.no_suggestions {
            None
        } else {
            Some(KnowledgeBase::builtin()?)
        };

        match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create report file: {}", path.display()))?;
                let mut out = NoColor::new(file);
                self.write_report(&mut out, &report, knowledge.as_ref())?;
                out.flush()?;
                record(
                    audit.as_ref(),
                    AuditEvent::DataExported {
                        document: document_id.clone(),
                        format: self.format.to_string(),
                        record_count: report.summary.total_clauses,
                    },
                );
                eprintln!("Report written to {}", path.display());
            }
            None => {
                let mut out = output::stdout();
                self.write_report(&mut out, &report, knowledge.as_ref())?;
            }
        }

        record(
            audit.as_ref(),
            AuditEvent::ReportGenerated {
                document: document_id,
                format: self.format.to_string(),
            },
        );
        Ok(())
    }

    fn write_report(
        &self,
        out: &mut dyn WriteColor,
        report: &SummaryReport,
        knowledge: Option<&KnowledgeBase>,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Text => output::write_report_text(out, report, knowledge)?,
            OutputFormat::Markdown => out.write_all(render_markdown(report).as_bytes())?,
            OutputFormat::Html => out.write_all(render_html(report).as_bytes())?,
            OutputFormat::Json | OutputFormat::Yaml => {
                if let Some(rendered) = output::structured(report, self.format)? {
                    out.write_all(rendered.as_bytes())?;
                }
            }
        }
        Ok(())
    }
}

/// Reads a contract from `path`, or from standard input for `-`.
///
/// Returns the document identifier and the text.
pub(crate) fn read_document(path: &Path) -> Result<(String, String)> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read contract from standard input")?;
        return Ok(("stdin".to_string(), text));
    }

    let text = read_contract_text(path)?;
    let document_id = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    Ok((document_id, text))
}

pub(super) fn open_audit_log(config: &AnalysisConfig) -> Option<AuditLog> {
    let opened = config
        .audit_path()
        .and_then(|path| AuditLog::open(&path).map_err(anyhow::Error::from));
    match opened {
        Ok(log) => Some(log),
        Err(e) => {
            warn!(error = %e, "Audit log unavailable, continuing without it");
            None
        }
    }
}

pub(super) fn record(audit: Option<&AuditLog>, event: AuditEvent) {
    let Some(log) = audit else {
        return;
    };
    let kind = event.kind();
    if let Err(e) = log.record(event) {
        warn!(error = %e, event = kind, "Failed to write audit entry");
    }
}
