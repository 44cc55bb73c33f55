//! CLI interface for contract-lens.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod analyze;
pub mod audit;
pub mod batch;
pub mod config;
pub mod inspect;
pub mod kb;
mod output;
pub mod template;

/// contract-lens: rule-based contract risk analysis.
#[derive(Parser)]
#[command(name = "contract-lens")]
#[command(about = "Rule-based contract risk analysis for SMEs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ~/.contract-lens/config.yaml).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Analyzes a contract and prints a risk report.
    Analyze(analyze::AnalyzeCommand),
    /// Detects the contract type.
    Classify(inspect::ClassifyCommand),
    /// Checks a contract against the compliance rules.
    Compliance(inspect::ComplianceCommand),
    /// Extracts parties, dates, amounts and obligations.
    Extract(inspect::ExtractCommand),
    /// Analyzes many contracts and writes a JSON summary.
    Batch(batch::BatchCommand),
    /// Contract templates and alternative clauses.
    Template(template::TemplateCommand),
    /// Knowledge base of common contract issues.
    Kb(kb::KbCommand),
    /// Audit-log queries.
    Audit(audit::AuditCommand),
    /// Configuration and credential information.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = self.config.as_deref();
        match self.command {
            Commands::Analyze(cmd) => cmd.execute(config).await,
            Commands::Classify(cmd) => cmd.execute(config),
            Commands::Compliance(cmd) => cmd.execute(config),
            Commands::Extract(cmd) => cmd.execute(config),
            Commands::Batch(cmd) => cmd.execute(config),
            Commands::Template(cmd) => cmd.execute(),
            Commands::Kb(cmd) => cmd.execute(),
            Commands::Audit(cmd) => cmd.execute(config),
            Commands::Config(cmd) => cmd.execute(config),
        }
    }
}
