//! Audit-log commands.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use super::output;
use crate::audit::{AuditFilter, AuditLog, Severity};
use crate::config::AnalysisConfig;
use crate::data::OutputFormat;

/// Audit-log operations.
#[derive(Parser)]
pub struct AuditCommand {
    /// Audit subcommand to execute.
    #[command(subcommand)]
    pub command: AuditSubcommands,
}

/// Audit subcommands.
#[derive(Subcommand)]
pub enum AuditSubcommands {
    /// Lists recorded events.
    Show(ShowCommand),
    /// Shows counts per event type and the error rate.
    Summary(SummaryCommand),
}

impl AuditCommand {
    /// Executes the audit command.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = AnalysisConfig::load(config_path)?;
        let log = AuditLog::open(config.audit_path()?)?;
        match self.command {
            AuditSubcommands::Show(cmd) => cmd.execute(&log),
            AuditSubcommands::Summary(cmd) => cmd.execute(&log),
        }
    }
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Only events of this type, e.g. `risk_analysis`.
    #[arg(long = "type", value_name = "TYPE")]
    pub event_type: Option<String>,

    /// Only events with this severity: info, warning, error.
    #[arg(long)]
    pub severity: Option<Severity>,

    /// Only events from this session.
    #[arg(long)]
    pub session: Option<String>,

    /// Only events at or after this RFC 3339 timestamp.
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,

    /// Only events at or before this RFC 3339 timestamp.
    #[arg(long)]
    pub until: Option<DateTime<Utc>>,

    /// Shows at most this many of the most recent events.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

impl ShowCommand {
    fn execute(self, log: &AuditLog) -> Result<()> {
        let filter = AuditFilter {
            event_type: self.event_type,
            severity: self.severity,
            session_id: self.session,
            since: self.since,
            until: self.until,
        };
        let mut entries = log.filter(&filter)?;
        if let Some(limit) = self.limit {
            let skip = entries.len().saturating_sub(limit);
            entries.drain(..skip);
        }

        if let Some(rendered) = output::structured(&entries, self.format)? {
            print!("{rendered}");
            return Ok(());
        }
        for entry in &entries {
            println!(
                "{} {:<7} {:<20} {} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.severity.to_string(),
                entry.event.kind(),
                entry.id,
                serde_json::to_string(&entry.event)?
            );
        }
        Ok(())
    }
}

/// Summary command options.
#[derive(Parser)]
pub struct SummaryCommand {
    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

impl SummaryCommand {
    fn execute(self, log: &AuditLog) -> Result<()> {
        let summary = log.summary()?;
        if let Some(rendered) = output::structured(&summary, self.format)? {
            print!("{rendered}");
            return Ok(());
        }
        println!("Audit log: {}", log.path().display());
        println!(
            "Events: {} ({} errors, {:.2}% error rate)",
            summary.total_events, summary.total_errors, summary.error_rate_percent
        );
        for (kind, count) in &summary.event_types {
            println!("  {kind:<20} {count}");
        }
        if let (Some(first), Some(last)) = (summary.first_event, summary.last_event) {
            println!("From {first} to {last}");
        }
        Ok(())
    }
}
