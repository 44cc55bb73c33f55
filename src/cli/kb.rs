//! Knowledge-base commands.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use super::output;
use crate::data::OutputFormat;
use crate::knowledge::{KnowledgeBase, KnownIssue};

/// Knowledge-base operations.
#[derive(Parser)]
pub struct KbCommand {
    /// Knowledge-base subcommand to execute.
    #[command(subcommand)]
    pub command: KbSubcommands,

    /// Output format: text (default), json, yaml.
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

/// Knowledge-base subcommands.
#[derive(Subcommand)]
pub enum KbSubcommands {
    /// Lists known issues, optionally only High-impact ones.
    List {
        /// Shows only High-impact issues.
        #[arg(long)]
        high_impact: bool,
    },
    /// Shows one issue in full.
    Show {
        /// Issue key, e.g. `indemnity_overreach`.
        key: String,
    },
    /// Shows knowledge-base statistics.
    Stats,
    /// Suggests fixes for a clause.
    Suggest {
        /// Clause text.
        clause: String,
    },
}

impl KbCommand {
    /// Executes the kb command.
    pub fn execute(self) -> Result<()> {
        let kb = KnowledgeBase::builtin()?;
        match self.command {
            KbSubcommands::List { high_impact } => {
                let issues = if high_impact {
                    kb.high_impact()
                } else {
                    kb.issues().iter().collect()
                };
                if let Some(rendered) = output::structured(&issues, self.format)? {
                    print!("{rendered}");
                    return Ok(());
                }
                for issue in issues {
                    println!(
                        "{:<26} {} (impact {}, frequency {})",
                        issue.key, issue.title, issue.impact, issue.frequency
                    );
                }
            }
            KbSubcommands::Show { key } => {
                let issue = kb
                    .get(&key)
                    .ok_or_else(|| anyhow!("Unknown knowledge-base issue: {key}"))?;
                if let Some(rendered) = output::structured(issue, self.format)? {
                    print!("{rendered}");
                    return Ok(());
                }
                print_issue(issue);
            }
            KbSubcommands::Stats => {
                let stats = kb.stats();
                if let Some(rendered) = output::structured(&stats, self.format)? {
                    print!("{rendered}");
                    return Ok(());
                }
                println!("Known issues:        {}", stats.total_known_issues);
                println!("High impact:         {}", stats.high_impact);
                println!("Very high frequency: {}", stats.very_high_frequency);
                println!("Frequent share:      {:.0}%", stats.frequent_share * 100.0);
                println!("Last updated:        {}", stats.last_updated);
            }
            KbSubcommands::Suggest { clause } => {
                let suggestions = kb.suggest_for_clause(&clause);
                if let Some(rendered) = output::structured(&suggestions, self.format)? {
                    print!("{rendered}");
                    return Ok(());
                }
                if suggestions.is_empty() {
                    println!("No known issues match this clause.");
                }
                for suggestion in suggestions {
                    println!("{}: {}", suggestion.issue, suggestion.solution);
                    println!("  Sample fix: {}", suggestion.sample_fix);
                }
            }
        }
        Ok(())
    }
}

fn print_issue(issue: &KnownIssue) {
    println!("{} ({})", issue.title, issue.key);
    println!("Impact: {}  Frequency: {}", issue.impact, issue.frequency);
    println!("Prevalence: {}", issue.prevalence);
    println!();
    println!("{}", issue.description);
    println!("Example:    {}", issue.example);
    println!("Risk:       {}", issue.risk);
    println!("Solution:   {}", issue.solution);
    println!("Sample fix: {}", issue.sample_fix);
}
