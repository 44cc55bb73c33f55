//! Configuration-related CLI commands.

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::analysis::RuleBank;
use crate::config::AnalysisConfig;
use crate::data::to_yaml;
use crate::utils::preflight::{CLAUDE_KEY_VARS, GEMINI_KEY_VARS, PROVIDER_ENV_VAR};
use crate::utils::{detect_llm_provider, get_env_var};

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Shows the effective configuration and LLM credential status.
    Show(ShowCommand),
    /// Prints the default configuration file path.
    Path(PathCommand),
    /// Lists the risk rules in use.
    Rules(RulesCommand),
}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        match self.command {
            ConfigSubcommands::Show(cmd) => cmd.execute(config_path),
            ConfigSubcommands::Path(cmd) => cmd.execute(),
            ConfigSubcommands::Rules(cmd) => cmd.execute(config_path),
        }
    }
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = AnalysisConfig::load(config_path)?;
        print!("{}", to_yaml(&config)?);

        println!();
        println!("Environment:");
        for key in GEMINI_KEY_VARS
            .iter()
            .chain(CLAUDE_KEY_VARS)
            .chain([&PROVIDER_ENV_VAR])
        {
            let status = if get_env_var(key).is_ok() {
                "set"
            } else {
                "not set"
            };
            println!("  {key}: {status}");
        }

        match detect_llm_provider(&config.llm) {
            Ok(Some(credentials)) => println!(
                "LLM: {} (model: {})",
                credentials.provider,
                credentials.model.as_deref().unwrap_or("default")
            ),
            Ok(None) => println!("LLM: none, rule-based explanations only"),
            Err(e) => println!("LLM: unavailable ({e})"),
        }
        Ok(())
    }
}

/// Path command options.
#[derive(Parser)]
pub struct PathCommand {}

impl PathCommand {
    /// Executes the path command.
    pub fn execute(self) -> Result<()> {
        println!("{}", AnalysisConfig::default_path()?.display());
        Ok(())
    }
}

/// Rules command options.
#[derive(Parser)]
pub struct RulesCommand {}

impl RulesCommand {
    /// Executes the rules command.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = AnalysisConfig::load(config_path)?;
        let rules = match &config.rules_path {
            Some(path) => RuleBank::load_from_path(path)?,
            None => RuleBank::builtin()?,
        };
        for rule in rules.rules() {
            println!(
                "{:<28} {:<6} {}",
                rule.name,
                rule.risk_tier.to_string(),
                rule.pattern
            );
        }
        Ok(())
    }
}
