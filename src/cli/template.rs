//! Template commands: contract templates and alternative clauses.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use super::output;
use crate::data::OutputFormat;
use crate::drafting::TemplateLibrary;

/// Template operations.
#[derive(Parser)]
pub struct TemplateCommand {
    /// Template subcommand to execute.
    #[command(subcommand)]
    pub command: TemplateSubcommands,
}

/// Template subcommands.
#[derive(Subcommand)]
pub enum TemplateSubcommands {
    /// Lists the built-in contract templates.
    List(ListCommand),
    /// Renders a template as Markdown.
    Render(RenderCommand),
    /// Shows balanced wording for a commonly one-sided clause.
    Alternative(AlternativeCommand),
}

impl TemplateCommand {
    /// Executes the template command.
    pub fn execute(self) -> Result<()> {
        let library = TemplateLibrary::builtin()?;
        match self.command {
            TemplateSubcommands::List(cmd) => cmd.execute(&library),
            TemplateSubcommands::Render(cmd) => cmd.execute(&library),
            TemplateSubcommands::Alternative(cmd) => cmd.execute(&library),
        }
    }
}

/// List command options.
#[derive(Parser)]
pub struct ListCommand {
    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

impl ListCommand {
    fn execute(self, library: &TemplateLibrary) -> Result<()> {
        if let Some(rendered) = output::structured(&library.list(), self.format)? {
            print!("{rendered}");
            return Ok(());
        }
        for template in library.list() {
            println!("{:<22} {}", template.key, template.title);
            println!("  placeholders: {}", template.placeholders().join(", "));
        }
        Ok(())
    }
}

/// Render command options.
#[derive(Parser)]
pub struct RenderCommand {
    /// Template key, e.g. `service_agreement`.
    pub key: String,

    /// Placeholder value (repeatable), e.g. `--set "AMOUNT=5,00,000"`.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub values: Vec<String>,

    /// Writes the rendered template to a file.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    fn execute(self, library: &TemplateLibrary) -> Result<()> {
        let values = parse_values(&self.values)?;
        let rendered = library.render(&self.key, &values)?;
        match &self.output {
            Some(path) => {
                fs::write(path, &rendered)
                    .with_context(|| format!("Failed to write template: {}", path.display()))?;
                eprintln!("Template written to {}", path.display());
            }
            None => print!("{rendered}"),
        }
        Ok(())
    }
}

/// Parses `NAME=VALUE` pairs; later pairs override earlier ones.
fn parse_values(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .ok_or_else(|| anyhow!("Invalid --set value '{pair}'. Expected NAME=VALUE"))
        })
        .collect()
}

/// Alternative command options.
#[derive(Parser)]
pub struct AlternativeCommand {
    /// Clause key, e.g. `auto_renewal`. Lists every alternative when omitted.
    pub key: Option<String>,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

impl AlternativeCommand {
    fn execute(self, library: &TemplateLibrary) -> Result<()> {
        let alternatives = match &self.key {
            Some(key) => vec![library.alternative(key)?],
            None => library.alternatives().iter().collect(),
        };

        if let Some(rendered) = output::structured(&alternatives, self.format)? {
            print!("{rendered}");
            return Ok(());
        }
        for alternative in alternatives {
            println!("{}", alternative.key);
            if let Some(avoid) = &alternative.avoid {
                println!("  Avoid:  {avoid}");
            }
            println!("  Prefer: {}", alternative.prefer);
            println!("  Why:    {}", alternative.reason);
        }
        Ok(())
    }
}
