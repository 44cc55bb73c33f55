//! Single-aspect commands: classify, compliance and extract.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use termcolor::WriteColor;

use super::analyze::read_document;
use super::output;
use crate::analysis::entities::{Currency, KeyDateKind};
use crate::analysis::{Classification, ComplianceReport, ContractAnalyzer, ExtractedEntities};
use crate::config::AnalysisConfig;
use crate::data::OutputFormat;

/// Loads the configuration, builds an analyzer and reads the input.
fn prepare(
    config_path: Option<&Path>,
    input: &Path,
    hindi: bool,
) -> Result<(ContractAnalyzer, String)> {
    let config = AnalysisConfig::load(config_path)?.with_hindi(hindi);
    let analyzer = ContractAnalyzer::new(&config)?;
    let (_, text) = read_document(input)?;
    let text = analyzer.prepare(&text).into_owned();
    Ok((analyzer, text))
}

/// Classify command options.
#[derive(Parser)]
pub struct ClassifyCommand {
    /// Contract file, or `-` for standard input.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Normalizes Hindi legal terms to English before analysis.
    #[arg(long)]
    pub hindi: bool,
}

impl ClassifyCommand {
    /// Executes the classify command.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let (analyzer, text) = prepare(config_path, &self.input, self.hindi)?;
        let classification = analyzer.classifier().classify(&text);

        if let Some(rendered) = output::structured(&classification, self.format)? {
            print!("{rendered}");
            return Ok(());
        }
        write_classification(&mut output::stdout(), &classification)?;
        Ok(())
    }
}

fn write_classification(
    out: &mut dyn WriteColor,
    classification: &Classification,
) -> std::io::Result<()> {
    output::heading(out, &format!("Contract type: {}", classification.contract_type))?;
    writeln!(out, "Confidence: {:.0}%", classification.confidence * 100.0)?;
    for score in classification.scores.iter().filter(|s| s.score > 0) {
        writeln!(out, "  {:<14} {}", score.contract_type, score.score)?;
    }
    Ok(())
}

/// Compliance command options.
#[derive(Parser)]
pub struct ComplianceCommand {
    /// Contract file, or `-` for standard input.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Normalizes Hindi legal terms to English before analysis.
    #[arg(long)]
    pub hindi: bool,

    /// Shows guidance for missing rules.
    #[arg(long)]
    pub guidance: bool,
}

impl ComplianceCommand {
    /// Executes the compliance command.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let (analyzer, text) = prepare(config_path, &self.input, self.hindi)?;
        let report = analyzer.compliance().report(&text);

        if let Some(rendered) = output::structured(&report, self.format)? {
            print!("{rendered}");
            return Ok(());
        }
        self.write_report(&mut output::stdout(), &report)?;
        Ok(())
    }

    fn write_report(
        &self,
        out: &mut dyn WriteColor,
        report: &ComplianceReport,
    ) -> std::io::Result<()> {
        output::heading(
            out,
            &format!(
                "Compliance: {} ({:.0}% satisfied)",
                report.overall_status,
                report.compliance_percentage()
            ),
        )?;
        writeln!(out, "Generic checks:")?;
        for finding in &report.generic {
            output::finding_line(out, finding)?;
        }
        writeln!(out, "{} checks:", report.jurisdiction_name)?;
        for finding in &report.jurisdiction {
            output::finding_line(out, finding)?;
            if self.guidance && finding.is_missing() {
                writeln!(out, "      {}", finding.guidance)?;
            }
        }
        if !report.law_references.is_empty() {
            writeln!(out, "Laws referenced: {}", report.law_references.join(", "))?;
        }
        Ok(())
    }
}

/// Extract command options.
#[derive(Parser)]
pub struct ExtractCommand {
    /// Contract file, or `-` for standard input.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Normalizes Hindi legal terms to English before analysis.
    #[arg(long)]
    pub hindi: bool,
}

impl ExtractCommand {
    /// Executes the extract command.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let (analyzer, text) = prepare(config_path, &self.input, self.hindi)?;
        let entities = analyzer.extractor().extract(&text);

        if let Some(rendered) = output::structured(&entities, self.format)? {
            print!("{rendered}");
            return Ok(());
        }
        write_entities(&mut output::stdout(), &entities)?;
        Ok(())
    }
}

fn write_entities(out: &mut dyn WriteColor, entities: &ExtractedEntities) -> std::io::Result<()> {
    let amounts: Vec<String> = entities
        .amounts
        .iter()
        .map(|a| {
            let currency = match a.currency {
                Currency::Inr => "INR",
                Currency::Usd => "USD",
            };
            format!("{currency} {}", a.amount)
        })
        .collect();
    let key_dates: Vec<String> = entities
        .key_dates
        .iter()
        .map(|d| {
            let kind = match d.kind {
                KeyDateKind::Effective => "effective",
                KeyDateKind::Expiry => "expiry",
                KeyDateKind::Renewal => "renewal",
            };
            format!("{} ({kind})", d.date)
        })
        .collect();

    let sections: [(&str, &[String]); 8] = [
        ("Parties", entities.parties.as_slice()),
        ("Dates", entities.dates.as_slice()),
        ("Amounts", amounts.as_slice()),
        ("Jurisdictions", entities.jurisdictions.as_slice()),
        ("Key dates", key_dates.as_slice()),
        ("Obligations", entities.obligations.as_slice()),
        ("Rights", entities.rights.as_slice()),
        ("Prohibitions", entities.prohibitions.as_slice()),
    ];
    for (title, items) in sections {
        output::heading(out, &format!("{title} ({})", items.len()))?;
        for item in items {
            writeln!(out, "  - {item}")?;
        }
    }

    output::heading(out, &format!("Payment terms ({})", entities.payment_terms.len()))?;
    for term in &entities.payment_terms {
        writeln!(out, "  - {:?}: {}", term.kind, term.term)?;
    }
    Ok(())
}
