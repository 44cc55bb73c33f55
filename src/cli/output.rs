//! Shared output helpers for CLI commands.

use std::io::{self, IsTerminal, Write};

use anyhow::{bail, Result};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::analysis::{ComplianceFinding, RiskTier};
use crate::data::{to_yaml, OutputFormat, SummaryReport};
use crate::knowledge::KnowledgeBase;
use crate::utils::excerpt;

/// Characters of clause text shown in text output.
const CLAUSE_PREVIEW_CHARS: usize = 160;

/// Colored stdout when attached to a terminal, plain otherwise.
pub(crate) fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Serializes `value` for the machine-readable formats.
///
/// Returns `None` for text, which each command renders itself.
pub(crate) fn structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    match format {
        OutputFormat::Text => Ok(None),
        OutputFormat::Json => Ok(Some(format!("{}\n", serde_json::to_string_pretty(value)?))),
        OutputFormat::Yaml => Ok(Some(to_yaml(value)?)),
        OutputFormat::Markdown | OutputFormat::Html => {
            bail!("Output format {format} is only supported by the analyze command")
        }
    }
}

pub(crate) const fn risk_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::High => Color::Red,
        RiskTier::Medium => Color::Yellow,
        RiskTier::Low => Color::Green,
    }
}

/// Writes `text` in bold.
pub(crate) fn heading(out: &mut dyn WriteColor, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "{text}")?;
    out.reset()
}

/// Writes a bold tier label in the tier's color, without a newline.
pub(crate) fn tier_label(out: &mut dyn WriteColor, tier: RiskTier) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(risk_color(tier))).set_bold(true))?;
    write!(out, "{tier}")?;
    out.reset()
}

/// Writes one compliance finding as a ✓/✗ line.
pub(crate) fn finding_line(out: &mut dyn WriteColor, finding: &ComplianceFinding) -> io::Result<()> {
    let (mark, color) = if finding.is_missing() {
        ("✗", Color::Red)
    } else {
        ("✓", Color::Green)
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "  {mark} ")?;
    out.reset()?;
    writeln!(out, "{} ({}, {})", finding.rule_name, finding.status, finding.severity)
}

/// Writes the human-readable form of a report.
///
/// Flagged clauses get knowledge-base fixes when `knowledge` is given.
pub(crate) fn write_report_text(
    out: &mut dyn WriteColor,
    report: &SummaryReport,
    knowledge: Option<&KnowledgeBase>,
) -> io::Result<()> {
    let summary = &report.summary;
    let risk = &report.risk_analysis;

    heading(out, &format!("Contract analysis: {}", summary.document_id))?;
    write!(out, "Overall risk: ")?;
    tier_label(out, summary.overall_risk_level)?;
    writeln!(out)?;
    writeln!(
        out,
        "Contract type: {} ({:.0}% confidence)",
        summary.contract_type,
        summary.confidence * 100.0
    )?;
    writeln!(
        out,
        "Clauses: {} analyzed, {} high, {} medium; {} issues, {} ambiguities",
        summary.total_clauses,
        risk.high_risk_clauses.len(),
        risk.medium_risk_clauses.len(),
        risk.total_issues,
        risk.total_ambiguities
    )?;
    writeln!(out, "Parties: {}", report.entities.parties.join(", "))?;

    if let Some(plain) = &report.plain_summary {
        writeln!(out)?;
        heading(out, &format!("Summary ({})", plain.source))?;
        writeln!(out, "{}", plain.text)?;
    }

    for clause in risk.flagged() {
        writeln!(out)?;
        write!(out, "Clause {} [", clause.index + 1)?;
        tier_label(out, clause.risk)?;
        writeln!(out, "]")?;
        writeln!(out, "  {}", excerpt(&clause.text, CLAUSE_PREVIEW_CHARS))?;
        for issue in &clause.issues {
            write!(out, "  - ")?;
            out.set_color(ColorSpec::new().set_fg(Some(risk_color(issue.risk_tier))))?;
            write!(out, "{}", issue.rule_name)?;
            out.reset()?;
            writeln!(out, ": {}", issue.recommendation)?;
        }
        if let Some(kb) = knowledge {
            for suggestion in kb.suggest_for_clause(&clause.text) {
                writeln!(out, "  * Known issue: {}. {}", suggestion.issue, suggestion.solution)?;
            }
        }
        if let Some(explained) = report
            .explanations
            .iter()
            .find(|e| e.clause_index == clause.index)
        {
            writeln!(
                out,
                "  Explanation ({}): {}",
                explained.explanation.source, explained.explanation.text
            )?;
            writeln!(out, "  Why risky: {}", explained.reasoning.text)?;
            writeln!(out, "  Alternative: {}", explained.alternative.text)?;
        }
    }

    writeln!(out)?;
    write!(out, "Compliance: {} (", report.compliance.overall_status)?;
    writeln!(
        out,
        "{} of {} checks missing)",
        report.compliance.missing_count, report.compliance.total_checks
    )?;
    for finding in report.compliance.missing() {
        finding_line(out, finding)?;
    }

    writeln!(out)?;
    heading(out, "Recommendations")?;
    for (i, recommendation) in report.recommendations.iter().enumerate() {
        writeln!(out, "{}. {recommendation}", i + 1)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use termcolor::NoColor;

    use super::*;
    use crate::analysis::ContractAnalyzer;
    use crate::config::AnalysisConfig;

    fn report(text: &str) -> SummaryReport {
        let analyzer = ContractAnalyzer::new(&AnalysisConfig::default()).unwrap();
        SummaryReport::from_analysis(&analyzer.analyze("sample.txt", text))
    }

    #[test]
    fn structured_formats() {
        let value = serde_json::json!({ "risk": "High" });
        assert!(structured(&value, OutputFormat::Text).unwrap().is_none());
        assert!(structured(&value, OutputFormat::Json)
            .unwrap()
            .unwrap()
            .contains("\"risk\": \"High\""));
        assert!(structured(&value, OutputFormat::Yaml)
            .unwrap()
            .unwrap()
            .contains("risk: High\n"));
        assert!(structured(&value, OutputFormat::Html).is_err());
    }

    #[test]
    fn text_report_lists_flagged_clauses() {
        let report = report(
            "The Vendor shall deliver the software within thirty days\n\
             The Client shall indemnify the Vendor under a broad indemnity for all losses",
        );
        let kb = KnowledgeBase::builtin().unwrap();
        let mut out = NoColor::new(Vec::new());
        write_report_text(&mut out, &report, Some(&kb)).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();

        assert!(text.starts_with("Contract analysis: sample.txt\nOverall risk: High\n"));
        assert!(text.contains("Clause 2 [High]"));
        assert!(text.contains("  * Known issue: Broad Indemnity Clause."));
        assert!(text.contains("Recommendations\n1. Review all High-risk clauses"));
    }
}
