//! Summary reports and their Markdown and HTML renderings.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{
    ClauseVerdict, ComplianceReport, ComplianceStatus, ContractAnalysis, ExtractedEntities, Issue,
    RiskTier,
};
use crate::llm::{Explainer, Explanation};

/// Number of flagged clauses explained when the caller does not choose.
pub const DEFAULT_EXPLANATION_LIMIT: usize = 3;

/// Standing recommendations attached to every report.
pub const RECOMMENDATIONS: &[&str] = &[
    "Review all High-risk clauses before execution.",
    "Ensure auto-renewal and termination clauses are mutual.",
    "Verify IP assignment scope does not cover unintended assets.",
    "Confirm liability caps are reasonable and fair.",
];

/// Headline figures of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Document identifier.
    pub document_id: String,
    /// Detected contract type.
    pub contract_type: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
    /// Document length in characters.
    pub total_length_chars: usize,
    /// Number of scored clauses.
    pub total_clauses: usize,
    /// Number of parties found.
    pub parties_count: usize,
    /// Contract-level risk.
    pub overall_risk_level: RiskTier,
    /// Overall compliance verdict.
    pub compliance_status: ComplianceStatus,
    /// Number of missing compliance rules.
    pub compliance_issues_count: usize,
}

/// A clause worth a reviewer's attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedClause {
    /// Position of the clause in the document.
    pub index: usize,
    /// Clause text.
    pub text: String,
    /// Clause risk.
    pub risk: RiskTier,
    /// Matched rules.
    pub issues: Vec<Issue>,
}

impl From<&ClauseVerdict> for FlaggedClause {
    fn from(verdict: &ClauseVerdict) -> Self {
        Self {
            index: verdict.index,
            text: verdict.text.clone(),
            risk: verdict.overall_risk,
            issues: verdict.issues.clone(),
        }
    }
}

/// Risk section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// High-risk clauses in document order.
    pub high_risk_clauses: Vec<FlaggedClause>,
    /// Medium-risk clauses in document order.
    pub medium_risk_clauses: Vec<FlaggedClause>,
    /// Issues across all clauses.
    pub total_issues: usize,
    /// Vague phrases across all clauses.
    pub total_ambiguities: usize,
}

impl RiskAnalysis {
    /// Flagged clauses, High before Medium.
    pub fn flagged(&self) -> impl Iterator<Item = &FlaggedClause> {
        self.high_risk_clauses
            .iter()
            .chain(&self.medium_risk_clauses)
    }
}

/// Explanations attached to one flagged clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseExplanation {
    /// Position of the clause in the document.
    pub clause_index: usize,
    /// Clause risk.
    pub risk: RiskTier,
    /// Plain-language explanation.
    pub explanation: Explanation,
    /// Why the clause is risky.
    pub reasoning: Explanation,
    /// More balanced wording.
    pub alternative: Explanation,
}

/// Complete report for one analyzed contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Headline figures.
    pub summary: ReportSummary,
    /// Flagged clauses and issue counts.
    pub risk_analysis: RiskAnalysis,
    /// Compliance findings.
    pub compliance: ComplianceReport,
    /// Extracted entities.
    pub entities: ExtractedEntities,
    /// Standing recommendations.
    pub recommendations: Vec<String>,
    /// Plain-language summary of the whole document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_summary: Option<Explanation>,
    /// Explanations for the highest-risk clauses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explanations: Vec<ClauseExplanation>,
}

impl SummaryReport {
    /// Builds the report from an analysis. No LLM is involved.
    pub fn from_analysis(analysis: &ContractAnalysis) -> Self {
        let flagged = |tier| {
            analysis
                .clauses_at(tier)
                .map(FlaggedClause::from)
                .collect::<Vec<_>>()
        };

        Self {
            generated_at: Utc::now(),
            summary: ReportSummary {
                document_id: analysis.document_id.clone(),
                contract_type: analysis.classification.contract_type.clone(),
                confidence: analysis.classification.confidence,
                total_length_chars: analysis.char_count,
                total_clauses: analysis.clauses.len(),
                parties_count: analysis.entities.parties.len(),
                overall_risk_level: analysis.verdict.overall_risk,
                compliance_status: analysis.compliance.overall_status,
                compliance_issues_count: analysis.compliance.missing_count,
            },
            risk_analysis: RiskAnalysis {
                high_risk_clauses: flagged(RiskTier::High),
                medium_risk_clauses: flagged(RiskTier::Medium),
                total_issues: analysis.clauses.iter().map(|c| c.issues.len()).sum(),
                total_ambiguities: analysis.clauses.iter().map(|c| c.ambiguities.len()).sum(),
            },
            compliance: analysis.compliance.clone(),
            entities: analysis.entities.clone(),
            recommendations: RECOMMENDATIONS.iter().map(|r| (*r).to_string()).collect(),
            plain_summary: None,
            explanations: Vec::new(),
        }
    }

    /// Attaches explanations for up to `limit` flagged clauses, High first.
    ///
    /// Clauses are explained one at a time; the three requests for a clause
    /// run concurrently and each falls back independently.
    pub async fn with_explanations(mut self, explainer: &Explainer, limit: usize) -> Self {
        let mut explanations = Vec::new();
        for clause in self.risk_analysis.flagged().take(limit) {
            debug!(clause_index = clause.index, risk = %clause.risk, "Explaining clause");
            let (explanation, reasoning, alternative) = futures::join!(
                explainer.explain_clause(&clause.text),
                explainer.risk_reasoning(&clause.text),
                explainer.suggest_alternative(&clause.text, clause.risk),
            );
            explanations.push(ClauseExplanation {
                clause_index: clause.index,
                risk: clause.risk,
                explanation,
                reasoning,
                alternative,
            });
        }
        self.explanations = explanations;
        self
    }

    /// Attaches a plain-language summary of `text`.
    pub async fn with_plain_summary(mut self, explainer: &Explainer, text: &str) -> Self {
        self.plain_summary = Some(explainer.summarize(text).await);
        self
    }
}

/// Renders the report as Markdown.
pub fn render_markdown(report: &SummaryReport) -> String {
    let summary = &report.summary;
    let risk = &report.risk_analysis;
    let mut md = String::from("# Contract Analysis Report\n\n");

    let _ = writeln!(md, "**Document**: {}\n", summary.document_id);

    md.push_str("## Executive Summary\n\n");
    let _ = writeln!(md, "- **Contract Type**: {}", summary.contract_type);
    let _ = writeln!(md, "- **Overall Risk Level**: **{}**", summary.overall_risk_level);
    let _ = writeln!(md, "- **Total Clauses Analyzed**: {}", summary.total_clauses);
    let _ = writeln!(md, "- **Compliance Issues**: {}\n", summary.compliance_issues_count);

    if let Some(plain) = &report.plain_summary {
        let _ = writeln!(md, "### Plain-Language Summary ({})\n\n{}\n", plain.source, plain.text);
    }

    md.push_str("## Risk Analysis\n\n");
    let _ = writeln!(md, "- **High-Risk Clauses**: {}", risk.high_risk_clauses.len());
    let _ = writeln!(md, "- **Medium-Risk Clauses**: {}", risk.medium_risk_clauses.len());
    let _ = writeln!(md, "- **Total Issues Found**: {}\n", risk.total_issues);

    for clause in risk.flagged() {
        let _ = writeln!(md, "### Clause {} ({})\n", clause.index + 1, clause.risk);
        let _ = writeln!(md, "> {}\n", clause.text);
        for issue in &clause.issues {
            let _ = writeln!(md, "- **{}**: {}", issue.rule_name, issue.recommendation);
        }
        if !clause.issues.is_empty() {
            md.push('\n');
        }
    }

    if !report.explanations.is_empty() {
        md.push_str("## Clause Explanations\n\n");
        for item in &report.explanations {
            let _ = writeln!(md, "### Clause {}\n", item.clause_index + 1);
            let _ = writeln!(
                md,
                "**Explanation** ({}): {}\n",
                item.explanation.source, item.explanation.text
            );
            let _ = writeln!(
                md,
                "**Why it is risky** ({}): {}\n",
                item.reasoning.source, item.reasoning.text
            );
            let _ = writeln!(
                md,
                "**Suggested alternative** ({}): {}\n",
                item.alternative.source, item.alternative.text
            );
        }
    }

    md.push_str("## Compliance Checklist\n\n");
    for finding in report
        .compliance
        .generic
        .iter()
        .chain(&report.compliance.jurisdiction)
    {
        let icon = if finding.is_missing() { "✗" } else { "✓" };
        let _ = writeln!(md, "{icon} **{}** ({})", finding.rule_name, finding.severity);
        let _ = writeln!(md, "  - {}\n", finding.description);
    }

    md.push_str("## Recommendations\n\n");
    for (i, recommendation) in report.recommendations.iter().enumerate() {
        let _ = writeln!(md, "{}. {recommendation}", i + 1);
    }

    md
}

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Contract Analysis Report</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 20px; line-height: 1.6; }
        h1, h2 { color: #2c3e50; }
        .high-risk { color: #e74c3c; font-weight: bold; }
        .medium-risk { color: #f39c12; font-weight: bold; }
        .low-risk { color: #27ae60; font-weight: bold; }
        table { border-collapse: collapse; width: 100%; margin-top: 10px; }
        th, td { border: 1px solid #bdc3c7; padding: 10px; text-align: left; }
        th { background-color: #ecf0f1; }
        .section { margin-top: 30px; padding: 15px; border-left: 4px solid #3498db; }
        blockquote { margin: 10px 0; padding-left: 10px; border-left: 3px solid #bdc3c7; }
    </style>
</head>
<body>
    <h1>Contract Analysis Report</h1>
"#;

/// Renders the report as a standalone HTML page. All document text is escaped.
pub fn render_html(report: &SummaryReport) -> String {
    let summary = &report.summary;
    let risk = &report.risk_analysis;
    let mut html = String::from(HTML_HEAD);

    let _ = write!(
        html,
        "<div class='section'><h2>Executive Summary</h2>\
         <p><strong>Document</strong>: {}</p>\
         <p><strong>Contract Type</strong>: {}</p>\
         <p><strong>Overall Risk Level</strong>: <span class='{}'>{}</span></p>\
         <p><strong>Total Clauses</strong>: {}</p>\
         <p><strong>Compliance Issues</strong>: {}</p>",
        escape_html(&summary.document_id),
        escape_html(&summary.contract_type),
        risk_class(summary.overall_risk_level),
        summary.overall_risk_level,
        summary.total_clauses,
        summary.compliance_issues_count,
    );
    if let Some(plain) = &report.plain_summary {
        let _ = write!(html, "<p>{}</p>", escape_html(&plain.text));
    }
    html.push_str("</div>\n");

    let _ = write!(
        html,
        "<div class='section'><h2>Risk Analysis</h2>\
         <p><strong>High-Risk Clauses</strong>: {}</p>\
         <p><strong>Medium-Risk Clauses</strong>: {}</p>\
         <p><strong>Total Issues Found</strong>: {}</p>",
        risk.high_risk_clauses.len(),
        risk.medium_risk_clauses.len(),
        risk.total_issues,
    );
    for clause in risk.flagged() {
        let _ = write!(
            html,
            "<h3>Clause {} <span class='{}'>{}</span></h3><blockquote>{}</blockquote>",
            clause.index + 1,
            risk_class(clause.risk),
            clause.risk,
            escape_html(&clause.text),
        );
        if !clause.issues.is_empty() {
            html.push_str("<ul>");
            for issue in &clause.issues {
                let _ = write!(
                    html,
                    "<li><strong>{}</strong>: {}</li>",
                    escape_html(&issue.rule_name),
                    escape_html(&issue.recommendation),
                );
            }
            html.push_str("</ul>");
        }
    }
    html.push_str("</div>\n");

    if !report.explanations.is_empty() {
        html.push_str("<div class='section'><h2>Clause Explanations</h2>");
        for item in &report.explanations {
            let _ = write!(
                html,
                "<h3>Clause {}</h3>\
                 <p><strong>Explanation</strong> ({}): {}</p>\
                 <p><strong>Why it is risky</strong> ({}): {}</p>\
                 <p><strong>Suggested alternative</strong> ({}): {}</p>",
                item.clause_index + 1,
                item.explanation.source,
                escape_html(&item.explanation.text),
                item.reasoning.source,
                escape_html(&item.reasoning.text),
                item.alternative.source,
                escape_html(&item.alternative.text),
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str(
        "<div class='section'><h2>Compliance Checklist</h2><table>\
         <tr><th>Rule</th><th>Status</th><th>Severity</th><th>Description</th></tr>",
    );
    for finding in report
        .compliance
        .generic
        .iter()
        .chain(&report.compliance.jurisdiction)
    {
        let status = if finding.is_missing() {
            "✗ Missing"
        } else {
            "✓ Present"
        };
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{status}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&finding.rule_name),
            finding.severity,
            escape_html(&finding.description),
        );
    }
    html.push_str("</table></div>\n");

    html.push_str("<div class='section'><h2>Recommendations</h2><ol>");
    for recommendation in &report.recommendations {
        let _ = write!(html, "<li>{}</li>", escape_html(recommendation));
    }
    html.push_str("</ol></div>\n</body>\n</html>\n");

    html
}

fn risk_class(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => "high-risk",
        RiskTier::Medium => "medium-risk",
        RiskTier::Low => "low-risk",
    }
}

/// Escapes text for inclusion in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
