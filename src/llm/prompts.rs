//! Prompt templates for contract explanations.

use crate::analysis::RiskTier;
use crate::utils::truncate_chars;

/// Longest document prefix sent for summarization.
pub const SUMMARY_INPUT_CHARS: usize = 3000;

/// Word budget requested for summaries.
pub const SUMMARY_MAX_WORDS: usize = 500;

/// System prompt shared by all explanation requests.
pub const SYSTEM_PROMPT: &str = r#"You are a contract review assistant for small and medium businesses in India.
You explain legal text in plain business English.

Rules:
1. Be concise and concrete. Avoid legal jargon unless you define it.
2. Never invent facts that are not present in the text you are given.
3. Do not give definitive legal advice; point out where a lawyer should review.
4. Answer in plain text without Markdown headings."#;

/// Builds the summarization prompt.
pub fn summarize_prompt(text: &str) -> String {
    format!(
        "Summarize this legal text in simple business English (max {SUMMARY_MAX_WORDS} words):\n\n{}",
        truncate_chars(text, SUMMARY_INPUT_CHARS)
    )
}

/// Builds the clause explanation prompt.
pub fn explain_clause_prompt(clause: &str) -> String {
    format!(
        r#"Analyze this legal clause and provide:
1. Simple explanation (2-3 sentences)
2. Key obligations (if any)
3. Key rights (if any)
4. Potential risks (if any)
5. Recommendation for an SME

Clause: {clause}"#
    )
}

/// Builds the alternative wording prompt.
pub fn suggest_alternative_prompt(clause: &str, risk: RiskTier) -> String {
    format!(
        r#"For this {risk}-risk legal clause, suggest a more balanced alternative wording
that protects both parties fairly and is SME-friendly:

Original: {clause}

Provide:
1. Problem with original
2. Suggested alternative
3. Why it's better"#
    )
}

/// Builds the risk reasoning prompt.
pub fn risk_reasoning_prompt(clause: &str) -> String {
    format!(
        r#"Why is this legal clause risky? Provide brief risk reasoning:

{clause}

Format: [Risk Category]: [Specific Concern]"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_truncates_input() {
        let text = "§".repeat(SUMMARY_INPUT_CHARS + 50);
        let prompt = summarize_prompt(&text);
        assert!(prompt.contains("max 500 words"));
        assert_eq!(prompt.matches('§').count(), SUMMARY_INPUT_CHARS);
    }

    #[test]
    fn alternative_prompt_names_tier() {
        let prompt = suggest_alternative_prompt("The Vendor may terminate at will", RiskTier::High);
        assert!(prompt.starts_with("For this High-risk legal clause"));
        assert!(prompt.contains("Original: The Vendor may terminate at will"));
    }
}
