//! Pattern-based entity extraction.
//!
//! Pulls parties, dates, amounts, jurisdictions, key dates, payment terms and
//! obligation/right/prohibition sentences out of contract text. Everything is
//! regex and keyword driven.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default cap on sentences reported per obligation/right/prohibition list.
pub const DEFAULT_MAX_SENTENCES: usize = 50;

const OBLIGATION_MARKERS: &[&str] = &["shall", "must", "required to", "obliged to", "responsible for"];
const RIGHT_MARKERS: &[&str] = &["right to", "entitled to", "may", "permitted to", "may choose"];
const PROHIBITION_MARKERS: &[&str] = &[
    "shall not",
    "cannot",
    "prohibited",
    "no right to",
    "not permitted",
];

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static BETWEEN_PARTIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbetween\s+(.+?)\s+and\s+(.+?)(?:[.:,\n]|$)").unwrap()
});

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static PARTY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*part(?:y|ies)\b[^:\n]*:[ \t]*([^\n]+)").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex patterns
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b\d{1,2}(?:st|nd|rd|th)?\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}\b",
        r"\b\d{1,2}/\d{1,2}/\d{4}\b",
        r"\b\d{4}-\d{1,2}-\d{1,2}\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

#[allow(clippy::unwrap_used)] // Compile-time constant regex patterns
static AMOUNT_PATTERNS: LazyLock<Vec<(Regex, Currency)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?:\bRs|\bINR|\bRupees?)\s*\.?\s*(\d{1,3}(?:,\d{2,3})*(?:\.\d{2})?)")
                .unwrap(),
            Currency::Inr,
        ),
        (
            Regex::new(r"(?:\bUS\$|\bUSD|\$)\s*(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)").unwrap(),
            Currency::Usd,
        ),
    ]
});

#[allow(clippy::unwrap_used)] // Compile-time constant regex patterns
static JURISDICTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(?:jurisdiction|governed by|applicable law)[: \t]+([^.,\n]+)").unwrap(),
        Regex::new(r"(?i)(?:courts of|venue|seat of arbitration)[: \t]+([^.,\n]+)").unwrap(),
    ]
});

#[allow(clippy::unwrap_used)] // Compile-time constant regex patterns
static KEY_DATE_PATTERNS: LazyLock<Vec<(Regex, KeyDateKind)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)(?:effective date|execution date)[: \t]+(\d{1,2}[/-]\d{1,2}[/-]\d{4})")
                .unwrap(),
            KeyDateKind::Effective,
        ),
        (
            Regex::new(r"(?i)(?:expiry|termination|end date)[: \t]+(\d{1,2}[/-]\d{1,2}[/-]\d{4})")
                .unwrap(),
            KeyDateKind::Expiry,
        ),
        (
            Regex::new(r"(?i)(?:renewal|anniversary)[: \t]+(\d{1,2}[/-]\d{1,2}[/-]\d{4})").unwrap(),
            KeyDateKind::Renewal,
        ),
    ]
});

#[allow(clippy::unwrap_used)] // Compile-time constant regex patterns
static PAYMENT_PATTERNS: LazyLock<Vec<(Regex, PaymentTermKind)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(?:payment terms?|due|net)\b[: \t]+([^.\n]+)").unwrap(),
            PaymentTermKind::Payment,
        ),
        (
            Regex::new(r"(?i)\b(?:invoice|billing)\b[: \t]+([^.\n]+)").unwrap(),
            PaymentTermKind::Invoice,
        ),
    ]
});

/// Currency of an extracted amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indian rupee.
    Inr,
    /// US dollar.
    Usd,
}

/// A monetary amount as written in the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    /// Digits with grouping separators, e.g. `1,00,000.00`.
    pub amount: String,
    /// Currency of the amount.
    pub currency: Currency,
}

/// Role of a key date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDateKind {
    /// Effective or execution date.
    Effective,
    /// Expiry, termination or end date.
    Expiry,
    /// Renewal or anniversary date.
    Renewal,
}

/// A date with its contractual role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDate {
    /// Date as written.
    pub date: String,
    /// Role of the date.
    pub kind: KeyDateKind,
}

/// Kind of payment term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTermKind {
    /// Payment schedule or due terms.
    Payment,
    /// Invoicing or billing terms.
    Invoice,
}

/// A payment-related phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerm {
    /// Text following the marker, trimmed.
    pub term: String,
    /// Kind of term.
    pub kind: PaymentTermKind,
}

/// Everything the extractor found in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Contracting parties, first-seen order.
    pub parties: Vec<String>,
    /// Dates in any supported format, first-seen order.
    pub dates: Vec<String>,
    /// Monetary amounts.
    pub amounts: Vec<MonetaryAmount>,
    /// Governing law, courts and venues.
    pub jurisdictions: Vec<String>,
    /// Effective, expiry and renewal dates.
    pub key_dates: Vec<KeyDate>,
    /// Payment and invoicing terms.
    pub payment_terms: Vec<PaymentTerm>,
    /// Sentences imposing obligations.
    pub obligations: Vec<String>,
    /// Sentences granting rights.
    pub rights: Vec<String>,
    /// Sentences stating prohibitions.
    pub prohibitions: Vec<String>,
}

/// Extracts structured entities from contract text.
#[derive(Debug, Clone, Copy)]
pub struct EntityExtractor {
    max_sentences: usize,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    /// Creates an extractor with the default sentence cap.
    pub const fn new() -> Self {
        Self {
            max_sentences: DEFAULT_MAX_SENTENCES,
        }
    }

    /// Overrides the per-list sentence cap.
    #[must_use]
    pub const fn with_max_sentences(mut self, max_sentences: usize) -> Self {
        self.max_sentences = max_sentences;
        self
    }

    /// Runs every extractor over `text`.
    pub fn extract(&self, text: &str) -> ExtractedEntities {
        let sentences = split_sentences(text);
        ExtractedEntities {
            parties: self.parties(text),
            dates: self.dates(text),
            amounts: self.amounts(text),
            jurisdictions: self.jurisdictions(text),
            key_dates: self.key_dates(text),
            payment_terms: self.payment_terms(text),
            obligations: self.sentences_with(&sentences, OBLIGATION_MARKERS),
            rights: self.sentences_with(&sentences, RIGHT_MARKERS),
            prohibitions: self.sentences_with(&sentences, PROHIBITION_MARKERS),
        }
    }

    /// Extracts party names from a `between X and Y` phrase and `Party:` lines.
    pub fn parties(&self, text: &str) -> Vec<String> {
        let mut parties = Vec::new();
        if let Some(caps) = BETWEEN_PARTIES.captures(text) {
            parties.extend(caps.iter().skip(1).flatten().map(|m| m.as_str()));
        }
        parties.extend(
            PARTY_LINE
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str()),
        );
        dedup_trimmed(parties.into_iter().filter(|p| p.trim().chars().count() > 3))
    }

    /// Extracts dates written as `1st January 2025`, `01/02/2025` or `2025-01-02`.
    pub fn dates(&self, text: &str) -> Vec<String> {
        dedup_trimmed(
            DATE_PATTERNS
                .iter()
                .flat_map(|pattern| pattern.find_iter(text).map(|m| m.as_str())),
        )
    }

    /// Extracts INR and USD amounts.
    pub fn amounts(&self, text: &str) -> Vec<MonetaryAmount> {
        AMOUNT_PATTERNS
            .iter()
            .flat_map(|(pattern, currency)| {
                pattern.captures_iter(text).filter_map(move |caps| {
                    caps.get(1).map(|m| MonetaryAmount {
                        amount: m.as_str().to_string(),
                        currency: *currency,
                    })
                })
            })
            .collect()
    }

    /// Extracts governing law, court and venue phrases.
    pub fn jurisdictions(&self, text: &str) -> Vec<String> {
        dedup_trimmed(JURISDICTION_PATTERNS.iter().flat_map(|pattern| {
            pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        }))
    }

    /// Extracts labelled effective, expiry and renewal dates.
    pub fn key_dates(&self, text: &str) -> Vec<KeyDate> {
        KEY_DATE_PATTERNS
            .iter()
            .flat_map(|(pattern, kind)| {
                pattern.captures_iter(text).filter_map(move |caps| {
                    caps.get(1).map(|m| KeyDate {
                        date: m.as_str().to_string(),
                        kind: *kind,
                    })
                })
            })
            .collect()
    }

    /// Extracts payment and invoicing terms.
    pub fn payment_terms(&self, text: &str) -> Vec<PaymentTerm> {
        PAYMENT_PATTERNS
            .iter()
            .flat_map(|(pattern, kind)| {
                pattern.captures_iter(text).filter_map(move |caps| {
                    caps.get(1).map(|m| PaymentTerm {
                        term: m.as_str().trim().to_string(),
                        kind: *kind,
                    })
                })
            })
            .filter(|term| !term.term.is_empty())
            .collect()
    }

    fn sentences_with(&self, sentences: &[&str], markers: &[&str]) -> Vec<String> {
        sentences
            .iter()
            .filter(|sentence| {
                let lowered = sentence.to_lowercase();
                markers.iter().any(|marker| lowered.contains(marker))
            })
            .take(self.max_sentences)
            .map(|sentence| (*sentence).to_string())
            .collect()
    }
}

/// Splits text into trimmed sentences after `.`, `!` or `?` followed by
/// whitespace, and at line breaks.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '.' | '!' | '?' => chars.peek().is_some_and(|(_, next)| next.is_whitespace()),
            '\n' => true,
            _ => false,
        };
        if boundary {
            let end = i + c.len_utf8();
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, piece: &'a str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

fn dedup_trimmed<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty() && seen.insert(*item))
        .map(str::to_string)
        .collect()
}
