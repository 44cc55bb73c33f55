//! Clause segmentation.
//!
//! Splits raw contract text into candidate clauses on structural
//! delimiters: runs of line breaks, semicolons, and a period followed by two
//! or more whitespace characters.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::SegmentationConfig;

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static CLAUSE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+|;|\.\s{2,}").unwrap());

/// A clause cut out of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Position of the clause in the clause sequence (0-based).
    pub index: usize,
    /// Byte offset of the trimmed clause text in the source document.
    pub offset: usize,
    /// Trimmed clause text.
    pub text: String,
}

/// Splits document text into an ordered sequence of clauses.
#[derive(Debug, Clone, Copy)]
pub struct ClauseSegmenter {
    max_clauses: usize,
    min_clause_chars: usize,
}

impl Default for ClauseSegmenter {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

impl ClauseSegmenter {
    /// Creates a segmenter keeping at most `max_clauses` clauses, each longer
    /// than `min_clause_chars` characters after trimming.
    pub const fn new(max_clauses: usize, min_clause_chars: usize) -> Self {
        Self {
            max_clauses,
            min_clause_chars,
        }
    }

    /// Creates a segmenter from the segmentation section of the configuration.
    pub const fn from_config(config: &SegmentationConfig) -> Self {
        Self::new(config.max_clauses, config.min_clause_chars)
    }

    /// Returns the clause cap.
    pub const fn max_clauses(&self) -> usize {
        self.max_clauses
    }

    /// Segments `text` into clauses in document order.
    ///
    /// Pieces that are too short after trimming are dropped, and clauses past
    /// the cap are discarded silently.
    pub fn segment(&self, text: &str) -> Vec<Clause> {
        let mut clauses = Vec::new();
        let mut piece_start = 0;

        let boundaries = CLAUSE_BOUNDARY
            .find_iter(text)
            .map(|m| m.range())
            .chain(std::iter::once(text.len()..text.len()));

        for boundary in boundaries {
            if clauses.len() >= self.max_clauses {
                break;
            }

            let raw = &text[piece_start..boundary.start];
            let raw_offset = piece_start;
            piece_start = boundary.end;

            let without_leading = raw.trim_start();
            let trimmed = without_leading.trim_end();
            if trimmed.chars().count() <= self.min_clause_chars {
                continue;
            }

            clauses.push(Clause {
                index: clauses.len(),
                offset: raw_offset + (raw.len() - without_leading.len()),
                text: trimmed.to_string(),
            });
        }

        tracing::debug!(
            clause_count = clauses.len(),
            text_len = text.len(),
            "Segmented document into clauses"
        );

        clauses
    }
}
