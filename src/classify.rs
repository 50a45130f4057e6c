//! Keyword-based publication type classification.

use crate::provider::Bibliography;
use serde::{Deserialize, Serialize};
use std::fmt;

const CONFERENCE_TOKENS: &[&str] = &["conference", "conf", "proceedings", "proc"];
const JOURNAL_TOKENS: &[&str] = &["journal", "transactions"];
const BOOK_TOKENS: &[&str] = &["book", "chapter"];
const THESIS_TOKENS: &[&str] = &["thesis", "dissertation"];

/// Coarse publication type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PublicationType {
    #[serde(rename = "Conference Paper")]
    ConferencePaper,
    #[serde(rename = "Journal Article")]
    JournalArticle,
    #[serde(rename = "Book/Book Chapter")]
    Book,
    #[serde(rename = "Thesis/Dissertation")]
    Thesis,
    #[default]
    #[serde(rename = "Other")]
    Other,
}

impl PublicationType {
    /// Label used in JSON output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConferencePaper => "Conference Paper",
            Self::JournalArticle => "Journal Article",
            Self::Book => "Book/Book Chapter",
            Self::Thesis => "Thesis/Dissertation",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for PublicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| haystack.contains(t))
}

/// Classify from raw venue and journal strings.
///
/// Rules are evaluated in order and the first hit wins, so a conference token in
/// the venue beats any journal name.
pub fn classify_fields(venue: Option<&str>, journal: Option<&str>) -> PublicationType {
    let venue = venue.unwrap_or_default().to_lowercase();
    let journal = journal.unwrap_or_default().to_lowercase();

    if contains_any(&venue, CONFERENCE_TOKENS) || contains_any(&journal, CONFERENCE_TOKENS) {
        PublicationType::ConferencePaper
    } else if !journal.is_empty() || contains_any(&venue, JOURNAL_TOKENS) {
        PublicationType::JournalArticle
    } else if contains_any(&venue, BOOK_TOKENS) {
        PublicationType::Book
    } else if contains_any(&venue, THESIS_TOKENS) {
        PublicationType::Thesis
    } else {
        PublicationType::Other
    }
}

/// Classify a publication's bibliography.
pub fn classify(bib: &Bibliography) -> PublicationType {
    classify_fields(bib.venue.as_deref(), bib.journal.as_deref())
}
