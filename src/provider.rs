//! Provider seam and the raw records it hands back.
//!
//! Every field on these records is optional or defaulted: Scholar pages omit
//! things freely and downstream shaping must never fail on a missing field.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Year (as string) to citation count.
pub type CitesPerYear = BTreeMap<String, u64>;

/// Author list as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    /// Single string, names separated by " and "
    Joined(String),
    /// One entry per author
    List(Vec<String>),
}

impl Authors {
    /// Individual author names, in order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Joined(s) => s
                .split(" and ")
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .collect(),
            Self::List(v) => v.iter().map(String::as_str).collect(),
        }
    }

    /// True when no author name is present.
    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

impl Default for Authors {
    fn default() -> Self {
        Self::Joined(String::new())
    }
}

/// Minimal author record from a name search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorStub {
    pub scholar_id: String,
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub email_domain: Option<String>,
    pub cited_by: Option<u64>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub url_picture: Option<String>,
}

/// Publication row as listed on an author's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicationStub {
    /// Scholar's `citation_for_view` identifier
    pub author_pub_id: String,
    pub title: Option<String>,
    pub authors: Option<String>,
    /// Gray venue line, e.g. "Nature 521 (7553), 436-444"
    pub citation: Option<String>,
    pub pub_year: Option<String>,
    pub num_citations: Option<u64>,
}

/// Fully hydrated author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorDetail {
    pub scholar_id: String,
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub email_domain: Option<String>,
    pub cited_by: Option<u64>,
    pub citations_5y: Option<u64>,
    pub h_index: Option<u64>,
    pub h_index_5y: Option<u64>,
    pub i10_index: Option<u64>,
    pub i10_index_5y: Option<u64>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub url_picture: Option<String>,
    #[serde(default)]
    pub cites_per_year: CitesPerYear,
    #[serde(default)]
    pub publications: Vec<PublicationStub>,
}

/// Bibliographic sub-record of a filled publication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bibliography {
    pub title: Option<String>,
    pub pub_year: Option<String>,
    pub author: Option<Authors>,
    pub journal: Option<String>,
    pub venue: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub doi: Option<String>,
    pub volume: Option<String>,
    /// Issue number
    pub number: Option<String>,
    pub pages: Option<String>,
    pub publisher: Option<String>,
    pub eprint: Option<String>,
}

/// Fully hydrated publication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilledPublication {
    #[serde(default)]
    pub bib: Bibliography,
    pub num_citations: Option<u64>,
    pub pub_url: Option<String>,
    #[serde(default)]
    pub cites_per_year: CitesPerYear,
    pub gsrank: Option<u64>,
}

/// Upstream scholarly-metadata capability.
///
/// Implementations may fail on any call; the fetcher decides which failures are
/// fatal.
#[async_trait]
pub trait ScholarProvider: Send + Sync {
    /// Candidate authors for a free-text name, best match first.
    async fn search_authors(&self, name: &str) -> Result<Vec<AuthorStub>>;

    /// Hydrate an author stub with profile metrics and the publication list.
    async fn fill_author(&self, stub: &AuthorStub) -> Result<AuthorDetail>;

    /// Hydrate a single publication.
    async fn fill_publication(&self, stub: &PublicationStub) -> Result<FilledPublication>;
}
