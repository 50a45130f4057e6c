//! Normalized output records and the mapping from provider records into them.

use crate::classify::{classify, PublicationType};
use crate::provider::{AuthorDetail, Authors, CitesPerYear, FilledPublication};
use serde::{Deserialize, Serialize};

/// Placeholder used when Scholar has no description for a publication.
pub const NO_ABSTRACT: &str = "No abstract available";

/// A shaped publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
    pub title: String,
    pub year: String,
    pub authors: Authors,
    pub journal: String,
    pub citations: u64,
    pub url: String,
    #[serde(rename = "type")]
    pub pub_type: PublicationType,
    pub venue: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: Vec<String>,
    pub doi: String,
    pub volume: String,
    pub issue: String,
    pub pages: String,
    pub publisher: String,
    pub citations_per_year: CitesPerYear,
    pub gsrank: Option<u64>,
    pub eprint: String,
}

impl PublicationRecord {
    /// Classify and map a filled publication. Never fails.
    pub fn from_filled(filled: FilledPublication) -> Self {
        let pub_type = classify(&filled.bib);
        let bib = filled.bib;

        Self {
            title: bib.title.unwrap_or_default(),
            year: bib.pub_year.unwrap_or_default(),
            authors: bib.author.unwrap_or_default(),
            journal: bib.journal.unwrap_or_default(),
            citations: filled.num_citations.unwrap_or(0),
            url: filled.pub_url.unwrap_or_default(),
            pub_type,
            venue: bib.venue.unwrap_or_default(),
            abstract_text: bib.abstract_text.unwrap_or_else(|| NO_ABSTRACT.to_string()),
            keywords: bib.keywords.unwrap_or_default(),
            doi: bib.doi.unwrap_or_default(),
            volume: bib.volume.unwrap_or_default(),
            issue: bib.number.unwrap_or_default(),
            pages: bib.pages.unwrap_or_default(),
            publisher: bib.publisher.unwrap_or_default(),
            citations_per_year: filled.cites_per_year,
            gsrank: filled.gsrank,
            eprint: bib.eprint.unwrap_or_default(),
        }
    }
}

/// Author profile returned by `GET /search/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub name: String,
    pub affiliation: Option<String>,
    #[serde(default)]
    pub total_citations: u64,
    pub h_index: Option<u64>,
    pub i10_index: Option<u64>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub profile_url: Option<String>,
    #[serde(default)]
    pub publications: Vec<PublicationRecord>,
}

impl AuthorProfile {
    /// Assemble the response from a filled author and its shaped publications.
    pub fn from_detail(detail: AuthorDetail, publications: Vec<PublicationRecord>) -> Self {
        Self {
            name: detail.name.unwrap_or_default(),
            affiliation: detail.affiliation,
            total_citations: detail.cited_by.unwrap_or(0),
            h_index: detail.h_index,
            i10_index: detail.i10_index,
            interests: detail.interests,
            profile_url: detail.url_picture,
            publications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Bibliography;

    #[test]
    fn test_shaping_all_missing() {
        let record = PublicationRecord::from_filled(FilledPublication::default());
        assert_eq!(record.title, "");
        assert_eq!(record.year, "");
        assert!(record.authors.is_empty());
        assert_eq!(record.citations, 0);
        assert_eq!(record.pub_type, PublicationType::Other);
        assert_eq!(record.abstract_text, NO_ABSTRACT);
        assert!(record.keywords.is_empty());
        assert!(record.citations_per_year.is_empty());
        assert_eq!(record.gsrank, None);
        assert_eq!(record.issue, "");
        assert_eq!(record.eprint, "");
    }

    #[test]
    fn test_shaping_maps_number_to_issue() {
        let filled = FilledPublication {
            bib: Bibliography {
                title: Some("Deep learning".to_string()),
                pub_year: Some("2015".to_string()),
                journal: Some("Nature".to_string()),
                volume: Some("521".to_string()),
                number: Some("7553".to_string()),
                pages: Some("436-444".to_string()),
                abstract_text: Some("Deep learning allows...".to_string()),
                ..Default::default()
            },
            num_citations: Some(90000),
            pub_url: Some("https://www.nature.com/articles/nature14539".to_string()),
            cites_per_year: [("2016".to_string(), 1200)].into_iter().collect(),
            gsrank: Some(3),
        };

        let record = PublicationRecord::from_filled(filled);
        assert_eq!(record.issue, "7553");
        assert_eq!(record.pub_type, PublicationType::JournalArticle);
        assert_eq!(record.citations, 90000);
        assert_eq!(record.abstract_text, "Deep learning allows...");
        assert_eq!(record.citations_per_year.get("2016"), Some(&1200));
        assert_eq!(record.gsrank, Some(3));
    }

    #[test]
    fn test_record_json_field_names() {
        let record = PublicationRecord::from_filled(FilledPublication::default());
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["type"], "Other");
        assert_eq!(json["abstract"], NO_ABSTRACT);
        assert_eq!(json["authors"], "");
        assert!(json["gsrank"].is_null());
        assert!(json.get("pub_type").is_none());
    }

    #[test]
    fn test_profile_defaults() {
        let profile = AuthorProfile::from_detail(AuthorDetail::default(), Vec::new());
        assert_eq!(profile.name, "");
        assert_eq!(profile.total_citations, 0);
        assert_eq!(profile.h_index, None);
        assert!(profile.interests.is_empty());
        assert!(profile.publications.is_empty());
    }

    #[test]
    fn test_profile_url_is_picture() {
        let detail = AuthorDetail {
            name: Some("Geoffrey Hinton".to_string()),
            cited_by: Some(500),
            url_picture: Some("https://scholar.google.com/citations?view_op=medium_photo&user=abc".to_string()),
            ..Default::default()
        };
        let profile = AuthorProfile::from_detail(detail, Vec::new());
        assert_eq!(profile.total_citations, 500);
        assert!(profile
            .profile_url
            .as_deref()
            .is_some_and(|u| u.contains("user=abc")));
    }
}
