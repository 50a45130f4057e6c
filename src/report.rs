//! Plain-text rendering of a profile for the `lookup` command.

use crate::profile::{AuthorProfile, PublicationRecord};
use crate::provider::CitesPerYear;

const RULE_WIDTH: usize = 80;
const ABSTRACT_PREVIEW_CHARS: usize = 500;

/// "2019: 4, 2020: 10" sorted by year, or a placeholder when empty.
pub fn format_citations_per_year(cites: &CitesPerYear) -> String {
    if cites.is_empty() {
        return "No yearly citation data available".to_string();
    }
    cites
        .iter()
        .map(|(year, count)| format!("{}: {}", year, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "N/A",
    }
}

fn truncate_abstract(text: &str) -> String {
    if text.chars().count() > ABSTRACT_PREVIEW_CHARS {
        let head: String = text.chars().take(ABSTRACT_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn optional_count(value: Option<u64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn banner(title: &str) -> Vec<String> {
    vec![rule(), title.to_string(), rule()]
}

/// Render the author header block.
pub fn render_header(profile: &AuthorProfile) -> String {
    let mut lines = banner("SCHOLAR PROFILE");
    lines.extend([
        format!("Name: {}", or_na(Some(profile.name.as_str()))),
        format!("Affiliation: {}", or_na(profile.affiliation.as_deref())),
        format!("Total Citations: {}", profile.total_citations),
        format!("h-index: {}", optional_count(profile.h_index)),
        format!("i10-index: {}", optional_count(profile.i10_index)),
        format!("Research Interests: {}", profile.interests.join(", ")),
        format!("Profile URL: {}", or_na(profile.profile_url.as_deref())),
    ]);
    lines.join("\n") + "\n"
}

/// Render one publication, numbered from 1.
pub fn render_publication(number: usize, publication: &PublicationRecord) -> String {
    let mut lines = banner(&format!("PUBLICATION #{}", number));

    lines.push(format!("\nTITLE: {}", publication.title));
    lines.push(format!("TYPE: {}", publication.pub_type));
    lines.push(format!("YEAR: {}", publication.year));

    lines.push("\nAUTHORS:".to_string());
    lines.extend(
        publication
            .authors
            .names()
            .iter()
            .enumerate()
            .map(|(idx, author)| format!("  {}. {}", idx + 1, author)),
    );

    lines.push("\nPUBLICATION DETAILS:".to_string());
    let venue = if publication.venue.is_empty() {
        &publication.journal
    } else {
        &publication.venue
    };
    let details = [
        ("Venue/Journal", venue),
        ("Volume", &publication.volume),
        ("Issue", &publication.issue),
        ("Pages", &publication.pages),
        ("Publisher", &publication.publisher),
    ];
    lines.extend(
        details
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| format!("  {}: {}", label, value)),
    );

    lines.push("\nIMPACT METRICS:".to_string());
    lines.push(format!("  Total Citations: {}", publication.citations));
    lines.push(format!(
        "  Google Scholar Rank: {}",
        optional_count(publication.gsrank)
    ));
    lines.push(format!(
        "  Citations per year: {}",
        format_citations_per_year(&publication.citations_per_year)
    ));

    lines.push("\nABSTRACT:".to_string());
    lines.push(format!("  {}", truncate_abstract(&publication.abstract_text)));

    lines.push("\nADDITIONAL INFORMATION:".to_string());
    if !publication.keywords.is_empty() {
        lines.push(format!("  Keywords: {}", publication.keywords.join(", ")));
    }
    if !publication.doi.is_empty() {
        lines.push(format!("  DOI: {}", publication.doi));
    }
    if !publication.eprint.is_empty() {
        lines.push(format!("  ePrint: {}", publication.eprint));
    }
    lines.push(format!("  URL: {}", publication.url));

    lines.join("\n") + "\n"
}

/// Full report: header followed by every publication.
pub fn render_profile(profile: &AuthorProfile) -> String {
    let mut out = render_header(profile);
    if profile.publications.is_empty() {
        out.push_str("\nNo publications retrieved.\n");
    }
    for (idx, publication) in profile.publications.iter().enumerate() {
        out.push('\n');
        out.push_str(&render_publication(idx + 1, publication));
    }
    out
}
