//! Google Scholar profile scraping.
//!
//! [`ScholarScraper`] implements [`ScholarProvider`] against the `citations`
//! pages of Google Scholar: the author search, the author profile (with its
//! paged publication table) and the per-publication "view citation" page.

use crate::config::ScraperConfig;
use crate::cookies::CookieJar;
use crate::error::{OptionExt, Result, ScholarError};
use crate::provider::{
    AuthorDetail, AuthorStub, Authors, Bibliography, CitesPerYear, FilledPublication,
    PublicationStub, ScholarProvider,
};
use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Rows per page of an author's publication table
pub const PAGE_SIZE: usize = 100;

/// Upper bound on publication table pages fetched per author
const MAX_PUBLICATION_PAGES: usize = 20;

/// Scholar scraper with a shared HTTP client and session cookies.
pub struct ScholarScraper {
    client: reqwest::Client,
    base_url: String,
    cookie_header: String,
    jitter: Duration,
}

impl ScholarScraper {
    /// Build a scraper from config, loading persisted cookies once.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ScholarError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let jar = match &config.cookie_file {
            Some(path) => CookieJar::with_path(path),
            None => CookieJar::open_default(),
        };
        let cookie_header = jar.header();
        if cookie_header.is_empty() {
            warn!("No cookies loaded. Run 'scholar-profile cookies import <file>' if Scholar starts serving CAPTCHAs.");
        }

        Ok(Self {
            client: build_http_client(config.proxy.as_deref(), config.timeout)?,
            base_url,
            cookie_header,
            jitter: config.jitter,
        })
    }

    fn citations_url(&self, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/citations", self.base_url))
            .map_err(|e| ScholarError::Config(format!("Invalid base URL: {}", e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Author search URL for a free-text name
    pub fn search_url(&self, name: &str) -> Result<Url> {
        self.citations_url(&[
            ("view_op", "search_authors"),
            ("hl", "en"),
            ("mauthors", name),
        ])
    }

    /// Author profile URL for one page of the publication table
    pub fn author_url(&self, scholar_id: &str, cstart: usize) -> Result<Url> {
        self.citations_url(&[
            ("user", scholar_id),
            ("hl", "en"),
            ("cstart", &cstart.to_string()),
            ("pagesize", &PAGE_SIZE.to_string()),
        ])
    }

    /// Publication detail URL
    pub fn publication_url(&self, author_pub_id: &str) -> Result<Url> {
        self.citations_url(&[
            ("view_op", "view_citation"),
            ("hl", "en"),
            ("citation_for_view", author_pub_id),
        ])
    }

    async fn pause_jitter(&self) {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return;
        }
        let delay = rand::thread_rng().gen_range(0..=max_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    /// Fetch a Scholar page, rejecting rate-limit and CAPTCHA responses.
    async fn fetch_html(&self, url: &Url) -> Result<String> {
        self.pause_jitter().await;
        debug!(url = %url, "Fetching page");

        let mut request = self
            .client
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1");

        if !self.cookie_header.is_empty() {
            request = request.header("Cookie", self.cookie_header.as_str());
        }

        let response = request.send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ScholarError::RateLimited(60));
        }
        if response.url().path().starts_with("/sorry/") {
            warn!(url = %url, "Redirected to CAPTCHA page");
            return Err(ScholarError::Captcha);
        }
        if !status.is_success() {
            return Err(ScholarError::Api {
                code: status.as_u16(),
                message: format!("HTTP error: {}", status),
            });
        }

        let html = response.text().await?;
        if html.contains("Solving the above CAPTCHA") || html.contains("unusual traffic") {
            warn!(url = %url, "CAPTCHA detected");
            return Err(ScholarError::Captcha);
        }

        Ok(html)
    }
}

#[async_trait]
impl ScholarProvider for ScholarScraper {
    async fn search_authors(&self, name: &str) -> Result<Vec<AuthorStub>> {
        info!(name = %name, "Searching Scholar authors");
        let url = self.search_url(name)?;
        let html = self.fetch_html(&url).await?;
        let stubs = parse_author_search(&html, &self.base_url)?;
        info!(name = %name, count = stubs.len(), "Parsed author candidates");
        Ok(stubs)
    }

    async fn fill_author(&self, stub: &AuthorStub) -> Result<AuthorDetail> {
        let mut detail: Option<AuthorDetail> = None;

        for page in 0..MAX_PUBLICATION_PAGES {
            let url = self.author_url(&stub.scholar_id, page * PAGE_SIZE)?;
            let html = self.fetch_html(&url).await?;
            let parsed = parse_author_page(&html)?;
            let rows = parsed.publications.len();
            debug!(page, rows, "Parsed publication table page");

            match detail.as_mut() {
                None => detail = Some(parsed),
                Some(d) => d.publications.extend(parsed.publications),
            }
            if rows < PAGE_SIZE {
                break;
            }
        }

        let mut detail = detail.ok_or_parse("Author profile returned no pages")?;
        detail.scholar_id = stub.scholar_id.clone();
        detail.email_domain = detail.email_domain.take().or_else(|| stub.email_domain.clone());
        detail.url_picture = Some(photo_url(&self.base_url, &stub.scholar_id));
        if detail.name.is_none() {
            detail.name = stub.name.clone();
        }

        info!(
            scholar_id = %detail.scholar_id,
            publications = detail.publications.len(),
            "Author profile filled"
        );
        Ok(detail)
    }

    async fn fill_publication(&self, stub: &PublicationStub) -> Result<FilledPublication> {
        if stub.author_pub_id.is_empty() {
            return Err(ScholarError::Parse(
                "Publication has no citation_for_view id".to_string(),
            ));
        }
        let url = self.publication_url(&stub.author_pub_id)?;
        let html = self.fetch_html(&url).await?;
        let parsed = parse_publication_page(&html)?;
        Ok(merge_stub(parsed, stub))
    }
}

/// Build HTTP client with optional proxy
fn build_http_client(proxy: Option<&str>, timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .cookie_store(true);

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            ScholarError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ScholarError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Medium-size profile photo URL for an author
pub fn photo_url(base_url: &str, scholar_id: &str) -> String {
    format!(
        "{}/citations?view_op=medium_photo&user={}",
        base_url.trim_end_matches('/'),
        scholar_id
    )
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScholarError::Parse(format!("Invalid selector '{}': {}", css, e)))
}

/// Element text with whitespace collapsed
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope.select(sel).next().map(element_text).and_then(non_empty)
}

/// Value of a query parameter in a (possibly relative) Scholar link
fn link_param(base_url: &str, href: &str, key: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// First run of digits in a string, e.g. "Cited by 1,234" -> 1234
fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Parse the author search results page.
pub fn parse_author_search(html: &str, base_url: &str) -> Result<Vec<AuthorStub>> {
    let document = Html::parse_document(html);

    let card_selector = selector("div.gsc_1usr")?;
    let name_selector = selector("h3.gs_ai_name a")?;
    let aff_selector = selector("div.gs_ai_aff")?;
    let email_selector = selector("div.gs_ai_eml")?;
    let cby_selector = selector("div.gs_ai_cby")?;
    let interest_selector = selector("a.gs_ai_one_int")?;

    let mut stubs = Vec::new();

    for card in document.select(&card_selector) {
        let Some(link) = card.select(&name_selector).next() else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or("");
        let Some(scholar_id) = link_param(base_url, href, "user") else {
            debug!(href = %href, "Skipping author card without user id");
            continue;
        };

        let email_domain = first_text(card, &email_selector).map(|e| {
            e.trim_start_matches("Verified email at ")
                .trim()
                .to_string()
        });

        stubs.push(AuthorStub {
            url_picture: Some(photo_url(base_url, &scholar_id)),
            scholar_id,
            name: non_empty(element_text(link)),
            affiliation: first_text(card, &aff_selector),
            email_domain,
            cited_by: first_text(card, &cby_selector).and_then(|t| parse_count(&t)),
            interests: card.select(&interest_selector).map(element_text).collect(),
        });
    }

    Ok(stubs)
}

/// Parse one page of an author profile, including its publication rows.
///
/// `url_picture` and `scholar_id` are left for the caller, which knows the id.
pub fn parse_author_page(html: &str) -> Result<AuthorDetail> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let name_selector = selector("#gsc_prf_in")?;
    let aff_selector = selector("div.gsc_prf_il")?;
    let email_selector = selector("#gsc_prf_ivh")?;
    let interest_selector = selector("#gsc_prf_int a")?;
    let index_selector = selector("#gsc_rsb_st td.gsc_rsb_std")?;

    let indices: Vec<Option<u64>> = document
        .select(&index_selector)
        .map(|td| parse_count(&element_text(td)))
        .collect();
    let index_at = |i: usize| indices.get(i).copied().flatten();

    let email_domain = first_text(root, &email_selector).map(|e| {
        let e = e.trim_start_matches("Verified email at ");
        e.split(" - ").next().unwrap_or(e).trim().to_string()
    });

    let cites_per_year = parse_histogram(
        &document,
        "span.gsc_g_t",
        "a.gsc_g_a",
        "span.gsc_g_al",
    )?;

    Ok(AuthorDetail {
        name: first_text(root, &name_selector),
        affiliation: first_text(root, &aff_selector),
        email_domain,
        cited_by: index_at(0),
        citations_5y: index_at(1),
        h_index: index_at(2),
        h_index_5y: index_at(3),
        i10_index: index_at(4),
        i10_index_5y: index_at(5),
        interests: document.select(&interest_selector).map(element_text).collect(),
        cites_per_year,
        publications: parse_publication_rows(&document)?,
        ..Default::default()
    })
}

fn parse_publication_rows(document: &Html) -> Result<Vec<PublicationStub>> {
    let row_selector = selector("tr.gsc_a_tr")?;
    let title_selector = selector("a.gsc_a_at")?;
    let gray_selector = selector("div.gs_gray")?;
    let cites_selector = selector("a.gsc_a_ac")?;
    let year_selector = selector("span.gsc_a_h")?;
    let trailing_year = Regex::new(r",\s*(19|20)\d{2}$").map_err(|e| ScholarError::Parse(e.to_string()))?;

    let mut stubs = Vec::new();

    for row in document.select(&row_selector) {
        let Some(title) = row.select(&title_selector).next() else {
            continue;
        };
        let href = title
            .value()
            .attr("href")
            .or_else(|| title.value().attr("data-href"))
            .unwrap_or("");
        let author_pub_id = link_param("https://scholar.google.com", href, "citation_for_view")
            .unwrap_or_default();

        let mut gray = row.select(&gray_selector).map(element_text);
        let authors = gray.next().and_then(non_empty);
        let citation = gray
            .next()
            .map(|c| trailing_year.replace(&c, "").trim().to_string())
            .and_then(non_empty);

        stubs.push(PublicationStub {
            author_pub_id,
            title: non_empty(element_text(title)),
            authors,
            citation,
            pub_year: first_text(row, &year_selector),
            num_citations: first_text(row, &cites_selector).and_then(|t| parse_count(&t)),
        });
    }

    Ok(stubs)
}

/// Citations-per-year histogram.
///
/// Bars carry their year in the `as_yhi` link parameter; years with zero
/// citations have no bar. Older layouts encode the position from the right in
/// `z-index`; as a last resort bars are matched to labels by position.
fn parse_histogram(
    document: &Html,
    label_css: &str,
    bar_css: &str,
    count_css: &str,
) -> Result<CitesPerYear> {
    let label_selector = selector(label_css)?;
    let bar_selector = selector(bar_css)?;
    let count_selector = selector(count_css)?;
    let z_index = Regex::new(r"z-index:\s*(\d+)").map_err(|e| ScholarError::Parse(e.to_string()))?;

    let years: Vec<String> = document.select(&label_selector).map(element_text).collect();
    let mut histogram = CitesPerYear::new();

    for (position, bar) in document.select(&bar_selector).enumerate() {
        let Some(count) = first_text(bar, &count_selector).and_then(|t| parse_count(&t)) else {
            continue;
        };

        let from_href = bar
            .value()
            .attr("href")
            .and_then(|href| link_param("https://scholar.google.com", href, "as_yhi"));
        let from_z = || {
            let style = bar.value().attr("style")?;
            let z: usize = z_index.captures(style)?.get(1)?.as_str().parse().ok()?;
            years.len().checked_sub(z).and_then(|i| years.get(i)).cloned()
        };
        let year = from_href
            .or_else(from_z)
            .or_else(|| years.get(position).cloned());

        if let Some(year) = year {
            histogram.insert(year, count);
        }
    }

    Ok(histogram)
}

/// Parse a "view citation" page.
pub fn parse_publication_page(html: &str) -> Result<FilledPublication> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title_selector = selector("#gsc_oci_title")?;
    let title_link_selector = selector("a.gsc_oci_title_link")?;
    let row_selector = selector("#gsc_oci_table div.gs_scl")?;
    let field_selector = selector("div.gsc_oci_field")?;
    let value_selector = selector("div.gsc_oci_value")?;
    let eprint_selector = selector("#gsc_oci_title_gg a")?;
    let year_regex = Regex::new(r"\b(1[5-9]|20)\d{2}\b").map_err(|e| ScholarError::Parse(e.to_string()))?;

    let mut bib = Bibliography {
        title: first_text(root, &title_selector),
        ..Default::default()
    };
    let pub_url = document
        .select(&title_link_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);
    bib.eprint = document
        .select(&eprint_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    let mut conference = None;
    let mut book = None;
    let mut source = None;
    let mut num_citations = None;

    for row in document.select(&row_selector) {
        let Some(field) = first_text(row, &field_selector) else {
            continue;
        };
        let Some(value_el) = row.select(&value_selector).next() else {
            continue;
        };
        let value = element_text(value_el);

        match field.to_lowercase().as_str() {
            "authors" | "inventors" => bib.author = Some(split_authors(&value)),
            "publication date" => {
                let year = year_regex.find(&value).map(|m| m.as_str().to_string());
                bib.pub_year = year.or_else(|| non_empty(value));
            }
            "journal" => bib.journal = non_empty(value),
            "conference" => conference = non_empty(value),
            "book" => book = non_empty(value),
            "source" => source = non_empty(value),
            "volume" => bib.volume = non_empty(value),
            "issue" => bib.number = non_empty(value),
            "pages" => bib.pages = non_empty(value),
            "publisher" => bib.publisher = non_empty(value),
            "description" => bib.abstract_text = non_empty(value),
            "total citations" => num_citations = parse_count(&value),
            other => debug!(field = other, "Ignoring citation field"),
        }
    }

    bib.venue = conference.or(book).or(source);
    bib.doi = pub_url.as_deref().and_then(extract_doi);

    Ok(FilledPublication {
        bib,
        num_citations,
        pub_url,
        cites_per_year: parse_histogram(
            &document,
            "span.gsc_oci_g_t",
            "a.gsc_oci_g_a",
            "span.gsc_oci_g_al",
        )?,
        gsrank: None,
    })
}

/// DOI embedded in a publisher or doi.org link
pub fn extract_doi(url: &str) -> Option<String> {
    let re = Regex::new(r"(?i)(?:doi\.org/|/doi/(?:abs/|full/|pdf/|epdf/)?)(10\.\d{4,9}/[^\s?#&]+)").ok()?;
    re.captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('/').to_string())
}

/// Comma-separated author line, e.g. "Y LeCun, Y Bengio, G Hinton"
fn split_authors(line: &str) -> Authors {
    Authors::List(
        line.split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Fill gaps in a parsed publication page from the profile-table row.
fn merge_stub(mut filled: FilledPublication, stub: &PublicationStub) -> FilledPublication {
    let bib = &mut filled.bib;
    if bib.title.is_none() {
        bib.title = stub.title.clone();
    }
    if bib.pub_year.is_none() {
        bib.pub_year = stub.pub_year.clone();
    }
    if bib.author.is_none() {
        bib.author = stub.authors.as_deref().map(split_authors);
    }
    if bib.venue.is_none() {
        bib.venue = stub.citation.clone();
    }
    if filled.num_citations.is_none() {
        filled.num_citations = stub.num_citations;
    }
    filled
}
