//! # scholar-profile
//!
//! Google Scholar author profiles, reshaped into a normalized JSON document with
//! every publication classified by type.
//!
//! ## Modules
//!
//! - [`provider`] - Provider seam and raw Scholar records
//! - [`gscholar`] - Google Scholar scraping provider
//! - [`classify`] - Keyword-based publication type classification
//! - [`profile`] - Output records and shaping
//! - [`fetcher`] - Paced author/publication fetch pipeline
//! - [`server`] - HTTP API
//! - [`report`] - Plain-text profile report
//! - [`cookies`] - Cookie persistence
//! - [`config`] - Runtime configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholar_profile::config;
//! use scholar_profile::fetcher::{ProfileFetcher, PublicationLimit};
//! use scholar_profile::gscholar::ScholarScraper;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scraper = ScholarScraper::new(&config::ScraperConfig::default())?;
//!     let fetcher = ProfileFetcher::new(Arc::new(scraper), Default::default());
//!     let profile = fetcher.fetch_profile("Geoffrey Hinton", PublicationLimit::First(5)).await?;
//!     println!("{} publications", profile.publications.len());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod cookies;
pub mod error;
pub mod fetcher;
pub mod gscholar;
pub mod profile;
pub mod provider;
pub mod report;
pub mod server;

pub use error::{FetchError, Result, ScholarError};
