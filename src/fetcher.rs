//! Profile fetch pipeline.
//!
//! Author lookup is all-or-nothing. Publications are filled one at a time, in
//! profile order, with a fixed pause between provider calls; a publication that
//! fails to fill is logged and skipped.

use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use crate::profile::{AuthorProfile, PublicationRecord};
use crate::provider::{AuthorDetail, PublicationStub, ScholarProvider};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How many publications a fetch may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicationLimit {
    #[default]
    All,
    /// Attempt at most this many, in profile order; `First(0)` attempts none
    First(usize),
}

impl PublicationLimit {
    /// Interpret a requested cap: missing or zero means all, negative means none.
    pub fn from_requested(requested: Option<i64>) -> Self {
        match requested {
            None | Some(0) => Self::All,
            Some(n) => Self::First(usize::try_from(n).unwrap_or(0)),
        }
    }

    fn reached(self, attempted: usize) -> bool {
        match self {
            Self::All => false,
            Self::First(n) => attempted >= n,
        }
    }
}

impl From<Option<usize>> for PublicationLimit {
    fn from(max: Option<usize>) -> Self {
        match max {
            None | Some(0) => Self::All,
            Some(n) => Self::First(n),
        }
    }
}

/// Fetches and shapes author profiles through a [`ScholarProvider`].
#[derive(Clone)]
pub struct ProfileFetcher {
    provider: Arc<dyn ScholarProvider>,
    config: FetcherConfig,
}

impl ProfileFetcher {
    pub fn new(provider: Arc<dyn ScholarProvider>, config: FetcherConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Find the first author matching `name` and fill in their profile.
    pub async fn lookup_author(&self, name: &str) -> std::result::Result<AuthorDetail, FetchError> {
        let candidates = self.provider.search_authors(name).await?;
        debug!(name = %name, candidates = candidates.len(), "Author search complete");

        let stub = candidates
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound {
                name: name.to_string(),
            })?;

        info!(name = %name, scholar_id = %stub.scholar_id, "Filling author profile");
        let detail = self.provider.fill_author(&stub).await?;
        Ok(detail)
    }

    /// Fill, classify and shape one publication.
    pub async fn shape_publication(&self, stub: &PublicationStub) -> Result<PublicationRecord> {
        let filled = self.provider.fill_publication(stub).await?;
        Ok(PublicationRecord::from_filled(filled))
    }

    /// Fetch a full profile, attempting at most `limit` publications.
    pub async fn fetch_profile(
        &self,
        name: &str,
        limit: PublicationLimit,
    ) -> std::result::Result<AuthorProfile, FetchError> {
        let (_keep_open, cancel) = watch::channel(false);
        self.fetch_profile_with_cancel(name, limit, cancel).await
    }

    /// Like [`fetch_profile`](Self::fetch_profile), but stops filling
    /// publications once `cancel` turns `true` and returns what it has.
    ///
    /// Cancellation only affects the publication loop; the author lookup runs to
    /// completion.
    pub async fn fetch_profile_with_cancel(
        &self,
        name: &str,
        limit: PublicationLimit,
        mut cancel: watch::Receiver<bool>,
    ) -> std::result::Result<AuthorProfile, FetchError> {
        let mut detail = self.lookup_author(name).await?;
        let stubs = std::mem::take(&mut detail.publications);

        info!(
            name = %name,
            available = stubs.len(),
            limit = ?limit,
            "Processing publications"
        );

        let mut publications = Vec::new();
        let mut failed = 0usize;

        for (index, stub) in stubs.iter().enumerate() {
            if limit.reached(index) {
                debug!(index, "Publication limit reached");
                break;
            }

            if index > 0 && !self.config.pacing.is_zero() {
                tokio::select! {
                    () = tokio::time::sleep(self.config.pacing) => {}
                    () = cancelled(&mut cancel) => {
                        info!(index, "Cancelled while pacing");
                        break;
                    }
                }
            }

            let stop = *cancel.borrow();
            if stop {
                info!(index, "Cancelled before next publication");
                break;
            }

            let outcome = tokio::select! {
                outcome = self.shape_publication(stub) => outcome,
                () = cancelled(&mut cancel) => {
                    info!(index, "Cancelled during publication fill");
                    break;
                }
            };

            match outcome {
                Ok(record) => publications.push(record),
                Err(e) => {
                    failed += 1;
                    warn!(
                        index,
                        pub_id = %stub.author_pub_id,
                        error = %e,
                        "Error processing publication"
                    );
                }
            }
        }

        info!(
            name = %name,
            shaped = publications.len(),
            failed,
            "Profile complete"
        );

        Ok(AuthorProfile::from_detail(detail, publications))
    }
}

/// Resolves once the flag is `true`. Never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let closed = cancel.wait_for(|c| *c).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
