//! Cookie persistence for Google Scholar requests.
//!
//! Scholar is far less likely to serve a CAPTCHA to a session that carries the
//! cookies of a real browser visit. Cookies are exported from a browser once and
//! stored as a JSON array.

use crate::error::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const COOKIE_FILE_NAME: &str = ".scholar_profile_cookies.json";

/// Default cookie file path: `~/.scholar_profile_cookies.json`
pub fn default_cookie_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(COOKIE_FILE_NAME))
        .ok_or_else(|| ScholarError::Config("Cannot determine home directory".to_string()))
}

/// Cookie entry in the browser-export format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, alias = "httpOnly")]
    pub http_only: bool,
    #[serde(default, alias = "expirationDate")]
    pub expires: Option<f64>,
}

/// Scholar session cookies backed by a JSON file.
#[derive(Debug, Clone)]
pub struct CookieJar {
    path: PathBuf,
}

impl CookieJar {
    /// Jar at the default location, or the working directory if there is no home.
    pub fn open_default() -> Self {
        let path = default_cookie_path().unwrap_or_else(|_| PathBuf::from(COOKIE_FILE_NAME));
        Self { path }
    }

    /// Jar at a custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load cookies; a missing or unreadable file yields an empty list.
    pub fn load(&self) -> Vec<Cookie> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Cookie file not found");
            return Vec::new();
        }

        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Vec<Cookie>>(&content) {
                Ok(cookies) => {
                    info!(count = cookies.len(), path = %self.path.display(), "Loaded cookies");
                    cookies
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse cookies");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to read cookie file");
                Vec::new()
            }
        }
    }

    /// `Cookie` header value for Google domains; empty when there are none.
    pub fn header(&self) -> String {
        cookie_header(&self.load())
    }

    /// Save cookies to file
    pub fn save(&self, cookies: &[Cookie]) -> Result<()> {
        let content = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, content)?;
        info!(count = cookies.len(), path = %self.path.display(), "Saved cookies");
        Ok(())
    }

    /// Replace stored cookies with the contents of a browser export.
    ///
    /// Returns the number of cookies imported.
    pub fn import(&self, source: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(source)?;
        let cookies: Vec<Cookie> = serde_json::from_str(&content)?;
        if cookies.is_empty() {
            return Err(ScholarError::Config(format!(
                "No cookies found in {}",
                source.display()
            )));
        }
        self.save(&cookies)?;
        Ok(cookies.len())
    }

    /// Clear stored cookies
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!(path = %self.path.display(), "Cleared cookies");
        }
        Ok(())
    }
}

/// Build a `Cookie` header from the Google-domain entries.
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .filter(|c| c.domain.contains("google"))
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}
