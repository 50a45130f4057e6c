//! Runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default Google Scholar URL
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// Pause between per-publication provider calls.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Origins allowed by default: local dev servers plus the hosted frontends.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
    "https://*.herokuapp.com",
    "https://*.vercel.app",
];

/// Scraper settings.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Scholar base URL, or a mirror
    pub base_url: String,
    /// Proxy URL (e.g., "http://127.0.0.1:7890")
    pub proxy: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Upper bound of the random delay before each page fetch; zero disables it
    pub jitter: Duration,
    /// Cookie file; `None` uses the default location
    pub cookie_file: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SCHOLAR_URL.to_string(),
            proxy: None,
            timeout: Duration::from_secs(30),
            jitter: Duration::ZERO,
            cookie_file: None,
        }
    }
}

/// Profile fetcher settings.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Minimum spacing between successive publication fills
    pub pacing: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Exact origins or `scheme://*.suffix` wildcards
    pub cors_origins: Vec<String>,
    /// Budget for the publication loop of one request
    pub request_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            request_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraper_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.base_url, DEFAULT_SCHOLAR_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.jitter.is_zero());
        assert!(config.cookie_file.is_none());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins.len(), DEFAULT_CORS_ORIGINS.len());
        assert!(config.request_timeout.is_none());
        assert_eq!(FetcherConfig::default().pacing, DEFAULT_PACING);
    }
}
