//! Runtime configuration resolved from the environment.

use std::time::Duration;

pub const ENV_API_URL: &str = "SUPERVIBE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "SUPERVIBE_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default timeout for API requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server origin without the `/api/v1` prefix.
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    /// An explicit `api_url` (from the command line) wins over the env var.
    pub fn from_env(api_url: Option<&str>) -> Self {
        let raw_url = api_url
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_API_URL).ok())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            api_url: normalize_api_url(&raw_url),
            timeout,
        }
    }
}

/// Normalise the API server URL:
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
/// - strip a trailing `/api` or `/api/v1` segment
pub fn normalize_api_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }
    for suffix in ["/api/v1", "/api"] {
        if url.ends_with(suffix) {
            url.truncate(url.len() - suffix.len());
            break;
        }
    }
    while url.ends_with('/') {
        url.pop();
    }

    url
}
