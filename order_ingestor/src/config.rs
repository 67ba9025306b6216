//! Fetch-side configuration.
//!
//! Deserialized from the `[api]` table of the application TOML. All knobs
//! have defaults matching the upstream contract; `validate` runs before
//! any network I/O and reports the offending key by name.

use serde::Deserialize;

use crate::errors::Error;

fn default_timeout_secs() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_timeout_step_secs() -> u64 {
    5
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    10
}

/// Connection and pagination settings for the remote order API.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the store, e.g. `https://shop.example.com`.
    pub url: String,

    /// Base per-attempt timeout in seconds; each retry adds
    /// `timeout_step_secs` on top.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempt ceiling for transient failures.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Timeout escalation step in seconds, applied per retry.
    #[serde(default = "default_timeout_step_secs")]
    pub timeout_step_secs: u64,

    /// Records per page (upstream caps this at 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Fixed page-count ceiling. Pages beyond it are never requested;
    /// this is a documented truncation bound, not an adaptive stop.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl ApiConfig {
    /// Rejects configurations the fetch layer cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("api.url must not be empty".into()));
        }
        if self.retry_attempts == 0 {
            return Err(Error::Config("api.retry_attempts must be at least 1".into()));
        }
        if self.per_page == 0 || self.per_page > 100 {
            return Err(Error::Config(format!(
                "api.per_page must be within 1..=100, got {}",
                self.per_page
            )));
        }
        if self.max_pages == 0 {
            return Err(Error::Config("api.max_pages must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ApiConfig {
        toml::from_str(r#"url = "https://shop.example.com""#).unwrap()
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = minimal();
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(cfg.retry_attempts, 3);
        assert_eq!(cfg.timeout_step_secs, 5);
        assert_eq!(cfg.per_page, 100);
        assert_eq!(cfg.max_pages, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_empty_url() {
        let mut cfg = minimal();
        cfg.url = "  ".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("api.url"));
    }

    #[test]
    fn rejects_oversized_page() {
        let mut cfg = minimal();
        cfg.per_page = 250;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("api.per_page"));
    }
}
