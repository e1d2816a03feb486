use std::{env, path::PathBuf};

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";
const DEFAULT_UPLOAD_URL: &str = "http://localhost:8080/api/upload";
const DEFAULT_UPLOAD_DIR: &str = "storage/uploads";
const DEFAULT_UPLOAD_MAX_BYTES: usize = 50 * 1024 * 1024;

/// Runtime settings read from the process environment (and `.env`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    /// Upstream host behind the login and rewrite proxies.
    pub backend_url: String,
    /// Destination used by the upload tracker when no override is given.
    pub upload_url: String,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    /// Prefix for URLs returned by the local upload endpoint. Relative when unset.
    pub public_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            public_base_url: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got `{raw}`"))?,
            None => defaults.port,
        };

        let upload_max_bytes = match non_empty("UPLOAD_MAX_BYTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("UPLOAD_MAX_BYTES must be a byte count, got `{raw}`"))?,
            None => defaults.upload_max_bytes,
        };

        Ok(Self {
            port,
            backend_url: non_empty("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),
            upload_url: non_empty("UPLOAD_URL").unwrap_or(defaults.upload_url),
            upload_dir: non_empty("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            upload_max_bytes,
            public_base_url: non_empty("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).expect("config");
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend_url, "http://localhost:4000");
        assert_eq!(config.upload_url, "http://localhost:8080/api/upload");
        assert_eq!(config.upload_dir, PathBuf::from("storage/uploads"));
        assert!(config.public_base_url.is_none());
    }

    #[test]
    fn reads_overrides_and_trims_trailing_slashes() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "3000"),
            ("BACKEND_URL", "https://api.example.com/"),
            ("PUBLIC_BASE_URL", "https://cdn.example.com/"),
            ("UPLOAD_MAX_BYTES", "1024"),
            ("UPLOAD_DIR", "  "),
        ]))
        .expect("config");

        assert_eq!(config.port, 3000);
        assert_eq!(config.backend_url, "https://api.example.com");
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("https://cdn.example.com")
        );
        assert_eq!(config.upload_max_bytes, 1024);
        assert_eq!(config.upload_dir, PathBuf::from("storage/uploads"));
    }

    #[test]
    fn rejects_invalid_port() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")]))
            .expect_err("invalid port should fail");
        assert!(err.to_string().contains("PORT"));
    }
}
