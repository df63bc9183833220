// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::AppCredentials;
use crate::poll::classify::{default_permanent_table, PermanentError};
use crate::poll::request::FeedKind;

const ENV_PATH: &str = "POLLER_CONFIG_PATH";
const ENV_APP_ID: &str = "GRAPH_APP_ID";
const ENV_APP_SECRET: &str = "GRAPH_APP_SECRET";

#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    /// Ordered list of independently tracked feed targets.
    pub queries: Vec<String>,
    #[serde(default = "default_feed")]
    pub feed: FeedKind,
    /// Maximum items per response page.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Initial window of desirable items, for the very first request.
    #[serde(default)]
    pub lookback_secs: u64,
    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,
    #[serde(default = "default_retry_burst")]
    pub retry_burst: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Remote field holding an item's creation timestamp.
    #[serde(default = "default_created_field")]
    pub created_field: String,
    #[serde(default)]
    pub credentials: CredentialsCfg,
    #[serde(default = "default_permanent_table")]
    pub permanent_errors: Vec<PermanentError>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsCfg {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
}

impl CredentialsCfg {
    /// Environment takes precedence over file values.
    pub fn resolved(&self) -> Option<AppCredentials> {
        let app_id = std::env::var(ENV_APP_ID).ok().or_else(|| self.app_id.clone())?;
        let app_secret = std::env::var(ENV_APP_SECRET)
            .ok()
            .or_else(|| self.app_secret.clone())?;
        Some(AppCredentials { app_id, app_secret })
    }
}

fn default_feed() -> FeedKind {
    FeedKind::Search
}
fn default_limit() -> usize {
    10
}
fn default_polling_interval() -> u64 {
    60
}
fn default_retry_interval() -> u64 {
    10
}
fn default_retry_burst() -> u32 {
    3
}
fn default_base_url() -> String {
    "https://graph.facebook.com/v2.2".to_string()
}
fn default_created_field() -> String {
    "created_time".to_string()
}
fn default_metrics_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl PollerConfig {
    /// Load from an explicit TOML path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading poller config from {}", path.display()))?;
        let cfg: PollerConfig = toml::from_str(&content)
            .with_context(|| format!("parsing poller config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load using env var + fallback:
    /// 1) $POLLER_CONFIG_PATH
    /// 2) config/poller.toml
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("POLLER_CONFIG_PATH points to non-existent path"));
        }
        Self::load_from(&PathBuf::from("config/poller.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.queries.is_empty() {
            return Err(anyhow!("queries must not be empty"));
        }
        if self.queries.iter().any(|q| q.trim().is_empty()) {
            return Err(anyhow!("queries must not contain blank entries"));
        }
        if self.limit == 0 {
            return Err(anyhow!("limit must be positive"));
        }
        if self.polling_interval_secs == 0 {
            return Err(anyhow!("polling_interval_secs must be positive"));
        }
        if self.retry_interval_secs == 0 {
            return Err(anyhow!("retry_interval_secs must be positive"));
        }
        if self.base_url.trim().is_empty() {
            return Err(anyhow!("base_url must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn minimal() -> PollerConfig {
        toml::from_str(r#"queries = ["rust"]"#).unwrap()
    }

    #[test]
    fn defaults_fill_in() {
        let cfg = minimal();
        cfg.validate().unwrap();
        assert_eq!(cfg.limit, 10);
        assert_eq!(cfg.feed, FeedKind::Search);
        assert_eq!(cfg.lookback_secs, 0);
        assert_eq!(cfg.polling_interval_secs, 60);
        assert_eq!(cfg.retry_interval_secs, 10);
        assert_eq!(cfg.created_field, "created_time");
        assert_eq!(cfg.permanent_errors, default_permanent_table());
        assert!(cfg.webhook_url.is_none());
    }

    #[test]
    fn full_file_parses() {
        let cfg: PollerConfig = toml::from_str(
            r#"
            queries = ["acme", "globex"]
            feed = "posts"
            limit = 25
            lookback_secs = 3600
            polling_interval_secs = 30
            retry_interval_secs = 5
            retry_burst = 2
            base_url = "https://graph.example/v2.2"
            created_field = "created_at"
            webhook_url = "https://hooks.example/poller"

            [credentials]
            app_id = "id"
            app_secret = "secret"

            [[permanent_errors]]
            status = 404
            code = 803
            "#,
        )
        .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.feed, FeedKind::Posts);
        assert_eq!(cfg.queries.len(), 2);
        assert_eq!(
            cfg.permanent_errors,
            vec![PermanentError {
                status: 404,
                code: 803
            }]
        );
        assert_eq!(cfg.credentials.app_id.as_deref(), Some("id"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = minimal();
        cfg.queries.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = minimal();
        cfg.queries = vec!["  ".into()];
        assert!(cfg.validate().is_err());

        let mut cfg = minimal();
        cfg.limit = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = minimal();
        cfg.polling_interval_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_credentials_take_precedence() {
        env::set_var(ENV_APP_ID, "env-id");
        env::set_var(ENV_APP_SECRET, "env-secret");
        let creds = CredentialsCfg {
            app_id: Some("file-id".into()),
            app_secret: Some("file-secret".into()),
        };
        let resolved = creds.resolved().unwrap();
        assert_eq!(resolved.app_id, "env-id");
        assert_eq!(resolved.app_secret, "env-secret");
        env::remove_var(ENV_APP_ID);
        env::remove_var(ENV_APP_SECRET);

        assert_eq!(creds.resolved().unwrap().app_id, "file-id");
        assert!(CredentialsCfg::default().resolved().is_none());
    }

    #[serial_test::serial]
    #[test]
    fn load_default_honors_env_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("poller.toml");
        std::fs::write(&path, r#"queries = ["from-env"]"#).unwrap();

        env::set_var(ENV_PATH, path.display().to_string());
        let cfg = PollerConfig::load_default().unwrap();
        assert_eq!(cfg.queries, vec!["from-env".to_string()]);

        env::set_var(ENV_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(PollerConfig::load_default().is_err());
        env::remove_var(ENV_PATH);
    }
}
