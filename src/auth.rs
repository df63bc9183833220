// src/auth.rs

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;

/// Provides the bearer credential appended to every feed request. Invoked
/// once during setup, not per request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn obtain_credential(&self) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: String,
}

/// Exchanges app id + secret for an app access token via the remote OAuth
/// client-credentials endpoint.
pub struct AppTokenAuthenticator {
    base_url: String,
    creds: AppCredentials,
    client: reqwest::Client,
}

impl AppTokenAuthenticator {
    pub fn new(base_url: impl Into<String>, creds: AppCredentials) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            creds,
            client: reqwest::Client::new(),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/oauth/access_token?client_id={}&client_secret={}&grant_type=client_credentials",
            self.base_url, self.creds.app_id, self.creds.app_secret
        )
    }
}

/// The endpoint answers with JSON (`{"access_token": …}`) on current API
/// versions and `access_token=…` form encoding on older ones.
pub fn parse_token_response(body: &str) -> Result<String> {
    #[derive(serde::Deserialize)]
    struct TokenBody {
        access_token: String,
    }
    if let Ok(parsed) = serde_json::from_str::<TokenBody>(body) {
        return Ok(parsed.access_token);
    }

    body.split("access_token=")
        .nth(1)
        .map(|tail| tail.split('&').next().unwrap_or(tail).to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| anyhow!("token response carried no access_token"))
}

#[async_trait]
impl Authenticator for AppTokenAuthenticator {
    async fn obtain_credential(&self) -> Result<String> {
        let response = self
            .client
            .get(self.token_url())
            .send()
            .await
            .context("token request")?;
        let status = response.status();
        let body = response.text().await.context("token response body")?;
        if !status.is_success() {
            bail!("token request failed with status {status}");
        }
        parse_token_response(&body)
    }
}
