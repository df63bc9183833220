// src/sink/webhook.rs
use anyhow::{Context, Result};
use reqwest::Client;

use super::{Signal, SignalSink};

/// POSTs each batch as a JSON array to a configured webhook.
pub struct WebhookSink {
    webhook_url: Option<String>,
    client: Client,
}

impl WebhookSink {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("POLLER_WEBHOOK_URL").ok(),
            client: Client::new(),
        }
    }

    pub fn new(url: String) -> Self {
        Self {
            webhook_url: Some(url),
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl SignalSink for WebhookSink {
    async fn emit(&self, batch: &[Signal]) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("webhook disabled (no POLLER_WEBHOOK_URL)");
            return Ok(());
        };

        self.client
            .post(url)
            .json(&batch)
            .send()
            .await
            .context("webhook post")?
            .error_for_status()
            .context("webhook non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
