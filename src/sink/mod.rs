// src/sink/mod.rs
pub mod log;
pub mod memory;
pub mod webhook;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One fresh feed item, forwarded with all its opaque fields plus the query
/// it was polled for. Batches preserve the page's newest-first order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Signal {
    pub query: String,
    pub fields: Map<String, Value>,
}

#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn emit(&self, batch: &[Signal]) -> Result<()>;
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<S: SignalSink + ?Sized> SignalSink for std::sync::Arc<S> {
    async fn emit(&self, batch: &[Signal]) -> Result<()> {
        (**self).emit(batch).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Fans one batch out to every configured sink. A failing sink is logged
/// and skipped; the others still receive the batch.
pub struct SinkMux {
    sinks: Vec<Box<dyn SignalSink>>,
}

impl SinkMux {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(mut self, sink: Box<dyn SignalSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Log sink always; webhook sink when a URL is configured.
    pub fn from_config(webhook_url: Option<&str>) -> Self {
        let mut mux = Self::new().push(Box::new(log::LogSink));
        if let Some(url) = webhook_url {
            mux = mux.push(Box::new(webhook::WebhookSink::new(url.to_string())));
        }
        mux
    }
}

impl Default for SinkMux {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalSink for SinkMux {
    async fn emit(&self, batch: &[Signal]) -> Result<()> {
        for sink in &self.sinks {
            if let Err(err) = sink.emit(batch).await {
                tracing::warn!(sink = sink.name(), error = ?err, "sink emit failed");
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mux"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::memory::MemorySink;
    use std::sync::Arc;

    struct FailingSink;

    #[async_trait]
    impl SignalSink for FailingSink {
        async fn emit(&self, _batch: &[Signal]) -> Result<()> {
            anyhow::bail!("down")
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn signal(query: &str) -> Signal {
        Signal {
            query: query.into(),
            fields: Map::new(),
        }
    }

    #[tokio::test]
    async fn a_failing_sink_does_not_starve_the_others() {
        let memory = Arc::new(MemorySink::new());
        let mux = SinkMux::new()
            .push(Box::new(FailingSink))
            .push(Box::new(Arc::clone(&memory)));

        mux.emit(&[signal("q")]).await.unwrap();
        assert_eq!(memory.snapshot().len(), 1);
    }
}
