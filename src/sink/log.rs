// src/sink/log.rs
use anyhow::Result;
use async_trait::async_trait;

use super::{Signal, SignalSink};

/// Emits each fresh item as a structured log record.
pub struct LogSink;

#[async_trait]
impl SignalSink for LogSink {
    async fn emit(&self, batch: &[Signal]) -> Result<()> {
        for signal in batch {
            tracing::info!(
                target: "signals",
                query = %signal.query,
                fields = %serde_json::to_string(&signal.fields).unwrap_or_default(),
                "fresh item"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
