// src/sink/memory.rs
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::{Signal, SignalSink};

/// Collects emitted signals in memory. Used by tests and embedders that
/// want to drain signals themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    inner: Mutex<Vec<Signal>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Signal> {
        self.inner.lock().expect("memory sink mutex poisoned").clone()
    }

    pub fn drain(&self) -> Vec<Signal> {
        std::mem::take(&mut *self.inner.lock().expect("memory sink mutex poisoned"))
    }
}

#[async_trait]
impl SignalSink for MemorySink {
    async fn emit(&self, batch: &[Signal]) -> Result<()> {
        self.inner
            .lock()
            .expect("memory sink mutex poisoned")
            .extend_from_slice(batch);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
