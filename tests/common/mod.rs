// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use graph_feed_poller::config::{CredentialsCfg, PollerConfig};
use graph_feed_poller::poll::classify::default_permanent_table;
use graph_feed_poller::poll::request::{FeedKind, RequestDescriptor};
use graph_feed_poller::poll::PollEngine;
use graph_feed_poller::sink::memory::MemorySink;
use graph_feed_poller::transport::{RawResponse, Transport};

/// Replays a scripted sequence of responses and records every requested URL.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<RawResponse>>>,
    seen: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new(script: Vec<Result<RawResponse>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn enqueue(&self, response: Result<RawResponse>) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        self.seen.lock().unwrap().push(request.url().to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock transport script exhausted")
    }
}

/// Wire-format timestamp for a UNIX epoch second.
pub fn wire_ts(epoch: i64) -> String {
    chrono::DateTime::from_timestamp(epoch, 0)
        .unwrap()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

pub fn page_body(stamps: &[i64], paging: bool) -> Vec<u8> {
    let data: Vec<_> = stamps
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            json!({
                "id": format!("post-{i}"),
                "message": format!("message at {t}"),
                "created_time": wire_ts(t),
            })
        })
        .collect();
    let body = if paging {
        json!({ "data": data, "paging": { "next": "opaque" } })
    } else {
        json!({ "data": data })
    };
    serde_json::to_vec(&body).unwrap()
}

pub fn ok_page(stamps: &[i64], paging: bool) -> Result<RawResponse> {
    Ok(RawResponse {
        status: 200,
        body: page_body(stamps, paging),
    })
}

pub fn remote_error(status: u16, code: i64) -> Result<RawResponse> {
    Ok(RawResponse {
        status,
        body: format!(
            r#"{{"error": {{"message": "remote says no", "code": {code}, "type": "OAuthException"}}}}"#
        )
        .into_bytes(),
    })
}

pub fn test_config(queries: &[&str], limit: usize) -> PollerConfig {
    PollerConfig {
        queries: queries.iter().map(|q| q.to_string()).collect(),
        feed: FeedKind::Search,
        limit,
        lookback_secs: 0,
        polling_interval_secs: 60,
        retry_interval_secs: 1,
        retry_burst: 3,
        base_url: "https://graph.test/v2.2".into(),
        created_field: "created_time".into(),
        credentials: CredentialsCfg::default(),
        permanent_errors: default_permanent_table(),
        webhook_url: None,
        metrics_addr: "127.0.0.1:0".into(),
    }
}

pub type TestEngine = PollEngine<Arc<MockTransport>, Arc<MemorySink>>;

pub fn engine_with_seed(
    cfg: &PollerConfig,
    transport: Arc<MockTransport>,
    sink: Arc<MemorySink>,
    seed: i64,
) -> TestEngine {
    let mut engine = PollEngine::with_watermark_seed(cfg, transport, sink, seed);
    engine.set_credential("test-token");
    engine
}
