// src/wire.rs
// Remote wire contract: feed pages, error envelopes, creation timestamps.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Fixed textual creation-timestamp format used by the remote feed.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
struct FeedBody {
    data: Vec<Map<String, Value>>,
    paging: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: RemoteError,
}

/// Structured error object the remote returns alongside a failure status.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// One record from a feed page: parsed creation time plus the opaque fields
/// forwarded verbatim to signal sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct PageItem {
    pub created: i64,
    pub fields: Map<String, Value>,
}

/// One decoded feed page, newest-first per the remote API contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<PageItem>,
    /// Whether the response carried a paging indicator.
    pub has_more: bool,
}

impl Page {
    pub fn newest(&self) -> Option<i64> {
        self.items.first().map(|it| it.created)
    }

    pub fn stalest(&self) -> Option<i64> {
        self.items.last().map(|it| it.created)
    }
}

/// Parse a creation timestamp to UNIX seconds (UTC).
///
/// The live API appends a numeric UTC offset (`+0000`); tolerate it.
pub fn parse_timestamp(raw: &str) -> Result<i64> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Ok(dt.and_utc().timestamp());
    }
    chrono::DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .map(|dt| dt.timestamp())
        .with_context(|| format!("unparseable creation timestamp {raw:?}"))
}

/// Decode a successful feed response body.
///
/// Every item timestamp must parse before the caller touches any watermark
/// state; one bad record fails the whole page.
pub fn parse_page(body: &[u8], created_field: &str) -> Result<Page> {
    let parsed: FeedBody = serde_json::from_slice(body).context("decoding feed response body")?;
    let has_more = parsed.paging.is_some();

    let mut items = Vec::with_capacity(parsed.data.len());
    for fields in parsed.data {
        let raw_ts = fields
            .get(created_field)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("feed item is missing {created_field:?}"))?;
        let created = parse_timestamp(raw_ts)?;
        items.push(PageItem { created, fields });
    }

    Ok(Page { items, has_more })
}

/// Decode the error envelope of a failed response, if there is one.
pub fn parse_remote_error(body: &[u8]) -> Option<RemoteError> {
    serde_json::from_slice::<ErrorBody>(body).ok().map(|b| b.error)
}
