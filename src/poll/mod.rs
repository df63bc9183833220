//! # Incremental Polling Engine
//! Polls paginated, timestamp-ordered remote feeds and emits exactly the
//! items that are new since the last successful observation.
//!
//! One `tick` runs at most one poll cycle for the query under the cursor:
//! request, freshness filtering, watermark advancement, and pagination
//! continuation until the fresh window is covered. Failures are classified
//! as transient (park the request, report `Retry`) or permanent (skip the
//! query, advance the cursor).

pub mod classify;
pub mod cursor;
pub mod freshness;
pub mod pagination;
pub mod request;
pub mod scheduler;
pub mod watermark;

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use once_cell::sync::OnceCell;

use crate::auth::Authenticator;
use crate::config::PollerConfig;
use crate::poll::classify::{ErrorClassifier, FailureClass};
use crate::poll::cursor::QueryCursor;
use crate::poll::request::{RequestBuilder, RequestDescriptor};
use crate::poll::watermark::{Watermark, WatermarkStore};
use crate::sink::{Signal, SignalSink};
use crate::transport::{RawResponse, Transport};
use crate::wire;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("poll_cycles_total", "Completed poll cycles.");
        describe_counter!("poll_pages_total", "Feed pages processed.");
        describe_counter!("poll_signals_total", "Fresh items emitted as signals.");
        describe_counter!(
            "poll_transient_retries_total",
            "Failures deferred to the retry interval."
        );
        describe_counter!(
            "poll_permanent_skips_total",
            "Queries skipped on permanent remote errors."
        );
        describe_gauge!("poll_last_cycle_ts", "Unix ts when a poll cycle last completed.");
        describe_histogram!("poll_page_items", "Items per fetched page.");
    });
}

/// What one `tick` accomplished, for the surrounding scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The cycle ran to completion; the cursor moved to the next query.
    Completed { fresh: usize, pages: usize },
    /// Transient failure; call `tick` again after the retry interval to
    /// re-execute the identical request.
    Retry,
    /// Permanent failure; the query was skipped and the cursor advanced.
    Skipped,
}

/// The polling engine. Owns all watermark state; collaborators (transport,
/// sink, authenticator) are injected at the seams.
pub struct PollEngine<T, S> {
    transport: T,
    sink: S,
    builder: RequestBuilder,
    classifier: ErrorClassifier,
    cursor: QueryCursor,
    watermarks: WatermarkStore,
    created_field: String,
    limit: usize,
    credential: Option<String>,
    /// Request parked by a transient failure, re-executed on the next tick.
    pending: Option<RequestDescriptor>,
}

impl<T, S> PollEngine<T, S>
where
    T: Transport,
    S: SignalSink,
{
    /// Watermarks seed to `now - lookback`.
    pub fn new(cfg: &PollerConfig, transport: T, sink: S) -> Self {
        let seed = chrono::Utc::now().timestamp() - cfg.lookback_secs as i64;
        Self::with_watermark_seed(cfg, transport, sink, seed)
    }

    pub fn with_watermark_seed(cfg: &PollerConfig, transport: T, sink: S, seed: i64) -> Self {
        ensure_metrics_described();
        Self {
            transport,
            sink,
            builder: RequestBuilder::new(cfg.base_url.clone(), cfg.feed, cfg.limit),
            classifier: ErrorClassifier::new(cfg.permanent_errors.clone()),
            cursor: QueryCursor::new(cfg.queries.clone()),
            watermarks: WatermarkStore::new(seed),
            created_field: cfg.created_field.clone(),
            limit: cfg.limit,
            credential: None,
            pending: None,
        }
    }

    /// Obtain and record the bearer credential for pending requests.
    ///
    /// On failure the credential stays unset and every subsequent tick fails
    /// fast instead of sending unauthenticated requests.
    pub async fn authenticate(&mut self, auth: &dyn Authenticator) {
        match auth.obtain_credential().await {
            Ok(token) => {
                tracing::info!("credential obtained");
                self.credential = Some(token);
            }
            Err(err) => {
                tracing::error!(error = ?err, "credential acquisition failed");
            }
        }
    }

    pub fn set_credential(&mut self, token: impl Into<String>) {
        self.credential = Some(token.into());
    }

    pub fn current_query(&self) -> &str {
        self.cursor.current()
    }

    pub fn watermark(&mut self, query: &str) -> Watermark {
        self.watermarks.get(query)
    }

    /// Run one poll cycle (or resume a parked request) for the query under
    /// the cursor.
    pub async fn tick(&mut self) -> TickOutcome {
        let query = self.cursor.current().to_string();

        let Some(credential) = self.credential.clone() else {
            tracing::error!(
                query = %query,
                "no credential; refusing to send unauthenticated request"
            );
            counter!("poll_transient_retries_total").increment(1);
            return TickOutcome::Retry;
        };

        let mut request = match self.pending.take() {
            Some(parked) => parked,
            None => {
                self.watermarks.begin_cycle(&query);
                let mark = self.watermarks.get(&query);
                self.builder.initial(&query, mark.freshest, &credential)
            }
        };

        // Upper bound the current request carries, if it is a continuation;
        // on a resumed request this is the prev_stalest recorded before the
        // transient failure.
        let mut prev_until = request
            .is_continuation()
            .then(|| self.watermarks.get(&query).prev_stalest);

        let mut fresh_total = 0usize;
        let mut pages = 0usize;

        loop {
            let response = match self.transport.execute(&request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(query = %query, error = ?err, "transport failure; will retry");
                    counter!("poll_transient_retries_total").increment(1);
                    self.pending = Some(request);
                    return TickOutcome::Retry;
                }
            };

            if response.status != 200 {
                return self.on_failure(&query, request, response);
            }

            let page = match wire::parse_page(&response.body, &self.created_field) {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(query = %query, error = ?err, "malformed feed response; will retry");
                    counter!("poll_transient_retries_total").increment(1);
                    self.pending = Some(request);
                    return TickOutcome::Retry;
                }
            };

            pages += 1;
            counter!("poll_pages_total").increment(1);
            histogram!("poll_page_items").record(page.items.len() as f64);

            let prev_freshest = self.watermarks.get(&query).prev_freshest;
            let fresh = freshness::split_fresh(&page, &mut self.watermarks, &query);
            tracing::debug!(
                query = %query,
                total = page.items.len(),
                fresh = fresh.len(),
                "processed feed page"
            );

            if !fresh.is_empty() {
                let signals: Vec<Signal> = fresh
                    .iter()
                    .map(|item| Signal {
                        query: query.clone(),
                        fields: item.fields.clone(),
                    })
                    .collect();
                // Sink trouble never fails the cycle.
                if let Err(err) = self.sink.emit(&signals).await {
                    tracing::warn!(query = %query, error = ?err, "signal sink failure");
                }
                counter!("poll_signals_total").increment(signals.len() as u64);
                fresh_total += signals.len();
            }

            if pagination::should_continue(&page, self.limit, prev_freshest, prev_until) {
                if let Some(stalest) = page.stalest() {
                    self.watermarks.set_prev_stalest(&query, stalest);
                    request = self.builder.continuation(&request, stalest);
                    prev_until = Some(stalest);
                    continue;
                }
            }
            break;
        }

        self.cursor.advance();
        counter!("poll_cycles_total").increment(1);
        gauge!("poll_last_cycle_ts").set(chrono::Utc::now().timestamp() as f64);
        TickOutcome::Completed {
            fresh: fresh_total,
            pages,
        }
    }

    fn on_failure(
        &mut self,
        query: &str,
        request: RequestDescriptor,
        response: RawResponse,
    ) -> TickOutcome {
        let (class, remote) = self.classifier.classify(response.status, &response.body);
        let code = remote.as_ref().map(|e| e.code);
        let message = remote.map(|e| e.message).unwrap_or_default();
        match class {
            FailureClass::Permanent => {
                tracing::warn!(
                    query = %query,
                    status = response.status,
                    code,
                    %message,
                    "permanent remote error; skipping query"
                );
                counter!("poll_permanent_skips_total").increment(1);
                self.cursor.advance();
                TickOutcome::Skipped
            }
            FailureClass::Transient => {
                tracing::warn!(
                    query = %query,
                    status = response.status,
                    code,
                    %message,
                    "remote failure; will retry"
                );
                counter!("poll_transient_retries_total").increment(1);
                self.pending = Some(request);
                TickOutcome::Retry
            }
        }
    }
}
