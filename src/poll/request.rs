// src/poll/request.rs

use serde::Deserialize;

/// Negative offset applied to `since` to tolerate clock skew at the remote
/// boundary.
pub const SKEW_EPSILON_SECS: i64 = 2;

/// Which feed endpoint a query targets. Selects the URL template; no other
/// behavior differs between kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Keyword search across public posts.
    Search,
    Feed,
    Posts,
    Tagged,
    PromotablePosts,
}

impl FeedKind {
    fn path(&self) -> &'static str {
        match self {
            FeedKind::Search => "search",
            FeedKind::Feed => "feed",
            FeedKind::Posts => "posts",
            FeedKind::Tagged => "tagged",
            FeedKind::PromotablePosts => "promotable_posts",
        }
    }
}

/// Immutable outbound request descriptor.
///
/// Keeps the cycle's initial URL alongside the effective one so that every
/// continuation is derived from the initial request, never stacked onto a
/// previous continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    initial: String,
    url: String,
}

impl RequestDescriptor {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_continuation(&self) -> bool {
        self.url != self.initial
    }
}

/// Builds initial and continuation requests for one engine configuration.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    kind: FeedKind,
    limit: usize,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>, kind: FeedKind, limit: usize) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            kind,
            limit,
        }
    }

    /// First request of a cycle: `since = freshest - epsilon`, the page-size
    /// limit, and the current bearer credential.
    pub fn initial(&self, query: &str, freshest: i64, credential: &str) -> RequestDescriptor {
        let since = freshest - SKEW_EPSILON_SECS;
        let url = match self.kind {
            FeedKind::Search => format!(
                "{}/search?since={}&q={}&type=post&limit={}&access_token={}",
                self.base_url, since, query, self.limit, credential
            ),
            kind => format!(
                "{}/{}/{}?since={}&limit={}&access_token={}",
                self.base_url,
                query,
                kind.path(),
                since,
                self.limit,
                credential
            ),
        };
        RequestDescriptor {
            initial: url.clone(),
            url,
        }
    }

    /// Continuation: the cycle's initial URL plus an exclusive `until` upper
    /// bound. `since` and `limit` are already on the initial URL.
    pub fn continuation(&self, prev: &RequestDescriptor, prev_stalest: i64) -> RequestDescriptor {
        RequestDescriptor {
            initial: prev.initial.clone(),
            url: format!("{}&until={}", prev.initial, prev_stalest),
        }
    }
}
