// src/poll/pagination.rs

use crate::wire::Page;

/// Decide whether another page must be fetched after processing `page`.
///
/// Continue only if the remote signalled more pages, the page came back full
/// (count == requested limit), and the stalest item is still strictly newer
/// than `prev_freshest`. A short page means the remote ran out of data; a
/// stalest timestamp at or below `prev_freshest` means everything further
/// down is already seen.
///
/// `prev_until` is the upper bound the current page was requested with, if
/// any. The next bound must sit strictly below it, otherwise the remote is
/// re-serving the same window and paging would never terminate.
pub fn should_continue(
    page: &Page,
    limit: usize,
    prev_freshest: i64,
    prev_until: Option<i64>,
) -> bool {
    page.has_more
        && page.items.len() == limit
        && page.stalest().is_some_and(|ts| {
            ts > prev_freshest && prev_until.map_or(true, |bound| ts < bound)
        })
}
