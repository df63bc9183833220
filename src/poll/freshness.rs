// src/poll/freshness.rs

use crate::poll::watermark::WatermarkStore;
use crate::wire::{Page, PageItem};

/// Split the fresh prefix off a newest-first page and advance the query's
/// `freshest` watermark from the page head.
///
/// Fresh means strictly newer than `prev_freshest`. Pages are newest-first,
/// so the fresh subsequence is a contiguous prefix and the scan can stop at
/// the first stale item. An empty page changes nothing; a page with no fresh
/// items leaves `freshest` unchanged (page head is at or below it already).
pub fn split_fresh<'a>(page: &'a Page, marks: &mut WatermarkStore, query: &str) -> &'a [PageItem] {
    let prev_freshest = marks.get(query).prev_freshest;

    if let Some(newest) = page.newest() {
        marks.advance_freshest(query, newest);
    }

    let fresh = page
        .items
        .iter()
        .take_while(|it| it.created > prev_freshest)
        .count();
    &page.items[..fresh]
}
