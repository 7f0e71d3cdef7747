// src/filter.rs
//! Admission of raw feed items into the publish pipeline: collapse repeats,
//! drop already-posted links, apply the recency window, newest first.

use crate::dedup::DedupStore;
use crate::feed::NewsItem;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Filter `items` down to publishable candidates:
///
/// - repeats by link are collapsed (the feed merge can carry the same story
///   from several sources), first occurrence wins;
/// - items whose link is already in `store` are dropped;
/// - items without a `published_at` are dropped (fail closed rather than
///   guess a time);
/// - items published before `now - window` are dropped, judged against the
///   decision point, not the fetch time;
/// - survivors are sorted by publish time, newest first.
pub fn filter_candidates(
    items: Vec<NewsItem>,
    store: &DedupStore,
    window: Duration,
    now: DateTime<Utc>,
) -> Vec<NewsItem> {
    let cutoff = now - window;
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<NewsItem> = Vec::new();

    for item in items {
        if !seen.insert(item.link.clone()) {
            continue;
        }
        let Some(published_at) = item.published_at else {
            debug!(link = %item.link, "dropping item without publish time");
            continue;
        };
        if published_at < cutoff {
            continue;
        }
        if store.contains(&item.link) {
            debug!(link = %item.link, "already posted, skipping");
            continue;
        }
        out.push(item);
    }

    out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    out
}
