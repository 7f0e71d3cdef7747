// src/scheduler.rs
//! Publish cadence. One "publish cycle" is: open today's dedup store, fetch
//! candidates, filter, then publish each survivor with a randomized gap in
//! between. Two pacing policies decide when cycles happen:
//!
//! - immediate: a random number of cycles in [1, max], separated by random
//!   sleeps in the configured range, then done;
//! - daily: every day a random number of cycles at random times spread over
//!   the remaining hours of the day, forever.
//!
//! Everything is a plain time-based sleep on the single driver task; there
//! is no work to overlap with the waits.

use crate::dedup::DedupStore;
use crate::feed::{FeedSource, NewsItem};
use crate::filter::filter_candidates;
use crate::publish::{PublishError, Publisher};
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use rand::{thread_rng, Rng};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

const SECS_PER_DAY: u64 = 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingPolicy {
    Immediate,
    Daily,
}

impl std::str::FromStr for PacingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "daily" => Ok(Self::Daily),
            other => Err(anyhow::anyhow!("unknown pacing policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PacingCfg {
    pub policy: PacingPolicy,
    /// Upper bound on publish cycles per period (run or day); the actual
    /// count is drawn uniformly from [1, max].
    pub max_per_period: u32,
    /// Random sleep between items within a cycle, seconds (min, max).
    pub item_gap_secs: (u64, u64),
    /// Random sleep between cycles under the immediate policy, seconds.
    pub cycle_gap_secs: (u64, u64),
    pub recency_window_hours: i64,
}

/// One scheduled publish, paired with the moment it should go out.
/// Ephemeral; lives only for the duration of a cycle.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    pub item: NewsItem,
    pub scheduled_at: DateTime<Utc>,
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_items_parsed_total", "Items parsed from feeds.");
        describe_counter!("feed_errors_total", "Feed fetch/parse errors.");
        describe_counter!("publish_cycles_total", "Publish cycles run.");
        describe_counter!("posts_total", "Posts successfully published.");
        describe_counter!("publish_errors_total", "Per-item publish failures.");
        describe_counter!(
            "publish_empty_summary_total",
            "Items skipped because summarization produced nothing."
        );
        describe_gauge!("last_cycle_ts", "Unix ts when the last cycle ran.");
    });
}

fn rand_secs((min, max): (u64, u64)) -> u64 {
    let hi = max.max(min);
    // rng is dropped before any await point
    thread_rng().gen_range(min..=hi)
}

fn rand_count(max: u32) -> u32 {
    thread_rng().gen_range(1..=max.max(1))
}

/// Assign each candidate a send time: the first goes out now, each following
/// one after a fresh random gap. Times are non-decreasing.
pub fn plan_cycle(
    candidates: Vec<NewsItem>,
    now: DateTime<Utc>,
    item_gap_secs: (u64, u64),
) -> Vec<PublishPlan> {
    let mut at = now;
    let mut plans = Vec::with_capacity(candidates.len());
    for (i, item) in candidates.into_iter().enumerate() {
        if i > 0 {
            at += ChronoDuration::seconds(rand_secs(item_gap_secs) as i64);
        }
        plans.push(PublishPlan {
            item,
            scheduled_at: at,
        });
    }
    plans
}

pub struct PacingScheduler {
    feed: Box<dyn FeedSource>,
    publisher: Publisher,
    cfg: PacingCfg,
    dedup_dir: PathBuf,
}

impl PacingScheduler {
    pub fn new(
        feed: Box<dyn FeedSource>,
        publisher: Publisher,
        cfg: PacingCfg,
        dedup_dir: PathBuf,
    ) -> Self {
        ensure_metrics_described();
        Self {
            feed,
            publisher,
            cfg,
            dedup_dir,
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        match self.cfg.policy {
            PacingPolicy::Immediate => self.run_immediate().await,
            PacingPolicy::Daily => self.run_daily().await,
        }
    }

    /// Random cycle count now, random sleeps in between, then return.
    async fn run_immediate(&self) -> anyhow::Result<()> {
        let count = rand_count(self.cfg.max_per_period);
        info!(cycles = count, "immediate pacing: starting run");
        for i in 0..count {
            self.run_cycle().await;
            if i + 1 < count {
                let gap = rand_secs(self.cfg.cycle_gap_secs);
                info!(sleep_secs = gap, "pausing before next cycle");
                tokio::time::sleep(Duration::from_secs(gap)).await;
            }
        }
        Ok(())
    }

    /// Every day: random cycle count at random times over what is left of the
    /// day, then sleep to the next UTC day boundary. Runs until cancelled.
    async fn run_daily(&self) -> anyhow::Result<()> {
        loop {
            let now = Utc::now();
            let elapsed_today = u64::from(now.num_seconds_from_midnight());
            let remaining = SECS_PER_DAY.saturating_sub(elapsed_today).max(60);

            let count = rand_count(self.cfg.max_per_period);
            let mut offsets: Vec<u64> = (0..count)
                .map(|_| thread_rng().gen_range(0..remaining))
                .collect();
            offsets.sort_unstable();
            info!(cycles = count, window_secs = remaining, "daily pacing: schedule drawn");

            let mut elapsed = 0u64;
            for off in offsets {
                tokio::time::sleep(Duration::from_secs(off - elapsed)).await;
                elapsed = off;
                self.run_cycle().await;
            }

            tokio::time::sleep(Duration::from_secs(remaining - elapsed)).await;
        }
    }

    /// Fetch → filter → publish each survivor at its planned time. Per-item
    /// failures are logged and skipped; nothing here aborts the run.
    async fn run_cycle(&self) {
        counter!("publish_cycles_total").increment(1);
        gauge!("last_cycle_ts").set(Utc::now().timestamp() as f64);

        let mut store = match DedupStore::open_today(&self.dedup_dir) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = ?e, "cannot open dedup store, skipping cycle");
                return;
            }
        };

        let items = match self.feed.fetch_recent_items().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = ?e, "feed fetch failed, skipping cycle");
                return;
            }
        };

        let now = Utc::now();
        let candidates = filter_candidates(
            items,
            &store,
            ChronoDuration::hours(self.cfg.recency_window_hours),
            now,
        );
        if candidates.is_empty() {
            info!("no fresh items to post");
            return;
        }
        info!(candidates = candidates.len(), "cycle starting");

        for plan in plan_cycle(candidates, now, self.cfg.item_gap_secs) {
            let wait = (plan.scheduled_at - Utc::now()).num_seconds();
            if wait > 0 {
                tokio::time::sleep(Duration::from_secs(wait as u64)).await;
            }
            match self.publisher.publish_one(&plan.item, &mut store).await {
                Ok(_) => {}
                Err(PublishError::EmptySummary) => {
                    info!(link = %plan.item.link, "no usable summary, skipping item");
                }
                Err(PublishError::Record(e)) => {
                    // The post went out and the in-memory index has the link,
                    // so this item will not be retried this process.
                    counter!("publish_errors_total").increment(1);
                    warn!(error = ?e, link = %plan.item.link, "posted but failed to record in dedup log");
                }
                Err(e) => {
                    counter!("publish_errors_total").increment(1);
                    warn!(error = ?e, link = %plan.item.link, "publish failed, will retry next cycle");
                }
            }
        }
    }
}
