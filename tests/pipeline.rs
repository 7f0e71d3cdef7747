// tests/pipeline.rs
// End-to-end pipeline behavior against mock collaborators: no repeat
// publishes, failure handling, and composed post text.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use technews_poster::dedup::DedupStore;
use technews_poster::feed::NewsItem;
use technews_poster::filter::filter_candidates;
use technews_poster::hashtags::HashtagGenerator;
use technews_poster::keywords::{KeywordExtractor, Lexicon};
use technews_poster::poster::{PostId, PostingService};
use technews_poster::publish::{PublishError, Publisher};
use technews_poster::sanitize::Sanitizer;
use technews_poster::summarize::Summarizer;

const BODY_LEN: usize = 120;
const TAG_LEN: usize = 240;

/// Replies depend on the requested length, so the body pass and the longer
/// hashtag pass are distinguishable.
struct ScriptedSummarizer {
    body_reply: String,
    tag_reply: String,
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, _text: &str, max_length: usize) -> String {
        if max_length == BODY_LEN {
            self.body_reply.clone()
        } else {
            self.tag_reply.clone()
        }
    }
}

#[derive(Clone)]
struct RecordingPoster {
    calls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingPoster {
    fn new(fail: bool) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail,
        }
    }

    fn posted(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostingService for RecordingPoster {
    async fn publish(&self, text: &str) -> anyhow::Result<PostId> {
        if self.fail {
            anyhow::bail!("service unavailable");
        }
        self.calls.lock().unwrap().push(text.to_string());
        Ok(format!("post-{}", self.calls.lock().unwrap().len()))
    }
}

/// Fails only for posts whose text mentions `poison`; everything else is
/// recorded like `RecordingPoster`.
#[derive(Clone)]
struct SelectivePoster {
    calls: Arc<Mutex<Vec<String>>>,
    poison: String,
}

impl SelectivePoster {
    fn new(poison: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            poison: poison.to_string(),
        }
    }

    fn posted(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostingService for SelectivePoster {
    async fn publish(&self, text: &str) -> anyhow::Result<PostId> {
        if text.contains(&self.poison) {
            anyhow::bail!("service rejected post");
        }
        self.calls.lock().unwrap().push(text.to_string());
        Ok(format!("post-{}", self.calls.lock().unwrap().len()))
    }
}

fn publisher(summarizer: ScriptedSummarizer, poster: impl PostingService + 'static) -> Publisher {
    let extractor = KeywordExtractor::new(Lexicon::default());
    Publisher::new(
        Sanitizer::default(),
        HashtagGenerator::new(extractor),
        Box::new(summarizer),
        Box::new(poster),
        BODY_LEN,
        TAG_LEN,
    )
}

fn fresh_item(link: &str) -> NewsItem {
    NewsItem {
        title: "AI story".into(),
        summary: "An AI lab shipped a new model overnight.".into(),
        link: link.into(),
        published_at: Some(Utc::now() - Duration::hours(1)),
    }
}

/// One publish cycle over real filter + publisher, the way the scheduler
/// drives them (minus the pacing sleeps).
async fn run_cycle(
    items: Vec<NewsItem>,
    store: &mut DedupStore,
    publisher: &Publisher,
) -> Vec<Result<PostId, PublishError>> {
    let candidates = filter_candidates(items, store, Duration::hours(24), Utc::now());
    let mut results = Vec::new();
    for item in &candidates {
        results.push(publisher.publish_one(item, store).await);
    }
    results
}

#[tokio::test]
async fn successful_publish_composes_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DedupStore::open_today(dir.path()).unwrap();
    let poster = RecordingPoster::new(false);
    let p = publisher(
        ScriptedSummarizer {
            body_reply: "Crisp summary.".into(),
            tag_reply: "ai ai ai cloud cloud compute".into(),
        },
        poster.clone(),
    );

    let results = run_cycle(vec![fresh_item("https://e.com/1")], &mut store, &p).await;
    assert!(results[0].is_ok());
    assert_eq!(
        poster.posted(),
        vec!["Crisp summary. #ai #cloud https://e.com/1".to_string()]
    );
    assert!(store.contains("https://e.com/1"));

    // Record survives a fresh load cycle.
    let reloaded = DedupStore::open_today(dir.path()).unwrap();
    assert!(reloaded.contains("https://e.com/1"));
}

#[tokio::test]
async fn already_posted_link_never_reaches_the_posting_service() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DedupStore::open_today(dir.path()).unwrap();
    store.append("https://e.com/seen", Utc::now()).unwrap();

    let poster = RecordingPoster::new(false);
    let p = publisher(
        ScriptedSummarizer {
            body_reply: "Crisp summary.".into(),
            tag_reply: "ai cloud".into(),
        },
        poster.clone(),
    );

    let results = run_cycle(vec![fresh_item("https://e.com/seen")], &mut store, &p).await;
    assert!(results.is_empty());
    assert!(poster.posted().is_empty());
}

#[tokio::test]
async fn rerun_after_success_does_not_repost() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DedupStore::open_today(dir.path()).unwrap();
    let poster = RecordingPoster::new(false);
    let p = publisher(
        ScriptedSummarizer {
            body_reply: "Crisp summary.".into(),
            tag_reply: "ai cloud".into(),
        },
        poster.clone(),
    );

    let items = vec![fresh_item("https://e.com/1")];
    run_cycle(items.clone(), &mut store, &p).await;
    run_cycle(items, &mut store, &p).await;
    assert_eq!(poster.posted().len(), 1);
}

#[tokio::test]
async fn publish_failure_is_not_recorded_so_retry_stays_possible() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DedupStore::open_today(dir.path()).unwrap();
    let poster = RecordingPoster::new(true);
    let p = publisher(
        ScriptedSummarizer {
            body_reply: "Crisp summary.".into(),
            tag_reply: "ai cloud".into(),
        },
        poster.clone(),
    );

    let results = run_cycle(vec![fresh_item("https://e.com/flaky")], &mut store, &p).await;
    assert!(matches!(results[0], Err(PublishError::Post(_))));
    assert!(!store.contains("https://e.com/flaky"));

    let reloaded = DedupStore::open_today(dir.path()).unwrap();
    assert!(!reloaded.contains("https://e.com/flaky"));
}

#[tokio::test]
async fn empty_summary_skips_item_without_recording() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DedupStore::open_today(dir.path()).unwrap();
    let poster = RecordingPoster::new(false);
    let p = publisher(
        ScriptedSummarizer {
            body_reply: String::new(),
            tag_reply: "ai cloud".into(),
        },
        poster.clone(),
    );

    let results = run_cycle(vec![fresh_item("https://e.com/quiet")], &mut store, &p).await;
    assert!(matches!(results[0], Err(PublishError::EmptySummary)));
    assert!(poster.posted().is_empty());
    assert!(!store.contains("https://e.com/quiet"));
}

#[tokio::test]
async fn empty_hashtag_pass_degrades_to_no_tags() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DedupStore::open_today(dir.path()).unwrap();
    let poster = RecordingPoster::new(false);
    let p = publisher(
        ScriptedSummarizer {
            body_reply: "Crisp summary.".into(),
            tag_reply: String::new(),
        },
        poster.clone(),
    );

    let results = run_cycle(vec![fresh_item("https://e.com/1")], &mut store, &p).await;
    assert!(results[0].is_ok());
    assert_eq!(
        poster.posted(),
        vec!["Crisp summary. https://e.com/1".to_string()]
    );
}

#[tokio::test]
async fn failing_item_does_not_block_the_rest_of_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DedupStore::open_today(dir.path()).unwrap();
    let poster = SelectivePoster::new("e.com/flaky");
    let p = publisher(
        ScriptedSummarizer {
            body_reply: "Crisp summary.".into(),
            tag_reply: "ai cloud".into(),
        },
        poster.clone(),
    );

    // The flaky item is newer, so it is attempted first.
    let mut flaky = fresh_item("https://e.com/flaky");
    flaky.published_at = Some(Utc::now() - Duration::hours(1));
    let mut good = fresh_item("https://e.com/good");
    good.published_at = Some(Utc::now() - Duration::hours(2));

    let results = run_cycle(vec![flaky, good], &mut store, &p).await;
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(PublishError::Post(_))));
    assert!(results[1].is_ok());

    let posted = poster.posted();
    assert_eq!(posted.len(), 1);
    assert!(posted[0].ends_with("https://e.com/good"));
    assert!(store.contains("https://e.com/good"));
    assert!(!store.contains("https://e.com/flaky"));

    let reloaded = DedupStore::open_today(dir.path()).unwrap();
    assert!(reloaded.contains("https://e.com/good"));
    assert!(!reloaded.contains("https://e.com/flaky"));
}

#[tokio::test]
async fn posted_but_unrecorded_item_still_counts_as_posted_in_memory() {
    // A store rooted in a directory that doesn't exist: loading finds no log
    // (fresh store), but the append after a successful post fails.
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let mut store = DedupStore::open(&missing, Utc::now().date_naive()).unwrap();

    let poster = RecordingPoster::new(false);
    let p = publisher(
        ScriptedSummarizer {
            body_reply: "Crisp summary.".into(),
            tag_reply: "ai cloud".into(),
        },
        poster.clone(),
    );

    let item = fresh_item("https://e.com/unrecorded");
    let result = p.publish_one(&item, &mut store).await;
    assert!(matches!(result, Err(PublishError::Record(_))));

    // The post went out, and the in-memory index keeps the link so the same
    // process never retries it.
    assert_eq!(poster.posted().len(), 1);
    assert!(store.contains("https://e.com/unrecorded"));
}

#[tokio::test]
async fn empty_feed_means_no_calls_and_no_appends() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DedupStore::open_today(dir.path()).unwrap();
    let poster = RecordingPoster::new(false);
    let p = publisher(
        ScriptedSummarizer {
            body_reply: "Crisp summary.".into(),
            tag_reply: "ai cloud".into(),
        },
        poster.clone(),
    );

    let results = run_cycle(vec![], &mut store, &p).await;
    assert!(results.is_empty());
    assert!(poster.posted().is_empty());
    assert!(store.is_empty());
}
