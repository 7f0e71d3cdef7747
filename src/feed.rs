// src/feed.rs
//! Feed-source collaborator: fetches recent tech/AI news items from a set of
//! RSS feeds, merged and time-sorted. One unreachable or unparsable feed is
//! logged and skipped, never aborting the whole fetch.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

pub const ENV_FEEDS_PATH: &str = "FEEDS_PATH";
pub const DEFAULT_FEEDS_PATH: &str = "config/feeds.toml";

/// Subscribed feeds used when no `config/feeds.toml` is present.
pub const DEFAULT_FEEDS: &[&str] = &[
    "https://blog.ml.cmu.edu/feed/",
    "https://code.facebook.com/posts/rss",
    "https://deepmind.com/blog/feed/basic/",
    "http://news.mit.edu/rss/topic/artificial-intelligence2",
    "http://www.reddit.com/r/MachineLearning/.rss",
    "https://techcrunch.com/feed/",
    "https://www.wired.com/feed/rss",
    "https://www.theverge.com/rss/index.xml",
    "https://feeds.feedburner.com/TechCrunch/startups",
    "https://www.cnet.com/rss/news/",
    "https://blogs.gartner.com/smarterwithgartner/feed/",
    "https://techradar.com/rss",
    "http://pcmag.com/feeds/rss/latest",
    "https://nesslabs.com/feed",
    "http://www.forbes.com/entrepreneurs/index.xml",
    "https://developer.atlassian.com/blog/feed.xml",
    "https://blog.twitter.com/engineering/en_us/blog.rss",
];

/// One discovered news item. `link` is the natural identity key and is
/// compared byte-for-byte (case- and fragment-sensitive). A missing or
/// unparsable publish time stays `None` so downstream filtering can fail
/// closed instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_recent_items(&self) -> Result<Vec<NewsItem>>;
}

// --- RSS wire types (quick-xml serde) ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Topic gate recovered from the original feed set: only items whose title
/// mentions AI, artificial intelligence, or machine learning pass.
fn is_topical(title: &str) -> bool {
    let lower = title.to_lowercase();
    title.contains("AI")
        || lower.contains("artificial intelligence")
        || lower.contains("machine learning")
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

/// Parse one RSS document into news items. Items without a link are dropped;
/// items without a parsable pubDate keep `published_at = None`.
pub fn parse_channel(xml: &str) -> Result<Vec<NewsItem>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let Some(link) = it.link.filter(|l| !l.trim().is_empty()) else {
            continue;
        };
        let title = it.title.unwrap_or_default();
        let summary = html_escape::decode_html_entities(
            it.description.as_deref().unwrap_or_default(),
        )
        .to_string();
        out.push(NewsItem {
            title,
            summary,
            link: link.trim().to_string(),
            published_at: it.pub_date.as_deref().and_then(parse_rfc2822),
        });
    }
    counter!("feed_items_parsed_total").increment(out.len() as u64);
    Ok(out)
}

pub struct RssFeedSource {
    feeds: Vec<String>,
    client: reqwest::Client,
}

impl RssFeedSource {
    pub fn new(feeds: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("technews-poster/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { feeds, client }
    }

    async fn fetch_one(&self, url: &str) -> Result<Vec<NewsItem>> {
        debug!(feed = url, "fetching feed");
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching feed {url}"))?
            .text()
            .await
            .with_context(|| format!("reading feed body {url}"))?;
        parse_channel(&body)
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    /// Fetch all subscribed feeds, keep topical items, and return them merged
    /// and sorted newest-first (items without a timestamp sort last).
    async fn fetch_recent_items(&self) -> Result<Vec<NewsItem>> {
        let mut all = Vec::new();
        for url in &self.feeds {
            match self.fetch_one(url).await {
                Ok(mut items) => all.append(&mut items),
                Err(e) => {
                    warn!(feed = url, error = ?e, "feed fetch failed, skipping");
                    counter!("feed_errors_total").increment(1);
                }
            }
        }

        all.retain(|it| is_topical(&it.title));
        all.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(all)
    }
}

/// Load the feed list using env var + fallbacks:
/// 1) $FEEDS_PATH
/// 2) config/feeds.toml (`feeds = ["...", ...]`)
/// 3) built-in default list
pub fn load_feeds_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        return load_feeds_from(&PathBuf::from(p));
    }
    let fallback = PathBuf::from(DEFAULT_FEEDS_PATH);
    if fallback.exists() {
        return load_feeds_from(&fallback);
    }
    Ok(DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect())
}

pub fn load_feeds_from(path: &Path) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct FeedsToml {
        feeds: Vec<String>,
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading feed list from {}", path.display()))?;
    let parsed: FeedsToml = toml::from_str(&content).context("parsing feed list toml")?;
    Ok(parsed
        .feeds
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect())
}
