// src/publish.rs
//! Per-item publish pipeline: sanitize → summarize → hashtags → compose →
//! post → record. All failures here are per-item; the scheduler logs them
//! and moves on, and an unrecorded item stays eligible next cycle.

use crate::dedup::DedupStore;
use crate::feed::NewsItem;
use crate::hashtags::HashtagGenerator;
use crate::poster::{PostId, PostingService};
use crate::sanitize::Sanitizer;
use crate::summarize::Summarizer;
use chrono::Utc;
use metrics::counter;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The summarizer could not produce usable prose. Non-fatal: the item is
    /// not recorded and stays eligible while inside its recency window.
    #[error("summarizer returned an empty summary")]
    EmptySummary,
    /// The posting call failed; nothing was recorded.
    #[error("posting service failed")]
    Post(#[source] anyhow::Error),
    /// The post went out but the dedup log write failed. The post exists, so
    /// callers should treat this as posted and surface the log problem.
    #[error("post succeeded but recording the link failed")]
    Record(#[source] anyhow::Error),
}

pub struct Publisher {
    sanitizer: Sanitizer,
    hashtags: HashtagGenerator,
    summarizer: Box<dyn Summarizer>,
    poster: Box<dyn PostingService>,
    /// Character budget for the post-body summarization pass. Applies to the
    /// generated prose only; hashtags and the link may push the composed text
    /// past it, and that is intended behavior.
    max_post_length: usize,
    /// Budget for the longer hashtag-derivation pass.
    hashtag_pass_length: usize,
}

impl Publisher {
    pub fn new(
        sanitizer: Sanitizer,
        hashtags: HashtagGenerator,
        summarizer: Box<dyn Summarizer>,
        poster: Box<dyn PostingService>,
        max_post_length: usize,
        hashtag_pass_length: usize,
    ) -> Self {
        Self {
            sanitizer,
            hashtags,
            summarizer,
            poster,
            max_post_length,
            hashtag_pass_length,
        }
    }

    /// Publish one item and record its link on success.
    pub async fn publish_one(
        &self,
        item: &NewsItem,
        store: &mut DedupStore,
    ) -> Result<PostId, PublishError> {
        let clean = self.sanitizer.sanitize(&item.summary);

        let summary = self.summarizer.summarize(&clean, self.max_post_length).await;
        if summary.is_empty() {
            counter!("publish_empty_summary_total").increment(1);
            return Err(PublishError::EmptySummary);
        }

        // A longer pass over the same content gives hashtag derivation more
        // context than the post body needs. An empty pass just means no tags.
        let long_pass = self
            .summarizer
            .summarize(&clean, self.hashtag_pass_length)
            .await;
        let tags = self.hashtags.select_top_hashtags(&long_pass);
        if tags.is_empty() {
            debug!(link = %item.link, "no hashtags derived, posting without");
        }

        let text = compose(&summary, &tags, &item.link);

        let post_id = self
            .poster
            .publish(&text)
            .await
            .map_err(PublishError::Post)?;
        counter!("posts_total").increment(1);
        info!(post_id = %post_id, link = %item.link, "posted");

        store
            .append(&item.link, Utc::now())
            .map_err(PublishError::Record)?;
        Ok(post_id)
    }
}

/// Final post text: summary, the hashtags if any, then the link.
fn compose(summary: &str, tags: &[String], link: &str) -> String {
    let mut text = String::with_capacity(summary.len() + link.len() + 32);
    text.push_str(summary);
    if !tags.is_empty() {
        text.push(' ');
        text.push_str(&tags.join(" "));
    }
    text.push(' ');
    text.push_str(link);
    text
}
