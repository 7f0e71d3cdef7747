// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod dedup;
pub mod feed;
pub mod filter;
pub mod hashtags;
pub mod keywords;
pub mod poster;
pub mod publish;
pub mod sanitize;
pub mod scheduler;
pub mod summarize;

// ---- Re-exports for stable public API ----
pub use crate::dedup::DedupStore;
pub use crate::feed::{FeedSource, NewsItem};
pub use crate::filter::filter_candidates;
pub use crate::hashtags::HashtagGenerator;
pub use crate::keywords::{Keyword, KeywordExtractor, Lexicon};
pub use crate::poster::{PostId, PostingService};
pub use crate::publish::{PublishError, Publisher};
pub use crate::sanitize::Sanitizer;
pub use crate::scheduler::{PacingCfg, PacingPolicy, PacingScheduler};
pub use crate::summarize::Summarizer;
