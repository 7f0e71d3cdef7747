// src/hashtags.rs
//! Turns ranked keywords into a small, topic-biased hashtag set.

use crate::keywords::{Keyword, KeywordExtractor};

const MARKER: char = '#';

/// Keywords considered per selection pass.
const KEYWORD_POOL: usize = 5;

/// At most this many hashtags end up on a post.
const MAX_SELECTED: usize = 2;

pub type Hashtag = String;

/// Map each keyword to a hashtag, 1:1, keeping the incoming (score-sorted)
/// order. Keywords are already unique by token identity, so no extra dedup.
pub fn generate(keywords: &[Keyword]) -> Vec<Hashtag> {
    keywords
        .iter()
        .map(|k| format!("{MARKER}{}", k.text))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct HashtagGenerator {
    extractor: KeywordExtractor,
}

impl HashtagGenerator {
    pub fn new(extractor: KeywordExtractor) -> Self {
        Self { extractor }
    }

    /// Pick at most two hashtags for `text`, preferring technology terms.
    ///
    /// Three-tier fallback over the score-sorted candidates:
    /// - two or more tech-relevant tags: take the first two of them;
    /// - exactly one: take it plus the first non-tech tag;
    /// - none: take the first two tags of any kind.
    pub fn select_top_hashtags(&self, text: &str) -> Vec<Hashtag> {
        let keywords = self.extractor.extract(text, KEYWORD_POOL);
        let tags = generate(&keywords);

        let mut tech = Vec::new();
        let mut other = Vec::new();
        for tag in tags {
            let bare = tag.trim_start_matches(MARKER);
            if self.extractor.lexicon().is_tech_term(bare) {
                tech.push(tag);
            } else {
                other.push(tag);
            }
        }

        let mut out = Vec::with_capacity(MAX_SELECTED);
        if tech.len() >= MAX_SELECTED {
            out.extend(tech.into_iter().take(MAX_SELECTED));
        } else if tech.len() == 1 {
            out.extend(tech);
            out.extend(other.into_iter().take(1));
        } else {
            out.extend(other.into_iter().take(MAX_SELECTED));
        }
        out
    }
}
