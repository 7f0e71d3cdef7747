// src/sanitize.rs
//! Deterministic text cleanup applied before summarization: tag/URL removal,
//! whitespace normalization, and denylist masking. `sanitize` is idempotent.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Words masked out of any text we post. Matched as whole words,
/// case-insensitively; replaced by an equal-length run of `*`.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "fuck", "shit", "damn", "bitch", "asshole", "fucking", "fucker",
];

const MASK_CHAR: char = '*';

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"))
}

fn re_urls() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)https?://\S+|www\.\S+").expect("url regex"))
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("ws regex"))
}

#[derive(Debug, Clone)]
pub struct Sanitizer {
    deny_re: Option<Regex>,
}

impl Sanitizer {
    /// Build a sanitizer for the given denylist. Words are matched whole and
    /// case-insensitively. An empty denylist disables masking.
    pub fn new<S: AsRef<str>>(denylist: &[S]) -> Self {
        let words: Vec<String> = denylist
            .iter()
            .map(|w| regex::escape(w.as_ref().trim()))
            .filter(|w| !w.is_empty())
            .collect();
        let deny_re = if words.is_empty() {
            None
        } else {
            let pat = format!(r"(?i)\b(?:{})\b", words.join("|"));
            // The pattern is built from escaped literals, so this can't fail.
            Some(Regex::new(&pat).expect("denylist regex"))
        };
        Self { deny_re }
    }

    /// Strip markup and URLs, collapse whitespace, and mask denylisted words.
    /// Returns `""` for empty input and never fails.
    pub fn sanitize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        // No HTML-entity decoding here: decoding is not idempotent on
        // double-encoded input, and idempotence is part of this contract.
        let mut out = re_tags().replace_all(raw, "").to_string();
        out = re_urls().replace_all(&out, "").to_string();
        out = re_ws().replace_all(&out, " ").trim().to_string();

        if let Some(re) = &self.deny_re {
            out = re
                .replace_all(&out, |caps: &regex::Captures<'_>| {
                    let hit = caps.get(0).map_or("", |m| m.as_str());
                    MASK_CHAR.to_string().repeat(hit.chars().count())
                })
                .to_string();
        }

        out
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST)
    }
}
