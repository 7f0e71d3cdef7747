// src/keywords.rs
//! Keyword extraction: tokenize, drop stop words, score by frequency with a
//! bonus for technology-vocabulary terms, and rank.
//!
//! Token identity keeps the original casing, so `AI`, `Ai` and `ai` count as
//! three different tokens. That preserves acronym signal: an all-caps token
//! that survives scoring is almost always a name worth tagging.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const ENV_LEXICON_PATH: &str = "LEXICON_PATH";
pub const DEFAULT_LEXICON_PATH: &str = "config/lexicon.toml";

/// Generic words never worth a hashtag, unless capitalized in the source text.
const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from",
    "has", "have", "he", "her", "his", "if", "in", "into", "is", "it", "its",
    "more", "new", "no", "not", "of", "on", "or", "our", "out", "she", "so",
    "than", "that", "the", "their", "them", "they", "this", "to", "up", "was",
    "we", "were", "what", "when", "which", "who", "will", "with", "you",
    "your",
];

/// Terms that get the +2 domain bonus and count as "technology-relevant"
/// during hashtag selection. Compared lowercased.
const DEFAULT_TECH_VOCAB: &[&str] = &[
    "ai", "agent", "agents", "algorithm", "api", "apple", "automation",
    "blockchain", "chatbot", "chip", "chips", "cloud", "compute", "crypto",
    "cybersecurity", "data", "dataset", "deepmind", "gpu", "hardware",
    "intelligence", "learning", "llm", "machine", "meta", "microsoft",
    "model", "models", "neural", "nvidia", "openai", "opensource", "privacy",
    "quantum", "robot", "robotics", "robots", "saas", "semiconductor",
    "software", "startup", "startups", "tech", "technology", "training",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub text: String,
    pub frequency: u32,
    pub score: u32,
}

/// Shared word lists for the pipeline: stop words and tech vocabulary for
/// keyword scoring, denylist for the sanitizer. Loadable from one TOML file,
/// with built-in defaults when no file is configured.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub stop_words: HashSet<String>,
    pub tech_vocab: HashSet<String>,
    pub denylist: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LexiconToml {
    #[serde(default)]
    stop_words: Vec<String>,
    #[serde(default)]
    tech_vocab: Vec<String>,
    #[serde(default)]
    denylist: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            tech_vocab: DEFAULT_TECH_VOCAB.iter().map(|s| s.to_string()).collect(),
            denylist: crate::sanitize::DEFAULT_DENYLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Lexicon {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: LexiconToml = toml::from_str(s).context("parsing lexicon toml")?;
        let base = Self::default();
        Ok(Self {
            stop_words: if raw.stop_words.is_empty() {
                base.stop_words
            } else {
                raw.stop_words.into_iter().map(|w| w.to_lowercase()).collect()
            },
            tech_vocab: if raw.tech_vocab.is_empty() {
                base.tech_vocab
            } else {
                raw.tech_vocab.into_iter().map(|w| w.to_lowercase()).collect()
            },
            denylist: if raw.denylist.is_empty() {
                base.denylist
            } else {
                raw.denylist
            },
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallback:
    /// 1) $LEXICON_PATH
    /// 2) config/lexicon.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_LEXICON_PATH) {
            return Self::from_path(&PathBuf::from(p));
        }
        let fallback = PathBuf::from(DEFAULT_LEXICON_PATH);
        if fallback.exists() {
            return Self::from_path(&fallback);
        }
        Ok(Self::default())
    }

    pub fn is_tech_term(&self, word: &str) -> bool {
        self.tech_vocab.contains(&word.to_lowercase())
    }
}

fn re_tokens() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?u)\b\w+\b").expect("token regex"))
}

#[derive(Debug, Clone, Default)]
pub struct KeywordExtractor {
    lexicon: Lexicon,
}

impl KeywordExtractor {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Top `top_n` keywords of `text`, scored by
    /// `frequency + 2 * (token is in the tech vocabulary)`.
    ///
    /// Stop words are dropped unless the token starts uppercase (a capitalized
    /// stop-word lookalike is usually a name). Sort order is score descending,
    /// then longer token first; that tie-break is observable and relied on by
    /// hashtag selection.
    pub fn extract(&self, text: &str, top_n: usize) -> Vec<Keyword> {
        let mut freq: HashMap<&str, u32> = HashMap::new();
        for m in re_tokens().find_iter(text) {
            let tok = m.as_str();
            let capitalized = tok.chars().next().is_some_and(|c| c.is_uppercase());
            if !capitalized && self.lexicon.stop_words.contains(&tok.to_lowercase()) {
                continue;
            }
            *freq.entry(tok).or_insert(0) += 1;
        }

        let mut keywords: Vec<Keyword> = freq
            .into_iter()
            .map(|(tok, frequency)| {
                let bonus = if self.lexicon.is_tech_term(tok) { 2 } else { 0 };
                Keyword {
                    text: tok.to_string(),
                    frequency,
                    score: frequency + bonus,
                }
            })
            .collect();

        keywords.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.text.chars().count().cmp(&a.text.chars().count()))
                .then(a.text.cmp(&b.text))
        });
        keywords.truncate(top_n);
        keywords
    }
}
