// src/summarize.rs
//! Summarization collaborator. The contract is deliberately non-throwing:
//! an empty string is the explicit "could not produce a usable summary"
//! signal, and the publisher treats it as a per-item skip.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text` into at most `max_length` characters of prose.
    /// Returns `""` on failure, never an error.
    async fn summarize(&self, text: &str, max_length: usize) -> String;
}

/// Marker appended when a model overruns the budget and we cut at a word
/// boundary instead.
const CONTINUATION: &str = "..";

/// Hugging Face Inference API client for text generation.
pub struct HfSummarizer {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

impl HfSummarizer {
    pub const DEFAULT_MODEL: &'static str = "EleutherAI/gpt-neo-1.3B";

    pub fn new(token: String, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            endpoint: format!("https://api-inference.huggingface.co/models/{model}"),
            token,
            client,
        }
    }

    fn prompt(text: &str, max_length: usize) -> String {
        format!(
            "Please rephrase the following article into a concise statement: {text} \
             Make sure the statement is clear, under {max_length} characters, \
             contains no special characters, and is written in correct English."
        )
    }

    async fn generate(&self, prompt: &str, max_length: usize) -> anyhow::Result<Vec<String>> {
        let body = json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": max_length,
                "do_sample": true,
                "top_k": 50,
                "top_p": 0.95,
                "temperature": 0.7,
                "num_return_sequences": 3,
                "return_full_text": false
            }
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let candidates: Vec<Generated> = resp.json().await?;
        Ok(candidates.into_iter().map(|g| g.generated_text).collect())
    }
}

#[async_trait]
impl Summarizer for HfSummarizer {
    async fn summarize(&self, text: &str, max_length: usize) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let prompt = Self::prompt(text, max_length);
        match self.generate(&prompt, max_length).await {
            Ok(candidates) => {
                let summary = pick_summary(&candidates, &prompt, max_length);
                debug!(chars = summary.len(), "summary generated");
                summary
            }
            Err(e) => {
                warn!(error = ?e, "summarization failed");
                String::new()
            }
        }
    }
}

/// Choose among sampled candidates: the first one that fits the budget and
/// ends a sentence wins as-is. When none qualifies, candidate 0 gets the
/// full `tidy_summary` treatment instead.
pub(crate) fn pick_summary(candidates: &[String], prompt: &str, max_length: usize) -> String {
    for raw in candidates {
        let cand = raw.replace(prompt, "").trim().to_string();
        if !cand.is_empty() && cand.chars().count() <= max_length && cand.ends_with('.') {
            return cand;
        }
    }
    candidates
        .first()
        .map(|raw| tidy_summary(raw, prompt, max_length))
        .unwrap_or_default()
}

/// Post-process raw model output: drop any prompt echo, fit the character
/// budget with a word-boundary cut, and make sure the result ends a sentence.
pub(crate) fn tidy_summary(generated: &str, prompt: &str, max_length: usize) -> String {
    let mut out = generated.replace(prompt, "").trim().to_string();
    if out.is_empty() {
        return out;
    }
    if out.chars().count() > max_length {
        out = truncate_at_word(&out, max_length.saturating_sub(CONTINUATION.len()));
        out.push_str(CONTINUATION);
    } else if !out.ends_with('.') {
        out.push('.');
    }
    out
}

fn truncate_at_word(s: &str, max_chars: usize) -> String {
    let cut: String = s.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(idx) if idx > 0 => cut[..idx].trim_end().to_string(),
        _ => cut.trim_end().to_string(),
    }
}
