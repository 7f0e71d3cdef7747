// src/config.rs
//! Env-driven runtime configuration. Credentials are required and missing
//! ones abort startup; everything else has a sensible default. `.env` is
//! loaded by `main` before this runs.

use crate::scheduler::{PacingCfg, PacingPolicy};
use crate::summarize::HfSummarizer;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const ENV_X_BEARER_TOKEN: &str = "X_BEARER_TOKEN";
pub const ENV_HF_API_TOKEN: &str = "HUGGINGFACE_API_TOKEN";
pub const ENV_MODEL_NAME: &str = "MODEL_NAME";
pub const ENV_MAX_POST_LENGTH: &str = "MAX_POST_LENGTH";
pub const ENV_HASHTAG_PASS_LENGTH: &str = "HASHTAG_PASS_LENGTH";
pub const ENV_MAX_POSTS_PER_PERIOD: &str = "MAX_POSTS_PER_PERIOD";
pub const ENV_RECENCY_WINDOW_HOURS: &str = "RECENCY_WINDOW_HOURS";
pub const ENV_PACING_MIN_SECS: &str = "PACING_MIN_SECS";
pub const ENV_PACING_MAX_SECS: &str = "PACING_MAX_SECS";
pub const ENV_PACING_POLICY: &str = "PACING_POLICY";
pub const ENV_DEDUP_LOG_DIR: &str = "DEDUP_LOG_DIR";

pub const DEFAULT_MAX_POST_LENGTH: usize = 120;
pub const DEFAULT_HASHTAG_PASS_LENGTH: usize = 240;
pub const DEFAULT_MAX_POSTS_PER_PERIOD: u32 = 2;
pub const DEFAULT_RECENCY_WINDOW_HOURS: i64 = 24;
// 3–10 minutes between publishes, per the anti-burst pacing design.
pub const DEFAULT_PACING_MIN_SECS: u64 = 180;
pub const DEFAULT_PACING_MAX_SECS: u64 = 600;
pub const DEFAULT_DEDUP_LOG_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Config {
    pub x_bearer_token: String,
    pub hf_api_token: String,
    pub model_name: String,
    pub max_post_length: usize,
    pub hashtag_pass_length: usize,
    pub dedup_dir: PathBuf,
    pub pacing: PacingCfg,
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Read configuration from the environment. Missing credentials are the
    /// one fatal startup class; malformed numeric knobs fall back to their
    /// defaults rather than aborting.
    pub fn from_env() -> Result<Self> {
        let x_bearer_token = std::env::var(ENV_X_BEARER_TOKEN)
            .context("X_BEARER_TOKEN is required to publish posts")?;
        let hf_api_token = std::env::var(ENV_HF_API_TOKEN)
            .context("HUGGINGFACE_API_TOKEN is required for summarization")?;

        let model_name = std::env::var(ENV_MODEL_NAME)
            .unwrap_or_else(|_| HfSummarizer::DEFAULT_MODEL.to_string());

        let min = env_parsed(ENV_PACING_MIN_SECS, DEFAULT_PACING_MIN_SECS);
        let max = env_parsed(ENV_PACING_MAX_SECS, DEFAULT_PACING_MAX_SECS).max(min);

        let policy = std::env::var(ENV_PACING_POLICY)
            .ok()
            .map(|v| v.parse::<PacingPolicy>())
            .transpose()
            .context("parsing PACING_POLICY")?
            .unwrap_or(PacingPolicy::Immediate);

        Ok(Self {
            x_bearer_token,
            hf_api_token,
            model_name,
            max_post_length: env_parsed(ENV_MAX_POST_LENGTH, DEFAULT_MAX_POST_LENGTH),
            hashtag_pass_length: env_parsed(
                ENV_HASHTAG_PASS_LENGTH,
                DEFAULT_HASHTAG_PASS_LENGTH,
            ),
            dedup_dir: PathBuf::from(
                std::env::var(ENV_DEDUP_LOG_DIR)
                    .unwrap_or_else(|_| DEFAULT_DEDUP_LOG_DIR.to_string()),
            ),
            pacing: PacingCfg {
                policy,
                max_per_period: env_parsed(
                    ENV_MAX_POSTS_PER_PERIOD,
                    DEFAULT_MAX_POSTS_PER_PERIOD,
                ),
                item_gap_secs: (min, max),
                cycle_gap_secs: (min, max),
                recency_window_hours: env_parsed(
                    ENV_RECENCY_WINDOW_HOURS,
                    DEFAULT_RECENCY_WINDOW_HOURS,
                ),
            },
        })
    }
}
