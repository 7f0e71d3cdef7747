//! technews-poster — Binary Entrypoint
//! Loads configuration, wires the external collaborators (RSS feeds,
//! Hugging Face summarizer, X posting API) to the publish pipeline, and
//! hands control to the pacing scheduler.

use anyhow::Context;
use technews_poster::config::Config;
use technews_poster::feed::{load_feeds_default, RssFeedSource};
use technews_poster::hashtags::HashtagGenerator;
use technews_poster::keywords::{KeywordExtractor, Lexicon};
use technews_poster::poster::XApiPoster;
use technews_poster::publish::Publisher;
use technews_poster::sanitize::Sanitizer;
use technews_poster::scheduler::PacingScheduler;
use technews_poster::summarize::HfSummarizer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("technews_poster=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when variables come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Startup failures here are the only fatal class; everything past this
    // point degrades per item.
    let cfg = Config::from_env().context("loading configuration")?;
    let lexicon = Lexicon::load_default().context("loading lexicon")?;
    let feeds = load_feeds_default().context("loading feed list")?;
    tracing::info!(feeds = feeds.len(), policy = ?cfg.pacing.policy, "starting up");

    let sanitizer = Sanitizer::new(&lexicon.denylist);
    let extractor = KeywordExtractor::new(lexicon);
    let publisher = Publisher::new(
        sanitizer,
        HashtagGenerator::new(extractor),
        Box::new(HfSummarizer::new(cfg.hf_api_token.clone(), &cfg.model_name)),
        Box::new(XApiPoster::new(cfg.x_bearer_token.clone())),
        cfg.max_post_length,
        cfg.hashtag_pass_length,
    );

    let scheduler = PacingScheduler::new(
        Box::new(RssFeedSource::new(feeds)),
        publisher,
        cfg.pacing,
        cfg.dedup_dir.clone(),
    );
    scheduler.run().await
}
