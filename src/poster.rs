// src/poster.rs
//! Publishing collaborator: the external social-posting API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub type PostId = String;

#[async_trait]
pub trait PostingService: Send + Sync {
    /// Publish `text` as one post. Success returns the service-assigned id;
    /// failure is an error value the publisher maps to a per-item skip.
    async fn publish(&self, text: &str) -> Result<PostId>;
}

/// X API v2 client (`POST /2/tweets`, OAuth2 user-context bearer token).
///
/// No retries here: a failed publish leaves the item unrecorded so the next
/// scheduled cycle picks it up again.
pub struct XApiPoster {
    endpoint: String,
    bearer_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
}

impl XApiPoster {
    const ENDPOINT: &'static str = "https://api.x.com/2/tweets";

    pub fn new(bearer_token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            endpoint: Self::ENDPOINT.to_string(),
            bearer_token,
            client,
        }
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl PostingService for XApiPoster {
    async fn publish(&self, text: &str) -> Result<PostId> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.bearer_token)
            .json(&json!({ "text": text }))
            .send()
            .await
            .context("sending create-post request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("create-post returned {status}: {body}"));
        }

        let created: CreatePostResponse =
            resp.json().await.context("decoding create-post response")?;
        Ok(created.data.id)
    }
}
