use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;

const PIXABAY_URL: &str = "https://pixabay.com/api/";

/// Finds an illustration for a mood. Lookups never fail the caller; a
/// missing image is just `None`.
#[async_trait]
pub trait MoodImageLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Option<String>;
}

pub fn from_config(config: &Config) -> Arc<dyn MoodImageLookup> {
    match &config.pixabay_api_key {
        Some(key) => match PixabayLookup::new(key.clone()) {
            Ok(lookup) => Arc::new(lookup),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build Pixabay client, mood illustrations disabled");
                Arc::new(NoImageLookup)
            }
        },
        None => {
            tracing::info!("PIXABAY_API_KEY not set, mood illustrations disabled");
            Arc::new(NoImageLookup)
        }
    }
}

pub struct NoImageLookup;

#[async_trait]
impl MoodImageLookup for NoImageLookup {
    async fn lookup(&self, _query: &str) -> Option<String> {
        None
    }
}

pub struct PixabayLookup {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    #[serde(rename = "largeImageURL")]
    large_image_url: String,
}

impl PixabayLookup {
    pub fn new(api_key: String) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client, api_key })
    }

    async fn search(&self, query: &str) -> Result<Option<String>, anyhow::Error> {
        let response = self
            .client
            .get(PIXABAY_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("min_width", "1280"),
                ("min_height", "720"),
                ("image_type", "illustration"),
                ("category", "feelings"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Pixabay API error {}", status);
        }

        let body: PixabayResponse = response.json().await?;
        Ok(first_image(body))
    }
}

fn first_image(body: PixabayResponse) -> Option<String> {
    body.hits.into_iter().next().map(|hit| hit.large_image_url)
}

#[async_trait]
impl MoodImageLookup for PixabayLookup {
    async fn lookup(&self, query: &str) -> Option<String> {
        match self.search(query).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, query = %query, "Mood image lookup failed");
                None
            }
        }
    }
}
