// HTTP proof source - a proofs directory served by a static file server

use super::error::FetchError;
use super::listing::ListingParser;
use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    /// Directory URL, always with a trailing slash so joins stay inside it
    base: Url,
    listing: ListingParser,
}

impl HttpSource {
    pub fn new(location: &str, timeout: Duration) -> Result<Self> {
        let mut base = location.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).with_context(|| format!("Invalid proofs URL: {}", location))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base,
            listing: ListingParser::new().context("Failed to compile listing pattern")?,
        })
    }

    /// Proof ids linked from the directory listing page
    pub async fn list_ids(&self, manifest_name: &str) -> Result<Vec<String>, FetchError> {
        let bytes = self.get(self.base.clone()).await?;
        let markup = String::from_utf8_lossy(&bytes);
        Ok(self.listing.proof_ids(&markup, manifest_name))
    }

    /// Fetch a file inside the proofs directory
    pub async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        let url = self
            .base
            .join(name)
            .map_err(|e| FetchError::Transport(format!("Invalid proof path {}: {}", name, e)))?;
        self.get(url).await
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
