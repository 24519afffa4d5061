// Proof discovery - finds recorded proofs and loads them
//
// A proofs location is either a local directory or a URL of a directory served
// over HTTP. Proofs are listed from the directory listing (or a manifest), each
// one's timestamp is resolved, and ids come back newest first.

mod error;
mod http;
mod listing;
mod local;

pub use error::{DiscoveryError, FetchError, LoadError};

use crate::config::{Config, IndexStrategy};
use crate::proof::ProofDocument;
use crate::util::parse_timestamp;
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use self::http::HttpSource;
use self::listing::{parse_manifest, IndexEntry};
use self::local::LocalSource;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Backend {
    Http(HttpSource),
    Local(LocalSource),
}

/// Where proofs come from, and how they are listed
#[derive(Debug, Clone)]
pub struct ProofSource {
    location: String,
    backend: Backend,
    index: IndexStrategy,
    manifest_name: String,
}

/// Just enough of a proof document to date it
#[derive(Deserialize)]
struct TimestampProbe {
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default)]
    metadata: Option<Value>,
}

impl TimestampProbe {
    /// Top-level `timestamp`, else `metadata.timestamp`; empty strings count as missing
    fn timestamp(&self) -> Option<String> {
        let non_empty = |v: &Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_string);
        self.timestamp.as_ref().and_then(non_empty).or_else(|| {
            self.metadata
                .as_ref()
                .and_then(|m| m.get("timestamp"))
                .and_then(non_empty)
        })
    }
}

impl ProofSource {
    /// `http://` and `https://` locations are fetched over HTTP, anything else is a directory
    pub fn new(
        location: &str,
        index: IndexStrategy,
        manifest_name: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let backend = if location.starts_with("http://") || location.starts_with("https://") {
            Backend::Http(HttpSource::new(location, timeout)?)
        } else {
            Backend::Local(LocalSource::new(location))
        };

        Ok(Self {
            location: location.to_string(),
            backend,
            index,
            manifest_name: manifest_name.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.proofs,
            config.index,
            &config.manifest_name,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// The configured location, for display
    pub fn describe(&self) -> &str {
        &self.location
    }

    /// Proof ids, newest first
    ///
    /// Only reading the index can fail. Proofs whose timestamp can't be
    /// resolved sort last, in index order.
    pub async fn discover(&self) -> Result<Vec<String>, DiscoveryError> {
        let entries = self.read_index().await?;
        if entries.is_empty() {
            tracing::debug!("No proofs listed at {}", self.location);
            return Ok(Vec::new());
        }

        // Resolve every timestamp concurrently
        let timestamps = join_all(entries.iter().map(|entry| self.resolve_timestamp(entry))).await;

        let mut dated: Vec<(String, Option<DateTime<Utc>>)> = entries
            .into_iter()
            .zip(timestamps)
            .map(|(entry, ts)| (entry.id, ts))
            .collect();

        // Stable sort: None < Some, so reversing puts unknown timestamps last
        dated.sort_by(|a, b| b.1.cmp(&a.1));

        tracing::info!("Discovered {} proof(s) at {}", dated.len(), self.location);
        Ok(dated.into_iter().map(|(id, _)| id).collect())
    }

    /// Fetch and decode one proof document
    pub async fn load(&self, id: &str) -> Result<ProofDocument, LoadError> {
        let bytes = self
            .fetch(&document_name(id))
            .await
            .map_err(|source| LoadError::Fetch {
                id: id.to_string(),
                source,
            })?;

        ProofDocument::from_slice(&bytes).map_err(|e| LoadError::Parse {
            id: id.to_string(),
            message: e.to_string(),
        })
    }

    async fn read_index(&self) -> Result<Vec<IndexEntry>, DiscoveryError> {
        match self.index {
            IndexStrategy::Listing => {
                let ids = match &self.backend {
                    Backend::Http(source) => source.list_ids(&self.manifest_name).await,
                    Backend::Local(source) => source.list_ids(&self.manifest_name).await,
                }
                .map_err(|e| DiscoveryError::from_fetch(e, &self.location))?;
                Ok(ids.into_iter().map(IndexEntry::new).collect())
            }
            IndexStrategy::Manifest => {
                let bytes = self.fetch(&self.manifest_name).await.map_err(|e| {
                    DiscoveryError::from_fetch(
                        e,
                        &format!("{}/{}", self.location.trim_end_matches('/'), self.manifest_name),
                    )
                })?;
                parse_manifest(&bytes).map_err(|e| DiscoveryError::Manifest(e.to_string()))
            }
        }
    }

    async fn resolve_timestamp(&self, entry: &IndexEntry) -> Option<DateTime<Utc>> {
        let raw = match &entry.timestamp {
            Some(ts) => Some(ts.clone()),
            None => self.probe_timestamp(&entry.id).await,
        };

        let parsed = raw.as_deref().and_then(parse_timestamp);
        if parsed.is_none() {
            tracing::debug!("Proof {} has no usable timestamp ({:?})", entry.id, raw);
        }
        parsed
    }

    /// Read a proof's timestamp; failures are logged and yield `None`
    async fn probe_timestamp(&self, id: &str) -> Option<String> {
        let bytes = match self.fetch(&document_name(id)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to fetch proof {} for its timestamp: {}", id, e);
                return None;
            }
        };

        match serde_json::from_slice::<TimestampProbe>(&bytes) {
            Ok(probe) => probe.timestamp(),
            Err(e) => {
                tracing::warn!("Failed to read timestamp of proof {}: {}", id, e);
                None
            }
        }
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        match &self.backend {
            Backend::Http(source) => source.fetch(name).await,
            Backend::Local(source) => source.fetch(name).await,
        }
    }
}

fn document_name(id: &str) -> String {
    format!("{}.json", id)
}
