// Local proof source - a directory on this machine

use super::error::FetchError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LocalSource {
    dir: PathBuf,
}

impl LocalSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stems of the `*.json` files in the directory, sorted by name
    pub async fn list_ids(&self, manifest_name: &str) -> Result<Vec<String>, FetchError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            // metadata() follows symlinks, so linked proofs are listed too
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == manifest_name {
                continue;
            }
            if let Some(id) = name.strip_suffix(".json").filter(|id| !id.is_empty()) {
                ids.push(id.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    pub async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        Ok(tokio::fs::read(self.dir.join(name)).await?)
    }
}
