use anyhow::{Context, Result, anyhow};
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Retrieves a remote file into a local path.
#[async_trait::async_trait]
pub trait FileFetcher: Send + Sync {
    /// Downloads `url` into `dest`, truncating it first. Returns bytes written.
    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Streaming GET over reqwest.
pub struct HttpFileFetcher {
    client: reqwest::Client,
}

impl HttpFileFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl FileFetcher for HttpFileFetcher {
    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request to {} failed: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "Request failed with status code {}",
                status.as_u16()
            ));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(dest)
            .await
            .with_context(|| format!("Failed to open staging file {}", dest.display()))?;

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| anyhow!("Download stream error: {}", e))?;
            file.write_all(&chunk)
                .await
                .context("Failed to write staging file")?;
            written += chunk.len() as u64;
        }
        file.flush().await.context("Failed to flush staging file")?;

        tracing::debug!("Fetched {} bytes from {}", written, url);
        Ok(written)
    }
}
