use crate::models::ForwardCredentials;
use anyhow::{Context, Result, anyhow};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Multipart payload bound for the downstream API.
#[derive(Debug, Clone)]
pub struct RelayForm {
    /// Text parts, sent in order
    pub fields: Vec<(&'static str, String)>,
    /// Staged content, sent as the `file` part
    pub file_path: PathBuf,
    pub file_name: String,
}

/// Whatever the downstream API answered, success or not.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl DownstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a [`RelayForm`] to a downstream document API.
///
/// `Err` means no HTTP response was obtained at all; any response, including
/// 4xx/5xx, comes back as `Ok`.
#[async_trait::async_trait]
pub trait DocumentUploader: Send + Sync {
    async fn send(
        &self,
        target_url: &str,
        credentials: &ForwardCredentials,
        form: RelayForm,
    ) -> Result<DownstreamResponse>;
}

pub struct HttpDocumentUploader {
    client: reqwest::Client,
    subscription_key_header: String,
}

impl HttpDocumentUploader {
    pub fn new(client: reqwest::Client, subscription_key_header: String) -> Self {
        Self {
            client,
            subscription_key_header,
        }
    }

    async fn file_part(form: &RelayForm) -> Result<Part> {
        let mut file = tokio::fs::File::open(&form.file_path)
            .await
            .context("Failed to open staging file")?;
        let len = file.metadata().await?.len();

        // Sniff the content type from the leading bytes, then rewind
        let mut header = [0u8; 1024];
        let n = file.read(&mut header).await?;
        let mime_type = infer::get(&header[..n])
            .map(|t| t.mime_type().to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
        file.rewind().await?;

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        Part::stream_with_length(body, len)
            .file_name(form.file_name.clone())
            .mime_str(&mime_type)
            .map_err(|e| anyhow!("Invalid content type {}: {}", mime_type, e))
    }
}

#[async_trait::async_trait]
impl DocumentUploader for HttpDocumentUploader {
    async fn send(
        &self,
        target_url: &str,
        credentials: &ForwardCredentials,
        form: RelayForm,
    ) -> Result<DownstreamResponse> {
        let file_part = Self::file_part(&form).await?;

        let mut multipart = Form::new();
        for (name, value) in form.fields {
            multipart = multipart.text(name, value);
        }
        let multipart = multipart.part("file", file_part);

        let response = self
            .client
            .post(target_url)
            .header(reqwest::header::AUTHORIZATION, &credentials.authorization)
            .header(
                self.subscription_key_header.as_str(),
                &credentials.subscription_key,
            )
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| anyhow!("Request to {} failed: {}", target_url, e))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow!("Failed to read downstream response: {}", e))?;

        Ok(DownstreamResponse {
            status,
            body: parse_body(&bytes),
        })
    }
}

/// JSON if it parses, otherwise the raw text as a JSON string.
pub fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
