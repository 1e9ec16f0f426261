#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use document_relay::AppState;
use document_relay::config::RelayConfig;
use document_relay::models::{ForwardCredentials, RelayHeaders, RelayRequest, UploadFileRequest};
use document_relay::services::fetcher::FileFetcher;
use document_relay::services::relay::RelayService;
use document_relay::services::store::InMemoryBodyStore;
use document_relay::services::uploader::{DocumentUploader, DownstreamResponse, RelayForm};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

pub const FILE_CONTENT: &[u8] = b"%PDF-1.4 relay test document";

pub struct MockFetcher {
    calls: AtomicUsize,
    failure: Option<String>,
    hang: bool,
    paths: Mutex<Vec<PathBuf>>,
}

impl MockFetcher {
    pub fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failure: None,
            hang: false,
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::ok()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn staged_paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileFetcher for MockFetcher {
    async fn fetch_to(&self, _url: &str, dest: &Path) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(dest.to_path_buf());

        // Partial write before failing, so cleanup has something to remove
        tokio::fs::write(dest, &FILE_CONTENT[..4]).await?;
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(message) = &self.failure {
            return Err(anyhow!("{}", message));
        }
        tokio::fs::write(dest, FILE_CONTENT).await?;
        Ok(FILE_CONTENT.len() as u64)
    }
}

pub enum UploadBehavior {
    Respond(u16, Value),
    Fail(String),
    Hang,
}

#[derive(Debug, Clone)]
pub struct CapturedUpload {
    pub target_url: String,
    pub authorization: String,
    pub subscription_key: String,
    pub fields: Vec<(&'static str, String)>,
    pub file_name: String,
    pub file_bytes: Vec<u8>,
}

pub struct MockUploader {
    calls: AtomicUsize,
    behavior: UploadBehavior,
    captured: Mutex<Vec<CapturedUpload>>,
}

impl MockUploader {
    pub fn new(behavior: UploadBehavior) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            behavior,
            captured: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn captured(&self) -> Vec<CapturedUpload> {
        self.captured.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentUploader for MockUploader {
    async fn send(
        &self,
        target_url: &str,
        credentials: &ForwardCredentials,
        form: RelayForm,
    ) -> Result<DownstreamResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let file_bytes = tokio::fs::read(&form.file_path).await?;
        self.captured.lock().unwrap().push(CapturedUpload {
            target_url: target_url.to_string(),
            authorization: credentials.authorization.clone(),
            subscription_key: credentials.subscription_key.clone(),
            fields: form.fields,
            file_name: form.file_name,
            file_bytes,
        });

        match &self.behavior {
            UploadBehavior::Respond(status, body) => Ok(DownstreamResponse {
                status: *status,
                body: body.clone(),
            }),
            UploadBehavior::Fail(message) => Err(anyhow!("{}", message)),
            UploadBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Relay harness with an isolated staging dir.
pub struct Harness {
    pub fetcher: Arc<MockFetcher>,
    pub uploader: Arc<MockUploader>,
    pub relay: Arc<RelayService>,
    pub config: RelayConfig,
    pub staging: TempDir,
}

impl Harness {
    pub fn new(fetcher: MockFetcher, uploader: MockUploader) -> Self {
        let staging = tempfile::tempdir().unwrap();
        let config = RelayConfig {
            staging_dir: staging.path().to_path_buf(),
            default_target_url: "https://downstream.test/api/v1/upload/".to_string(),
            fetch_timeout: Duration::from_millis(300),
            forward_timeout: Duration::from_millis(300),
            ..RelayConfig::development()
        };

        let fetcher = Arc::new(fetcher);
        let uploader = Arc::new(uploader);
        let relay = Arc::new(RelayService::new(
            fetcher.clone(),
            uploader.clone(),
            config.clone(),
        ));

        Self {
            fetcher,
            uploader,
            relay,
            config,
            staging,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            relay: self.relay.clone(),
            store: Arc::new(InMemoryBodyStore::new()),
            config: self.config.clone(),
        }
    }

    pub fn staging_entries(&self) -> usize {
        std::fs::read_dir(self.staging.path()).unwrap().count()
    }
}

pub fn complete_body() -> UploadFileRequest {
    UploadFileRequest {
        file_url: "https://files.test/dir/report.pdf".to_string(),
        document_type: "CLAIM".to_string(),
        ref_id: "REF-001".to_string(),
        entity_id: "ENT-9".to_string(),
        entity_name: "Acme Insurance".to_string(),
        lob_id: "12".to_string(),
        document_name: None,
        context_id: "CTX-3".to_string(),
        bmp_reff: "BMP-77".to_string(),
    }
}

pub fn credential_headers() -> RelayHeaders {
    RelayHeaders {
        authorization: Some("Bearer token-123".to_string()),
        subscription_key: Some("sub-key-456".to_string()),
        target_url: None,
    }
}

pub fn complete_request() -> RelayRequest {
    RelayRequest {
        body: complete_body(),
        headers: credential_headers(),
    }
}

pub fn complete_json_body() -> Value {
    serde_json::json!({
        "fileUrl": "https://files.test/dir/report.pdf",
        "documentType": "CLAIM",
        "refId": "REF-001",
        "entityId": "ENT-9",
        "entityName": "Acme Insurance",
        "lobId": "12",
        "contextId": "CTX-3",
        "BMPReff": "BMP-77"
    })
}
