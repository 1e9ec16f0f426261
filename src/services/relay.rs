use crate::config::RelayConfig;
use crate::models::{RelayRequest, RequestRejection, ValidatedRelay};
use crate::services::fetcher::FileFetcher;
use crate::services::staging::StagedFile;
use crate::services::uploader::{DocumentUploader, RelayForm};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

pub const MISSING_FIELDS_MESSAGE: &str = "All fields are required";
pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Authorization and Subscription Key headers are required";

#[derive(Error, Debug)]
pub enum RelayError {
    /// Rejected before any I/O
    #[error("{message}")]
    Validation {
        message: &'static str,
        fields: Vec<String>,
    },

    #[error("Failed to fetch source file: {0:#}")]
    Fetch(anyhow::Error),

    /// Downstream answered with a non-2xx status
    #[error("Downstream responded with status {status}")]
    Upstream { status: u16, body: Value },

    /// Downstream never produced a response
    #[error("{0}")]
    Transport(String),
}

impl RelayError {
    /// Nested diagnostic payload for the failure envelope.
    pub fn details(&self) -> Value {
        match self {
            RelayError::Upstream { status, body } => json!({ "status": status, "data": body }),
            RelayError::Fetch(e) => json!({ "message": format!("{:#}", e) }),
            RelayError::Transport(message) => json!({ "message": message }),
            RelayError::Validation { message, .. } => json!({ "message": message }),
        }
    }
}

impl From<RequestRejection> for RelayError {
    fn from(rejection: RequestRejection) -> Self {
        match rejection {
            RequestRejection::MissingFields(fields) => RelayError::Validation {
                message: MISSING_FIELDS_MESSAGE,
                fields,
            },
            RequestRejection::MissingCredentials => RelayError::Validation {
                message: MISSING_CREDENTIALS_MESSAGE,
                fields: Vec::new(),
            },
        }
    }
}

/// Per-request lifecycle, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStage {
    Validating,
    Fetching,
    Staged,
    Forwarding,
    Succeeded,
    Failed,
    Cleaned,
}

/// Download a remote file, stage it, and re-upload it as multipart form data.
pub struct RelayService {
    fetcher: Arc<dyn FileFetcher>,
    uploader: Arc<dyn DocumentUploader>,
    config: RelayConfig,
}

impl RelayService {
    pub fn new(
        fetcher: Arc<dyn FileFetcher>,
        uploader: Arc<dyn DocumentUploader>,
        config: RelayConfig,
    ) -> Self {
        Self {
            fetcher,
            uploader,
            config,
        }
    }

    /// Target for this request: the override when given, else the configured default.
    pub fn resolve_target<'a>(&'a self, target_override: Option<&'a str>) -> &'a str {
        target_override
            .filter(|t| !t.is_empty())
            .unwrap_or(self.config.default_target_url.as_str())
    }

    /// Runs the full pipeline. On success returns the downstream body verbatim.
    ///
    /// The staging file is removed before this returns, whatever the outcome.
    pub async fn relay(&self, request: RelayRequest) -> Result<Value, RelayError> {
        debug!(stage = ?RelayStage::Validating, "relay started");
        let validated = request.validate_for_relay()?;
        let target = self
            .resolve_target(validated.target_url.as_deref())
            .to_string();

        let staged = StagedFile::allocate(&self.config.staging_dir).map_err(|e| {
            RelayError::Fetch(anyhow::Error::new(e).context("Failed to allocate staging file"))
        })?;

        let outcome = self.fetch_and_forward(&validated, &target, &staged).await;

        match &outcome {
            Ok(_) => {
                debug!(stage = ?RelayStage::Succeeded, "relay finished");
                info!("✅ Relayed {} to {}", validated.document_name, target);
            }
            Err(e) => {
                debug!(stage = ?RelayStage::Failed, "relay finished");
                error!("❌ Error uploading file {}: {}", validated.body.file_url, e);
            }
        }

        staged.cleanup();
        debug!(stage = ?RelayStage::Cleaned, "staging released");
        outcome
    }

    async fn fetch_and_forward(
        &self,
        validated: &ValidatedRelay,
        target: &str,
        staged: &StagedFile,
    ) -> Result<Value, RelayError> {
        debug!(stage = ?RelayStage::Fetching, url = %validated.body.file_url);
        let fetched = tokio::time::timeout(
            self.config.fetch_timeout,
            self.fetcher.fetch_to(&validated.body.file_url, staged.path()),
        )
        .await
        .map_err(|_| {
            RelayError::Fetch(anyhow::anyhow!(
                "Download timed out after {:?}",
                self.config.fetch_timeout
            ))
        })?
        .map_err(RelayError::Fetch)?;
        debug!(stage = ?RelayStage::Staged, bytes = fetched);

        let form = RelayForm {
            fields: validated.form_fields(),
            file_path: staged.path().to_path_buf(),
            file_name: validated.document_name.clone(),
        };

        debug!(stage = ?RelayStage::Forwarding, target = %target);
        let response = tokio::time::timeout(
            self.config.forward_timeout,
            self.uploader.send(target, &validated.credentials, form),
        )
        .await
        .map_err(|_| {
            RelayError::Transport(format!(
                "Upload timed out after {:?}",
                self.config.forward_timeout
            ))
        })?
        .map_err(|e| RelayError::Transport(format!("{:#}", e)))?;

        if response.is_success() {
            Ok(response.body)
        } else {
            Err(RelayError::Upstream {
                status: response.status,
                body: response.body,
            })
        }
    }
}
