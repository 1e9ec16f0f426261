use crate::utils::validation::{collect_fields, lenient_optional_string, lenient_string};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const SUBSCRIPTION_KEY_HEADER: &str = "subscription-key";
pub const TARGET_URL_HEADER: &str = "target-url";

/// JSON body of `POST /upload-file`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "fileUrl"))]
    pub file_url: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "documentType"))]
    pub document_type: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "refId"))]
    pub ref_id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "entityId"))]
    pub entity_id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "entityName"))]
    pub entity_name: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "lobId"))]
    pub lob_id: String,

    /// Derived from the last path segment of `fileUrl` when omitted
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub document_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "contextId"))]
    pub context_id: String,

    #[serde(rename = "BMPReff", default, deserialize_with = "lenient_string")]
    #[validate(length(min = 1, message = "BMPReff"))]
    pub bmp_reff: String,
}

#[derive(Serialize, ToSchema)]
pub struct UploadFileResponse {
    pub message: String,
    /// Downstream response body, verbatim
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Relay-relevant inbound headers. Empty values are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct RelayHeaders {
    pub authorization: Option<String>,
    pub subscription_key: Option<String>,
    pub target_url: Option<String>,
}

impl RelayHeaders {
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };

        Self {
            authorization: read(AUTHORIZATION_HEADER),
            subscription_key: read(SUBSCRIPTION_KEY_HEADER),
            target_url: read(TARGET_URL_HEADER),
        }
    }
}

/// Credentials passed through to the downstream API untouched.
#[derive(Debug, Clone)]
pub struct ForwardCredentials {
    pub authorization: String,
    pub subscription_key: String,
}

/// A relay request as received: body plus headers, not yet validated.
#[derive(Debug, Clone, Default)]
pub struct RelayRequest {
    pub body: UploadFileRequest,
    pub headers: RelayHeaders,
}

/// Why a [`RelayRequest`] was rejected before any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestRejection {
    MissingFields(Vec<String>),
    MissingCredentials,
}

/// Output of [`RelayRequest::validate_for_relay`].
#[derive(Debug, Clone)]
pub struct ValidatedRelay {
    pub body: UploadFileRequest,
    pub document_name: String,
    pub credentials: ForwardCredentials,
    pub target_url: Option<String>,
}

impl ValidatedRelay {
    /// Text parts of the downstream form, in wire order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let b = &self.body;
        vec![
            ("documentType", b.document_type.clone()),
            ("refId", b.ref_id.clone()),
            ("entityId", b.entity_id.clone()),
            ("entityName", b.entity_name.clone()),
            ("lobId", b.lob_id.clone()),
            ("documentName", self.document_name.clone()),
            ("contextId", b.context_id.clone()),
            ("BMPReff", b.bmp_reff.clone()),
        ]
    }
}

impl RelayRequest {
    /// Body fields are checked first, then credentials.
    pub fn validate_for_relay(self) -> Result<ValidatedRelay, RequestRejection> {
        if let Err(errors) = self.body.validate() {
            return Err(RequestRejection::MissingFields(collect_fields(&errors)));
        }

        let (Some(authorization), Some(subscription_key)) =
            (self.headers.authorization, self.headers.subscription_key)
        else {
            return Err(RequestRejection::MissingCredentials);
        };

        let document_name = self
            .body
            .document_name
            .clone()
            .unwrap_or_else(|| document_name_from_url(&self.body.file_url));

        Ok(ValidatedRelay {
            body: self.body,
            document_name,
            credentials: ForwardCredentials {
                authorization,
                subscription_key,
            },
            target_url: self.headers.target_url,
        })
    }
}

/// Final path component of a URL: everything after the last `/`, ignoring
/// trailing slashes.
pub fn document_name_from_url(file_url: &str) -> String {
    let trimmed = file_url.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => trimmed[idx + 1..].to_string(),
        None => trimmed.to_string(),
    }
}
