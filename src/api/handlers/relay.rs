use crate::AppState;
use crate::api::error::AppError;
use crate::models::{RelayHeaders, RelayRequest, UploadFileRequest, UploadFileResponse};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

#[utoipa::path(
    post,
    path = "/upload-file",
    request_body = UploadFileRequest,
    params(
        ("authorization" = String, Header, description = "Forwarded verbatim to the downstream API"),
        ("subscription-key" = String, Header, description = "Forwarded as the downstream subscription key"),
        ("target-url" = Option<String>, Header, description = "Overrides the default downstream endpoint"),
    ),
    responses(
        (status = 200, description = "File relayed successfully", body = UploadFileResponse),
        (status = 400, description = "Missing field or credential header"),
        (status = 500, description = "Fetch or downstream upload failed")
    ),
    tag = "relay"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UploadFileRequest>, JsonRejection>,
) -> Result<Json<UploadFileResponse>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let request = RelayRequest {
        body,
        headers: RelayHeaders::from_header_map(&headers),
    };

    let data = state.relay.relay(request).await?;

    Ok(Json(UploadFileResponse {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        data,
    }))
}
