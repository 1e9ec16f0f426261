use crate::AppState;
use crate::api::error::AppError;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use serde_json::value::RawValue;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct StoreResponse {
    pub message: String,
    pub id: String,
}

#[derive(Serialize, ToSchema)]
pub struct RetrieveResponse {
    pub id: String,
    /// The stored body, byte-for-byte
    #[schema(value_type = Object)]
    pub data: Box<RawValue>,
}

#[utoipa::path(
    post,
    path = "/store",
    request_body(content = Object, description = "Any JSON value", content_type = "application/json"),
    responses(
        (status = 200, description = "Body stored", body = StoreResponse),
        (status = 400, description = "Body is not valid JSON")
    ),
    tag = "store"
)]
pub async fn store_body(
    State(state): State<AppState>,
    payload: Result<Json<Box<RawValue>>, JsonRejection>,
) -> Result<Json<StoreResponse>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let id = state.store.put(body);
    tracing::debug!("Stored body under {}", id);

    Ok(Json(StoreResponse {
        message: "Body stored successfully!".to_string(),
        id,
    }))
}

#[utoipa::path(
    get,
    path = "/retrieve/{id}",
    params(
        ("id" = String, Path, description = "Id returned by /store")
    ),
    responses(
        (status = 200, description = "Stored body", body = RetrieveResponse),
        (status = 404, description = "Unknown id")
    ),
    tag = "store"
)]
pub async fn retrieve_body(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RetrieveResponse>, AppError> {
    let data = state
        .store
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Content not found for the given ID.".to_string()))?;

    Ok(Json(RetrieveResponse { id, data }))
}
