//! Reader endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::JsonBody;
use crate::{
    error::{AppResult, ErrorResponse, ValidationErrorResponse},
    models::reader::{CreateReader, Reader, UpdateReader},
    AppState,
};

/// Register a reader
///
/// The password is stored hashed and is left out of every response.
#[utoipa::path(
    post,
    path = "/readers",
    tag = "readers",
    request_body = CreateReader,
    responses(
        (status = 201, description = "Reader created", body = Reader),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse)
    )
)]
pub async fn create_reader(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<CreateReader>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let reader = state.services.readers.create(data).await?;
    Ok((StatusCode::CREATED, Json(reader)))
}

/// List all readers (without passwords)
#[utoipa::path(
    get,
    path = "/readers",
    tag = "readers",
    responses(
        (status = 200, description = "Reader list", body = Vec<Reader>)
    )
)]
pub async fn list_readers(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let readers = state.services.readers.list_all().await?;
    Ok(Json(readers))
}

/// Get reader by ID
#[utoipa::path(
    get,
    path = "/readers/{id}",
    tag = "readers",
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 200, description = "Reader details", body = Reader),
        (status = 404, description = "Reader not found", body = ErrorResponse)
    )
)]
pub async fn get_reader(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let reader = state.services.readers.get_by_key(&id).await?;
    Ok(Json(reader))
}

/// Update reader
///
/// A supplied password replaces the stored hash.
#[utoipa::path(
    patch,
    path = "/readers/{id}",
    tag = "readers",
    params(("id" = i32, Path, description = "Reader ID")),
    request_body = UpdateReader,
    responses(
        (status = 200, description = "Reader updated", body = Reader),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 404, description = "Reader not found", body = ErrorResponse)
    )
)]
pub async fn update_reader(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(data): JsonBody<UpdateReader>,
) -> AppResult<Json<Value>> {
    let reader = state.services.readers.update(data, &id).await?;
    Ok(Json(reader))
}

/// Delete reader
#[utoipa::path(
    delete,
    path = "/readers/{id}",
    tag = "readers",
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 204, description = "Reader deleted"),
        (status = 404, description = "Reader not found", body = ErrorResponse)
    )
)]
pub async fn delete_reader(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.readers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
