//! Genre endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::JsonBody;
use crate::{
    error::{AppResult, ErrorResponse, ValidationErrorResponse},
    models::genre::{CreateGenre, Genre, UpdateGenre},
    AppState,
};

/// Create a genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    request_body = CreateGenre,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse)
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<CreateGenre>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let genre = state.services.genres.create(data).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// List all genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "Genre list", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let genres = state.services.genres.list_all().await?;
    Ok(Json(genres))
}

/// Get genre
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre details", body = Genre),
        (status = 404, description = "Genre not found", body = ErrorResponse)
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let genre = state.services.genres.get_by_key(&id).await?;
    Ok(Json(genre))
}

/// Update genre
#[utoipa::path(
    patch,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = UpdateGenre,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 404, description = "Genre not found", body = ErrorResponse)
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(data): JsonBody<UpdateGenre>,
) -> AppResult<Json<Value>> {
    let genre = state.services.genres.update(data, &id).await?;
    Ok(Json(genre))
}

/// Delete genre
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found", body = ErrorResponse)
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.genres.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
