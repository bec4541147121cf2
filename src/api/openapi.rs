//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, genres, health, readers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Catalog API",
        version = "0.1.0",
        description = "Readers, books, authors and genres of a library catalog"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Readers
        readers::create_reader,
        readers::list_readers,
        readers::get_reader,
        readers::update_reader,
        readers::delete_reader,
        // Books
        books::create_book,
        books::list_books,
        books::get_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::create_author,
        authors::list_authors,
        authors::get_author,
        authors::update_author,
        authors::delete_author,
        // Genres
        genres::create_genre,
        genres::list_genres,
        genres::get_genre,
        genres::update_genre,
        genres::delete_genre,
    ),
    components(
        schemas(
            crate::models::reader::Reader,
            crate::models::reader::CreateReader,
            crate::models::reader::UpdateReader,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            crate::models::genre::UpdateGenre,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ValidationErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "readers", description = "Library readers"),
        (name = "books", description = "Catalog books"),
        (name = "authors", description = "Book authors"),
        (name = "genres", description = "Book genres")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
