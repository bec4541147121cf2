//! API handlers for the catalog REST endpoints

pub mod authors;
pub mod books;
pub mod genres;
pub mod health;
pub mod openapi;
pub mod readers;

use axum::{extract::FromRequest, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// JSON body extractor whose rejections are reported like validation failures
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Readers
        .route("/readers", get(readers::list_readers).post(readers::create_reader))
        .route(
            "/readers/:id",
            get(readers::get_reader)
                .patch(readers::update_reader)
                .delete(readers::delete_reader),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .patch(authors::update_author)
                .delete(authors::delete_author),
        )
        // Genres
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genres/:id",
            get(genres::get_genre)
                .patch(genres::update_genre)
                .delete(genres::delete_genre),
        )
        .with_state(state);

    Router::new()
        .merge(catalog)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
