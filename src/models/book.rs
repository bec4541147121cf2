//! Book model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{author::AUTHORS, genre::GENRES, reader::READERS, Column, Entity, Fields, TableSchema};

pub static BOOKS: TableSchema = TableSchema::new(
    "book",
    "books",
    &[
        Column::text("title"),
        Column::text("ISBN").nullable(),
        Column::integer("author_id").nullable().references(&AUTHORS),
        Column::integer("genre_id").nullable().references(&GENRES),
        Column::integer("reader_id").nullable().references(&READERS),
    ],
);

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    /// Author this book belongs to
    pub author_id: Option<i32>,
    /// Genre this book belongs to
    pub genre_id: Option<i32>,
    /// Reader currently holding the book
    pub reader_id: Option<i32>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(
        required(message = "We need a title so that we can create a book"),
        length(min = 1, message = "We need a title so that we can create a book")
    )]
    pub title: Option<String>,
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    pub author_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub reader_id: Option<i32>,
}

/// Update book request; `null` clears a nullable field
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "We need a title so that we can create a book"))]
    pub title: Option<String>,
    #[serde(rename = "ISBN", default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub isbn: Option<Option<String>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub author_id: Option<Option<i32>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub genre_id: Option<Option<i32>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub reader_id: Option<Option<i32>>,
}

impl Entity for Book {
    type Create = CreateBook;
    type Update = UpdateBook;

    fn schema() -> &'static TableSchema {
        &BOOKS
    }

    fn create_fields(payload: CreateBook) -> Fields {
        Fields::new()
            .with("title", payload.title)
            .with("ISBN", payload.isbn)
            .with("author_id", payload.author_id)
            .with("genre_id", payload.genre_id)
            .with("reader_id", payload.reader_id)
    }

    fn update_fields(payload: UpdateBook) -> Fields {
        Fields::new()
            .with_some("title", payload.title)
            .with_some("ISBN", payload.isbn)
            .with_some("author_id", payload.author_id)
            .with_some("genre_id", payload.genre_id)
            .with_some("reader_id", payload.reader_id)
    }
}
