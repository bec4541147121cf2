//! Catalog entities and their schemas

pub mod author;
pub mod book;
pub mod genre;
pub mod reader;
pub mod schema;

use serde::de::DeserializeOwned;
use validator::Validate;

pub use author::Author;
pub use book::Book;
pub use genre::Genre;
pub use reader::Reader;
pub use schema::{Column, ColumnKind, FieldValue, Fields, Record, TableSchema};

/// Every table, parents before children
pub static SCHEMAS: &[&TableSchema] = &[
    &author::AUTHORS,
    &genre::GENRES,
    &reader::READERS,
    &book::BOOKS,
];

/// A catalog record type the generic CRUD service can operate on.
///
/// Implementors tie a table descriptor to the payloads accepted on create
/// and update; the payloads carry their presence and format rules through
/// `validator` derives.
pub trait Entity: Send + Sync + 'static {
    /// Body of a POST; every required field is `Option` so that a missing
    /// field is reported as a rule violation rather than a decode failure
    type Create: DeserializeOwned + Validate + Send + 'static;
    /// Body of a PATCH; only supplied fields are written
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn schema() -> &'static TableSchema;

    fn create_fields(payload: Self::Create) -> Fields;

    fn update_fields(payload: Self::Update) -> Fields;
}
