//! Repository layer: the store seam behind the CRUD service

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FieldValue, Fields, Record, TableSchema};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{column} must be unique")]
    UniqueViolation { column: String },

    #[error("{column} must reference an existing record")]
    ForeignKeyViolation { column: String },

    #[error("unknown table {0}")]
    UnknownTable(&'static str),

    #[error("unknown column {table}.{column}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Single-table persistence used by the CRUD service.
///
/// Rows are exchanged as [`Record`] maps keyed by column name, always
/// including `id`. Unique and foreign-key constraints declared on the
/// schema are enforced by every implementation.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert one row and return it as stored
    async fn insert(&self, schema: &'static TableSchema, fields: Fields) -> StoreResult<Record>;

    /// All rows ordered by id
    async fn find_all(&self, schema: &'static TableSchema) -> StoreResult<Vec<Record>>;

    async fn find_by_id(&self, schema: &'static TableSchema, id: i32) -> StoreResult<Option<Record>>;

    /// Write the given fields to the row with `id`; returns matched rows (0 or 1)
    async fn update(&self, schema: &'static TableSchema, id: i32, fields: Fields) -> StoreResult<u64>;

    /// Returns deleted rows (0 or 1)
    async fn delete(&self, schema: &'static TableSchema, id: i32) -> StoreResult<u64>;

    /// Whether a row has `column = value`, ignoring the row `exclude_id`
    async fn exists(
        &self,
        schema: &'static TableSchema,
        column: &str,
        value: &FieldValue,
        exclude_id: Option<i32>,
    ) -> StoreResult<bool>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> StoreResult<()>;
}
