//! PostgreSQL store
//!
//! Statements are assembled from the static table descriptors; identifiers
//! are always quoted and values always bound.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    postgres::{PgArguments, PgPoolOptions, PgRow},
    query::Query,
    PgPool, Postgres, Row,
};

use super::{Store, StoreError, StoreResult};
use crate::{
    config::DatabaseConfig,
    models::{schema::ID_COLUMN, Column, ColumnKind, FieldValue, Fields, Record, TableSchema},
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool sized from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create missing tables in order; existing tables are left as they are
    pub async fn sync_schema(&self, schemas: &[&'static TableSchema]) -> StoreResult<()> {
        for schema in schemas {
            let sql = create_table_sql(schema);
            tracing::debug!(sql = %sql, "sync table");
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn unique_constraint(schema: &TableSchema, column: &Column) -> String {
    format!("{}_{}_key", schema.table, column.name)
}

fn foreign_key_constraint(schema: &TableSchema, column: &Column) -> String {
    format!("{}_{}_fkey", schema.table, column.name)
}

fn select_list(schema: &TableSchema) -> String {
    std::iter::once(ID_COLUMN)
        .chain(schema.columns.iter().map(|c| c.name))
        .map(quote)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn create_table_sql(schema: &TableSchema) -> String {
    let mut parts = vec![format!("{} SERIAL PRIMARY KEY", quote(ID_COLUMN))];

    for column in schema.columns {
        let kind = match column.kind {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
        };
        let not_null = if column.nullable { "" } else { " NOT NULL" };
        parts.push(format!("{} {}{}", quote(column.name), kind, not_null));
    }

    for column in schema.columns {
        if column.unique {
            parts.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                quote(&unique_constraint(schema, column)),
                quote(column.name)
            ));
        }
        if let Some(target) = column.references {
            parts.push(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE SET NULL",
                quote(&foreign_key_constraint(schema, column)),
                quote(column.name),
                quote(target.table),
                quote(ID_COLUMN)
            ));
        }
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(schema.table),
        parts.join(", ")
    )
}

/// Resolve every field to its declared column
fn columns_for(
    schema: &'static TableSchema,
    fields: &Fields,
) -> StoreResult<Vec<&'static Column>> {
    fields
        .iter()
        .map(|(name, _)| {
            schema.column(name).ok_or_else(|| StoreError::UnknownColumn {
                table: schema.table,
                column: name.to_string(),
            })
        })
        .collect()
}

pub(crate) fn insert_sql(schema: &TableSchema, columns: &[&Column]) -> String {
    if columns.is_empty() {
        return format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quote(schema.table),
            select_list(schema)
        );
    }
    let names: Vec<_> = columns.iter().map(|c| quote(c.name)).collect();
    let params: Vec<_> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quote(schema.table),
        names.join(", "),
        params.join(", "),
        select_list(schema)
    )
}

/// The id is bound after the fields, as the last parameter
pub(crate) fn update_sql(schema: &TableSchema, columns: &[&Column]) -> String {
    let sets: Vec<_> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", quote(c.name), i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        quote(schema.table),
        sets.join(", "),
        quote(ID_COLUMN),
        columns.len() + 1
    )
}

fn bind_value<'q>(query: PgQuery<'q>, column: &Column, value: &'q FieldValue) -> PgQuery<'q> {
    match value {
        FieldValue::Text(s) => query.bind(s.as_str()),
        FieldValue::Integer(n) => query.bind(*n),
        FieldValue::Null => match column.kind {
            ColumnKind::Text => query.bind(None::<String>),
            ColumnKind::Integer => query.bind(None::<i32>),
        },
    }
}

fn bind_fields<'q>(mut query: PgQuery<'q>, columns: &[&Column], fields: &'q Fields) -> PgQuery<'q> {
    for (column, (_, value)) in columns.iter().zip(fields.iter()) {
        query = bind_value(query, column, value);
    }
    query
}

fn decode_row(schema: &TableSchema, row: &PgRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    record.insert(ID_COLUMN.to_string(), Value::from(row.try_get::<i32, _>(ID_COLUMN)?));
    for column in schema.columns {
        let value = match column.kind {
            ColumnKind::Text => row
                .try_get::<Option<String>, _>(column.name)?
                .map(Value::from)
                .unwrap_or(Value::Null),
            ColumnKind::Integer => row
                .try_get::<Option<i32>, _>(column.name)?
                .map(Value::from)
                .unwrap_or(Value::Null),
        };
        record.insert(column.name.to_string(), value);
    }
    Ok(record)
}

/// Translate constraint violations on known constraints into typed errors
fn map_error(schema: &TableSchema, error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = error {
        let constraint = db.constraint().unwrap_or_default();
        let column_for = |name_of: fn(&TableSchema, &Column) -> String| {
            schema
                .columns
                .iter()
                .find(|c| name_of(schema, c) == constraint)
                .map(|c| c.name.to_string())
        };
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                if let Some(column) = column_for(unique_constraint) {
                    return StoreError::UniqueViolation { column };
                }
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                if let Some(column) = column_for(foreign_key_constraint) {
                    return StoreError::ForeignKeyViolation { column };
                }
            }
            _ => {}
        }
    }
    StoreError::Database(error)
}

#[async_trait]
impl Store for PgStore {
    async fn insert(&self, schema: &'static TableSchema, fields: Fields) -> StoreResult<Record> {
        let columns = columns_for(schema, &fields)?;
        let sql = insert_sql(schema, &columns);
        tracing::debug!(sql = %sql, "insert");

        let row = bind_fields(sqlx::query(&sql), &columns, &fields)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_error(schema, e))?;
        Ok(decode_row(schema, &row)?)
    }

    async fn find_all(&self, schema: &'static TableSchema) -> StoreResult<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            select_list(schema),
            quote(schema.table),
            quote(ID_COLUMN)
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(|row| decode_row(schema, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn find_by_id(&self, schema: &'static TableSchema, id: i32) -> StoreResult<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            select_list(schema),
            quote(schema.table),
            quote(ID_COLUMN)
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(decode_row(schema, &row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, schema: &'static TableSchema, id: i32, fields: Fields) -> StoreResult<u64> {
        if fields.is_empty() {
            return Ok(self.find_by_id(schema, id).await?.map_or(0, |_| 1));
        }
        let columns = columns_for(schema, &fields)?;
        let sql = update_sql(schema, &columns);
        tracing::debug!(sql = %sql, id, "update");

        let result = bind_fields(sqlx::query(&sql), &columns, &fields)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_error(schema, e))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, schema: &'static TableSchema, id: i32) -> StoreResult<u64> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            quote(schema.table),
            quote(ID_COLUMN)
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn exists(
        &self,
        schema: &'static TableSchema,
        column: &str,
        value: &FieldValue,
        exclude_id: Option<i32>,
    ) -> StoreResult<bool> {
        if !schema.has_column(column) {
            return Err(StoreError::UnknownColumn {
                table: schema.table,
                column: column.to_string(),
            });
        }
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE {column} = $1 AND ($2::INTEGER IS NULL OR {id} <> $2))",
            table = quote(schema.table),
            column = quote(column),
            id = quote(ID_COLUMN)
        );
        let query = sqlx::query_scalar::<_, bool>(&sql);
        let query = match value {
            FieldValue::Text(s) => query.bind(s.as_str()),
            FieldValue::Integer(n) => query.bind(*n),
            FieldValue::Null => return Ok(false),
        };
        Ok(query.bind(exclude_id).fetch_one(&self.pool).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
