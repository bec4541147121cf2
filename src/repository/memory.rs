//! In-process store
//!
//! Keeps every table in a map behind one async lock, assigning ids the way
//! a serial column would. Constraints mirror the PostgreSQL schema: unique
//! columns, foreign keys to existing rows, and `ON DELETE SET NULL`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::models::{schema::ID_COLUMN, FieldValue, Fields, Record, TableSchema};

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<i32, Record>,
}

pub struct MemoryStore {
    schemas: Vec<&'static TableSchema>,
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemoryStore {
    /// Create an empty store holding the given tables
    pub fn new(schemas: &[&'static TableSchema]) -> Self {
        let tables = schemas.iter().map(|s| (s.table, Table::default())).collect();
        Self {
            schemas: schemas.to_vec(),
            tables: RwLock::new(tables),
        }
    }
}

fn table<'a>(
    tables: &'a HashMap<&'static str, Table>,
    schema: &'static TableSchema,
) -> StoreResult<&'a Table> {
    tables.get(schema.table).ok_or(StoreError::UnknownTable(schema.table))
}

fn table_mut<'a>(
    tables: &'a mut HashMap<&'static str, Table>,
    schema: &'static TableSchema,
) -> StoreResult<&'a mut Table> {
    tables.get_mut(schema.table).ok_or(StoreError::UnknownTable(schema.table))
}

fn has_value(record: &Record, column: &str, value: &Value) -> bool {
    record.get(column) == Some(value)
}

/// Reject writes that break a unique or foreign-key constraint
fn check_constraints(
    tables: &HashMap<&'static str, Table>,
    schema: &'static TableSchema,
    fields: &Fields,
    exclude_id: Option<i32>,
) -> StoreResult<()> {
    let own = table(tables, schema)?;
    for (name, value) in fields.iter() {
        let column = schema.column(name).ok_or_else(|| StoreError::UnknownColumn {
            table: schema.table,
            column: name.to_string(),
        })?;
        if value.is_null() {
            continue;
        }
        let json = value.to_json();

        if column.unique
            && own
                .rows
                .iter()
                .any(|(id, row)| Some(*id) != exclude_id && has_value(row, name, &json))
        {
            return Err(StoreError::UniqueViolation {
                column: name.to_string(),
            });
        }

        if let Some(target) = column.references {
            let present = match value {
                FieldValue::Integer(id) => table(tables, target)?.rows.contains_key(id),
                _ => false,
            };
            if !present {
                return Err(StoreError::ForeignKeyViolation {
                    column: name.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, schema: &'static TableSchema, fields: Fields) -> StoreResult<Record> {
        let mut tables = self.tables.write().await;
        check_constraints(&tables, schema, &fields, None)?;

        let table = table_mut(&mut tables, schema)?;
        table.last_id += 1;
        let id = table.last_id;

        let mut record = Record::new();
        record.insert(ID_COLUMN.to_string(), Value::from(id));
        for column in schema.columns {
            record.insert(column.name.to_string(), Value::Null);
        }
        for (name, value) in fields.iter() {
            record.insert(name.to_string(), value.to_json());
        }

        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find_all(&self, schema: &'static TableSchema) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read().await;
        Ok(table(&tables, schema)?.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, schema: &'static TableSchema, id: i32) -> StoreResult<Option<Record>> {
        let tables = self.tables.read().await;
        Ok(table(&tables, schema)?.rows.get(&id).cloned())
    }

    async fn update(&self, schema: &'static TableSchema, id: i32, fields: Fields) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        if !table(&tables, schema)?.rows.contains_key(&id) {
            return Ok(0);
        }
        check_constraints(&tables, schema, &fields, Some(id))?;

        if let Some(record) = table_mut(&mut tables, schema)?.rows.get_mut(&id) {
            for (name, value) in fields.iter() {
                record.insert(name.to_string(), value.to_json());
            }
        }
        Ok(1)
    }

    async fn delete(&self, schema: &'static TableSchema, id: i32) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        if table_mut(&mut tables, schema)?.rows.remove(&id).is_none() {
            return Ok(0);
        }

        // ON DELETE SET NULL for every child table
        let key = Value::from(id);
        for child in &self.schemas {
            let columns: Vec<_> = child.columns_referencing(schema).map(|c| c.name).collect();
            if columns.is_empty() {
                continue;
            }
            for row in table_mut(&mut tables, *child)?.rows.values_mut() {
                for column in &columns {
                    if has_value(row, column, &key) {
                        row.insert(column.to_string(), Value::Null);
                    }
                }
            }
        }
        Ok(1)
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
        if value.is_null() {
            return Ok(false);
        }
        let json = value.to_json();
        let tables = self.tables.read().await;
        Ok(table(&tables, schema)?
            .rows
            .iter()
            .any(|(id, row)| Some(*id) != exclude_id && has_value(row, column, &json)))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
