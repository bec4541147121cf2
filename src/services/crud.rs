//! Generic CRUD service shared by every catalog resource
//!
//! One [`CrudService`] per entity performs create, list, get, update and
//! delete against a single table. Rule violations are collected in full
//! before anything is written, lookups by an unknown id report the
//! entity's fixed not-found message, and every record leaving the service
//! goes through [`redact`].

use std::{marker::PhantomData, sync::Arc};

use serde_json::Value;
use validator::Validate;

use super::{password, validation};
use crate::{
    error::{AppError, AppResult},
    models::{Entity, FieldValue, Fields, Record, TableSchema},
    repository::{Store, StoreError},
};

/// Field removed from every outbound record
pub const SENSITIVE_FIELD: &str = "password";

/// Strip sensitive fields from a record about to leave the service
pub fn redact(mut record: Record) -> Value {
    record.remove(SENSITIVE_FIELD);
    Value::Object(record)
}

pub struct CrudService<E: Entity> {
    store: Arc<dyn Store>,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for CrudService<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            entity: PhantomData,
        }
    }
}

impl<E: Entity> CrudService<E> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            entity: PhantomData,
        }
    }

    fn schema() -> &'static TableSchema {
        E::schema()
    }

    fn not_found() -> AppError {
        AppError::NotFound(Self::schema().entity)
    }

    /// Ids arrive as raw path segments; anything that is not an id matches nothing
    fn parse_key(key: &str) -> AppResult<i32> {
        key.trim().parse().map_err(|_| Self::not_found())
    }

    /// Validate and persist a new record
    pub async fn create(&self, payload: E::Create) -> AppResult<Value> {
        let schema = Self::schema();
        let mut errors = validation::rule_messages(payload.validate());
        let mut fields = E::create_fields(payload);
        errors.extend(self.constraint_messages(&fields, None).await?);
        if !errors.is_empty() {
            tracing::debug!(entity = schema.entity, ?errors, "create rejected");
            return Err(AppError::Validation(errors));
        }

        hash_secrets(schema, &mut fields)?;
        let record = self.store.insert(schema, fields).await.map_err(|e| match e {
            // lost a race with a concurrent writer after the checks above
            StoreError::UniqueViolation { .. } | StoreError::ForeignKeyViolation { .. } => {
                AppError::Validation(vec![e.to_string()])
            }
            other => AppError::Store(other),
        })?;

        tracing::debug!(entity = schema.entity, id = ?record.get("id"), "created");
        Ok(redact(record))
    }

    /// Every record of the entity, ordered by id
    pub async fn list_all(&self) -> AppResult<Vec<Value>> {
        let records = self.store.find_all(Self::schema()).await?;
        Ok(records.into_iter().map(redact).collect())
    }

    pub async fn get_by_key(&self, key: &str) -> AppResult<Value> {
        let id = Self::parse_key(key)?;
        self.store
            .find_by_id(Self::schema(), id)
            .await?
            .map(redact)
            .ok_or_else(Self::not_found)
    }

    /// Apply the supplied fields to one record and return it re-read
    pub async fn update(&self, payload: E::Update, key: &str) -> AppResult<Value> {
        let schema = Self::schema();
        let id = Self::parse_key(key)?;
        if self.store.find_by_id(schema, id).await?.is_none() {
            return Err(Self::not_found());
        }

        let mut errors = validation::rule_messages(payload.validate());
        let mut fields = E::update_fields(payload);
        errors.extend(self.constraint_messages(&fields, Some(id)).await?);
        if !errors.is_empty() {
            tracing::debug!(entity = schema.entity, id, ?errors, "update rejected");
            return Err(AppError::Validation(errors));
        }

        hash_secrets(schema, &mut fields)?;
        let updated = self.store.update(schema, id, fields).await?;
        if updated == 0 {
            return Err(Self::not_found());
        }

        tracing::debug!(entity = schema.entity, id, "updated");
        self.store
            .find_by_id(schema, id)
            .await?
            .map(redact)
            .ok_or_else(Self::not_found)
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let schema = Self::schema();
        let id = Self::parse_key(key)?;
        if self.store.delete(schema, id).await? == 0 {
            return Err(Self::not_found());
        }
        tracing::debug!(entity = schema.entity, id, "deleted");
        Ok(())
    }

    /// Uniqueness and reference rules, which need the store to evaluate
    async fn constraint_messages(
        &self,
        fields: &Fields,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<String>> {
        let schema = Self::schema();
        let mut messages = Vec::new();

        for (name, value) in fields.iter() {
            let Some(column) = schema.column(name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            if column.unique && self.store.exists(schema, name, value, exclude_id).await? {
                messages.push(format!("{} must be unique", name));
            }
            if let Some(target) = column.references {
                let found = match value {
                    FieldValue::Integer(_) => self.store.exists(target, "id", value, None).await?,
                    _ => false,
                };
                if !found {
                    messages.push(format!("{} must reference an existing {}", name, target.entity));
                }
            }
        }
        Ok(messages)
    }
}

fn hash_secrets(schema: &TableSchema, fields: &mut Fields) -> AppResult<()> {
    for (name, value) in fields.iter_mut() {
        if !schema.column(name).map(|c| c.secret).unwrap_or(false) {
            continue;
        }
        if let FieldValue::Text(plain) = value {
            let hashed = password::hash_password(plain)?;
            *value = FieldValue::Text(hashed);
        }
    }
    Ok(())
}
