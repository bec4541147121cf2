//! Declarative table descriptors shared by every entity
//!
//! A [`TableSchema`] names the table, the entity (used in messages), and the
//! writable columns with their storage kind and write-time constraints. The
//! implicit `id` primary key is never listed.

use serde_json::{Map, Value};

/// Name of the generated primary key column
pub const ID_COLUMN: &str = "id";

/// A stored row as it comes out of a store, keyed by column name
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub unique: bool,
    /// Hashed before it reaches the store
    pub secret: bool,
    /// Target table of a foreign key on its `id`
    pub references: Option<&'static TableSchema>,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            unique: false,
            secret: false,
            references: None,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn secret(self) -> Self {
        Self {
            secret: true,
            ..self
        }
    }

    pub const fn references(self, table: &'static TableSchema) -> Self {
        Self {
            references: Some(table),
            ..self
        }
    }
}

#[derive(Debug)]
pub struct TableSchema {
    /// Singular lowercase name, e.g. "author"
    pub entity: &'static str,
    pub table: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub const fn new(
        entity: &'static str,
        table: &'static str,
        columns: &'static [Column],
    ) -> Self {
        Self {
            entity,
            table,
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True for `id` and every declared column
    pub fn has_column(&self, name: &str) -> bool {
        name == ID_COLUMN || self.column(name).is_some()
    }

    /// Columns of `self` holding a foreign key to `target`
    pub fn columns_referencing(&self, target: &TableSchema) -> impl Iterator<Item = &'static Column> + '_ {
        let target = target.table;
        self.columns
            .iter()
            .filter(move |c| c.references.map(|t| t.table) == Some(target))
    }
}

/// A single value headed for the store
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i32),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::Null => Value::Null,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Column/value pairs for one insert or update, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(&'static str, FieldValue)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always sets the column; `None` becomes NULL
    pub fn with(mut self, column: &'static str, value: impl Into<FieldValue>) -> Self {
        self.0.push((column, value.into()));
        self
    }

    /// Sets the column only when a value was supplied
    pub fn with_some<T: Into<FieldValue>>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with(column, value),
            None => self,
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(name, _)| *name == column).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (*name, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut FieldValue)> {
        self.0.iter_mut().map(|(name, value)| (*name, value))
    }
}
