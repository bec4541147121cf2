//! Author model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{Column, Entity, Fields, TableSchema};

pub static AUTHORS: TableSchema =
    TableSchema::new("author", "authors", &[Column::text("author").unique()]);

/// Author record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: i32,
    /// Author name, unique across the catalog
    pub author: String,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(
        required(message = "We need an author in so that we can create one"),
        length(min = 1, message = "We need an author in so that we can create one")
    )]
    pub author: Option<String>,
}

/// Update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, message = "We need an author in so that we can create one"))]
    pub author: Option<String>,
}

impl Entity for Author {
    type Create = CreateAuthor;
    type Update = UpdateAuthor;

    fn schema() -> &'static TableSchema {
        &AUTHORS
    }

    fn create_fields(payload: CreateAuthor) -> Fields {
        Fields::new().with("author", payload.author)
    }

    fn update_fields(payload: UpdateAuthor) -> Fields {
        Fields::new().with_some("author", payload.author)
    }
}
