//! Reader model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{Column, Entity, Fields, TableSchema};

pub static READERS: TableSchema = TableSchema::new(
    "reader",
    "readers",
    &[
        Column::text("name"),
        Column::text("email").unique(),
        Column::text("password").secret(),
    ],
);

/// Reader record as exposed by the API (the password never leaves the store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reader {
    pub id: i32,
    pub name: String,
    /// Email address, unique across readers
    pub email: String,
}

/// Create reader request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReader {
    #[validate(
        required(message = "We need a name so that we can create a reader"),
        length(min = 1, message = "We need a name so that we can create a reader")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "We need an email so that we can create a reader"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
    /// Plain text; stored as an argon2 hash
    #[validate(
        required(message = "We need a password so that we can create a reader"),
        length(min = 8, message = "Password must be at least 8 characters")
    )]
    pub password: Option<String>,
}

/// Update reader request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReader {
    #[validate(length(min = 1, message = "We need a name so that we can create a reader"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

impl Entity for Reader {
    type Create = CreateReader;
    type Update = UpdateReader;

    fn schema() -> &'static TableSchema {
        &READERS
    }

    fn create_fields(payload: CreateReader) -> Fields {
        Fields::new()
            .with("name", payload.name)
            .with("email", payload.email)
            .with("password", payload.password)
    }

    fn update_fields(payload: UpdateReader) -> Fields {
        Fields::new()
            .with_some("name", payload.name)
            .with_some("email", payload.email)
            .with_some("password", payload.password)
    }
}
