//! Genre model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{Column, Entity, Fields, TableSchema};

pub static GENRES: TableSchema =
    TableSchema::new("genre", "genres", &[Column::text("genre").unique()]);

/// Genre record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub genre: String,
}

/// Create genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGenre {
    #[validate(
        required(message = "We need a genre in so that we can create one"),
        length(min = 1, message = "We need a genre in so that we can create one")
    )]
    pub genre: Option<String>,
}

/// Update genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGenre {
    #[validate(length(min = 1, message = "We need a genre in so that we can create one"))]
    pub genre: Option<String>,
}

impl Entity for Genre {
    type Create = CreateGenre;
    type Update = UpdateGenre;

    fn schema() -> &'static TableSchema {
        &GENRES
    }

    fn create_fields(payload: CreateGenre) -> Fields {
        Fields::new().with("genre", payload.genre)
    }

    fn update_fields(payload: UpdateGenre) -> Fields {
        Fields::new().with_some("genre", payload.genre)
    }
}
