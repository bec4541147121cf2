//! Business logic services

pub mod crud;
pub mod password;
pub mod validation;

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Author, Book, Genre, Reader},
    repository::Store,
};

pub use crud::CrudService;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: CrudService<Author>,
    pub genres: CrudService<Genre>,
    pub readers: CrudService<Reader>,
    pub books: CrudService<Book>,
    store: Arc<dyn Store>,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            authors: CrudService::new(store.clone()),
            genres: CrudService::new(store.clone()),
            readers: CrudService::new(store.clone()),
            books: CrudService::new(store.clone()),
            store,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await?;
        Ok(())
    }
}
