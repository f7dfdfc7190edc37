//! Todo Storage Layer Abstraction
//!
//! This module provides an abstraction over todo storage backends,
//! allowing the server to keep its list in process memory or in a
//! PostgreSQL table without affecting the handlers above it.

pub mod memory_store;
pub mod postgres_store;
pub mod config;


use actix_web::{HttpResponse, ResponseError};
use actix_web::http::StatusCode;
use async_trait::async_trait;
use thiserror::Error;

pub use config::StorageBackend;

/// Errors raised by a todo storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or could not run a statement
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The in-memory list lock was poisoned by a panicking writer
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

/// A single todo entry. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem(String);

impl TodoItem {
    /// Wrap submitted content, returning `None` for an empty submission
    pub fn new(content: &str) -> Option<Self> {
        if content.is_empty() {
            None
        } else {
            Some(Self(content.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Case-insensitive identity used when deleting todos.
///
/// Both backends follow this rule: the Postgres store compares with
/// `LOWER()` on both sides. Rust's Unicode `to_lowercase` and Postgres
/// `LOWER()` (which follows the database collation) agree on ASCII but may
/// differ for some non-ASCII text.
pub fn same_item(stored: &str, requested: &str) -> bool {
    stored.to_lowercase() == requested.to_lowercase()
}

/// Trait defining the todo storage interface
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Prepare the backend for use. Safe to call repeatedly.
    async fn init(&self) -> StoreResult<()>;

    /// All stored todos in insertion order
    async fn list_items(&self) -> StoreResult<Vec<String>>;

    /// Append a todo to the end of the list
    async fn create_item(&self, item: &TodoItem) -> StoreResult<()>;

    /// Remove every todo matching `item` and return how many were removed.
    /// Removing nothing is not an error.
    async fn delete_item(&self, item: &str) -> StoreResult<u64>;

    /// Report whether the backend is reachable
    async fn healthcheck(&self) -> StoreResult<()>;

    /// Which backend this store is
    fn backend(&self) -> StorageBackend;
}
