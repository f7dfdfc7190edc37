//! Configuration for todo storage backends

use crate::storage::{memory_store::MemoryTodoStore, postgres_store::PostgresTodoStore};
use crate::storage::{StoreResult, TodoStore};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Available todo storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Postgres => write!(f, "postgres"),
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Server host, optionally with `:port`
    pub host: String,
    /// libpq-style sslmode
    pub ssl_mode: String,
    /// Database name
    pub name: String,
    /// Maximum pooled connections
    pub pool_size: u32,
    /// Seconds to wait for a pooled connection. Kept at or below the warmup
    /// retry interval so an unreachable server fails each attempt quickly.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: String::new(),
            host: String::new(),
            ssl_mode: "require".to_string(),
            name: "mydb".to_string(),
            pool_size: 10,
            acquire_timeout_secs: 1,
        }
    }
}

impl DatabaseConfig {
    /// Assemble the `postgresql://` URL handed to the pool
    pub fn connection_string(&self) -> String {
        self.format_url(&urlencoding::encode(&self.password))
    }

    /// Connection string with the password masked, for logs
    pub fn redacted_connection_string(&self) -> String {
        if self.password.is_empty() {
            self.format_url("")
        } else {
            self.format_url("****")
        }
    }

    fn format_url(&self, password: &str) -> String {
        format!(
            "postgresql://{}:{}@{}/{}?sslmode={}",
            urlencoding::encode(&self.user),
            password,
            self.host,
            self.name,
            self.ssl_mode
        )
    }
}

/// Which backend a given database setting selects
pub fn backend_for(database: Option<&DatabaseConfig>) -> StorageBackend {
    match database {
        Some(_) => StorageBackend::Postgres,
        None => StorageBackend::Memory,
    }
}

/// Create the storage instance selected by the configuration.
///
/// A configured database host selects PostgreSQL; otherwise todos live in memory.
pub fn create_store(database: Option<&DatabaseConfig>) -> StoreResult<Arc<dyn TodoStore>> {
    match database {
        Some(db) => {
            info!("Creating PostgreSQL todo store");
            Ok(Arc::new(PostgresTodoStore::connect_lazy(db)?))
        }
        None => {
            info!("Creating in-memory todo store");
            Ok(Arc::new(MemoryTodoStore::new()))
        }
    }
}
