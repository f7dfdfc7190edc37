//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.

use std::sync::Arc;
use log::info;

use crate::config::AppConfig;
use crate::service::{TodoService, WarmupStatus, WarmupWorker};
use crate::storage::config::create_store;
use crate::storage::memory_store::MemoryTodoStore;
use crate::storage::{StoreResult, TodoStore};

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub todo_service: Arc<TodoService>,
    pub warmup_status: Arc<WarmupStatus>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> StoreResult<Self> {
        info!(
            "Initializing application state with {} backend",
            config.storage_backend()
        );
        let store = create_store(config.database.as_ref())?;
        Ok(Self::with_store(store, config))
    }

    /// Create application state around an already built store
    pub fn with_store(store: Arc<dyn TodoStore>, config: AppConfig) -> Self {
        let todo_service = Arc::new(TodoService::new(store, config.presentation.clone()));
        Self {
            todo_service,
            warmup_status: Arc::new(WarmupStatus::new()),
            config,
        }
    }

    /// Create application state for testing with an empty in-memory backend
    pub fn new_for_testing() -> Self {
        Self::with_store(Arc::new(MemoryTodoStore::new()), AppConfig::default())
    }

    /// Warmup worker bound to this state's store and status
    pub fn warmup_worker(&self) -> WarmupWorker {
        WarmupWorker::new(
            self.todo_service.store(),
            &self.config.warmup,
            Arc::clone(&self.warmup_status),
        )
    }
}
