//! Todo service layer that provides a clean interface to the storage abstraction

use crate::config::PresentationConfig;
use crate::storage::{StoreResult, TodoItem, TodoStore};
use log::debug;
use std::sync::Arc;

/// Everything the todo page needs to render
#[derive(Debug, Clone, PartialEq)]
pub struct TodoPage {
    pub todos: Vec<String>,
    pub enterprise: bool,
    pub version: String,
}

/// Todo service that delegates to the injected storage backend
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    presentation: PresentationConfig,
}

impl TodoService {
    /// Create a new todo service with injected storage backend
    pub fn new(store: Arc<dyn TodoStore>, presentation: PresentationConfig) -> Self {
        Self { store, presentation }
    }

    /// Shared handle to the backend, for the warmup worker
    pub fn store(&self) -> Arc<dyn TodoStore> {
        Arc::clone(&self.store)
    }

    /// Current todos plus the render context
    pub async fn list(&self) -> StoreResult<TodoPage> {
        let todos = self.store.list_items().await?;
        Ok(TodoPage {
            todos,
            enterprise: self.presentation.enterprise,
            version: self.presentation.version.clone(),
        })
    }

    /// Store a submitted todo. Returns false when the submission was empty
    /// and nothing was stored.
    pub async fn create(&self, content: &str) -> StoreResult<bool> {
        match TodoItem::new(content) {
            Some(item) => {
                self.store.create_item(&item).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete every todo matching `content`, returning how many went away
    pub async fn delete(&self, content: &str) -> StoreResult<u64> {
        let removed = self.store.delete_item(content).await?;
        debug!("Deleting To Do removed {} entries", removed);
        Ok(removed)
    }

    /// Prepare the backend; safe to call repeatedly
    pub async fn init(&self) -> StoreResult<()> {
        self.store.init().await
    }

    pub async fn healthcheck(&self) -> StoreResult<()> {
        self.store.healthcheck().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_store::MemoryTodoStore;

    fn service() -> TodoService {
        TodoService::new(
            Arc::new(MemoryTodoStore::new()),
            PresentationConfig {
                enterprise: true,
                version: "v2".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_list_carries_render_context() {
        let service = service();
        service.create("a").await.unwrap();

        let page = service.list().await.unwrap();
        assert_eq!(page.todos, vec!["a"]);
        assert!(page.enterprise);
        assert_eq!(page.version, "v2");
    }

    #[tokio::test]
    async fn test_empty_submission_leaves_listing_unchanged() {
        let service = service();
        service.create("first").await.unwrap();

        assert!(!service.create("").await.unwrap());
        assert_eq!(service.list().await.unwrap().todos, vec!["first"]);
    }

    #[tokio::test]
    async fn test_delete_then_list() {
        let service = service();
        service.create("a").await.unwrap();
        service.create("b").await.unwrap();

        assert_eq!(service.delete("a").await.unwrap(), 1);
        assert_eq!(service.list().await.unwrap().todos, vec!["b"]);
        assert_eq!(service.delete("zzz").await.unwrap(), 0);
        assert_eq!(service.list().await.unwrap().todos, vec!["b"]);
    }

    #[tokio::test]
    async fn test_store_handle_is_shared() {
        let service = service();
        service.store().create_item(&TodoItem::new("via handle").unwrap()).await.unwrap();
        assert_eq!(service.list().await.unwrap().todos, vec!["via handle"]);
        assert!(service.healthcheck().await.is_ok());
    }

    #[tokio::test]
    async fn test_init_is_repeatable_and_keeps_todos() {
        let service = service();
        service.init().await.unwrap();
        service.create("survives").await.unwrap();
        service.init().await.unwrap();
        assert_eq!(service.list().await.unwrap().todos, vec!["survives"]);
    }
}
