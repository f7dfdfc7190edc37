//! In-memory implementation of TodoStore

use crate::storage::{same_item, StorageBackend, StoreError, StoreResult, TodoItem, TodoStore};
use async_trait::async_trait;
use log::debug;
use std::sync::{Mutex, MutexGuard};

/// Todo list held in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    todos: Mutex<Vec<String>>,
}

impl MemoryTodoStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `todos`, in order
    pub fn with_items<I, S>(todos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let todos = todos
            .into_iter()
            .map(Into::<String>::into)
            .filter(|todo| !todo.is_empty())
            .collect();
        Self {
            todos: Mutex::new(todos),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Vec<String>>> {
        self.todos
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_items(&self) -> StoreResult<Vec<String>> {
        Ok(self.lock()?.clone())
    }

    async fn create_item(&self, item: &TodoItem) -> StoreResult<()> {
        let mut todos = self.lock()?;
        todos.push(item.as_str().to_string());
        debug!("Memory store now holds {} todos", todos.len());
        Ok(())
    }

    async fn delete_item(&self, item: &str) -> StoreResult<u64> {
        let mut todos = self.lock()?;
        let before = todos.len();
        todos.retain(|todo| !same_item(todo, item));
        Ok((before - todos.len()) as u64)
    }

    async fn healthcheck(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content: &str) -> TodoItem {
        TodoItem::new(content).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_basic_operations() {
        let store = MemoryTodoStore::new();

        assert!(store.list_items().await.unwrap().is_empty());

        store.create_item(&item("buy milk")).await.unwrap();
        store.create_item(&item("walk dog")).await.unwrap();
        assert_eq!(store.list_items().await.unwrap(), vec!["buy milk", "walk dog"]);

        let removed = store.delete_item("Buy Milk").await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.list_items().await.unwrap(), vec!["walk dog"]);
    }

    #[tokio::test]
    async fn test_delete_removes_consecutive_duplicates() {
        let store = MemoryTodoStore::with_items(["x", "X", "x", "keep", "x"]);

        let removed = store.delete_item("x").await.unwrap();

        assert_eq!(removed, 4);
        assert_eq!(store.list_items().await.unwrap(), vec!["keep"]);
    }

    #[tokio::test]
    async fn test_delete_missing_item_is_noop() {
        let store = MemoryTodoStore::with_items(["a", "b"]);

        assert_eq!(store.delete_item("c").await.unwrap(), 0);
        assert_eq!(store.list_items().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_init_and_healthcheck_always_succeed() {
        let store = MemoryTodoStore::new();
        assert!(store.init().await.is_ok());
        assert!(store.init().await.is_ok());
        assert!(store.healthcheck().await.is_ok());
        assert_eq!(store.backend(), StorageBackend::Memory);
    }

    #[test]
    fn test_with_items_drops_empty_entries() {
        let store = MemoryTodoStore::with_items(["", "a", ""]);
        assert_eq!(*store.lock().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let store = std::sync::Arc::new(MemoryTodoStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.todos.lock().unwrap();
            panic!("poison the todo list");
        })
        .join();

        assert!(matches!(store.lock(), Err(StoreError::LockPoisoned(_))));
    }
}
