//! In-memory key-value store

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{KeyValueStore, StorageError};

/// Heap-backed store, cheap to clone (clones share the same map)
///
/// An optional byte limit mimics the browser's storage quota: the sum of
/// all key and value lengths may not exceed it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<BTreeMap<String, String>>>,
    limit: Option<usize>,
}

impl MemoryStore {
    /// Create an empty, unlimited store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            items: Rc::default(),
            limit: Some(limit),
        }
    }

    /// Keys currently present, sorted
    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Bytes used by all keys and values
    pub fn used_bytes(&self) -> usize {
        self.items
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.borrow_mut();

        if let Some(limit) = self.limit {
            let current: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = current + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
