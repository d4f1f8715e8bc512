//! Key-value store capability
//!
//! The bridge never touches a global storage object. It is handed something
//! implementing [`KeyValueStore`]:
//! - [`MemoryStore`] for native builds and tests
//! - [`LocalStorage`] wrapping `window.localStorage` (WASM only)

mod memory;
#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use std::rc::Rc;

use thiserror::Error;

/// Failures reported by a key-value store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store could not be obtained at all (no window, storage disabled)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Reading a key failed
    #[error("failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Writing a key failed
    #[error("failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    /// The write would exceed the store's capacity
    #[error("quota exceeded writing '{key}': {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
}

/// String-keyed, string-valued persistent storage
///
/// Methods take `&self` since browser storage is a shared singleton; stores
/// use interior mutability for writes.
pub trait KeyValueStore {
    /// Fetch the value stored under `key`, `None` if absent
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}
