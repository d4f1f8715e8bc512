//! Todos Persist - LocalStorage bridge for a todo-list web app
//!
//! Core modules:
//! - `bridge`: Hydrate flags at startup, write payloads on persist notifications
//! - `storage`: Key-value store capability (in-memory, LocalStorage on web)
//! - `port`: One-directional persist notification channel
//! - `flags`: Default flags and typed view over the stored payload
//! - `config`: Storage key and default flags
//! - `app`: Todo-list application runtime driven by the bridge

pub mod app;
pub mod bridge;
pub mod config;
pub mod flags;
pub mod port;
pub mod storage;

pub use app::{Program, TodoApp};
pub use bridge::{PersistError, PersistenceBridge, launch};
pub use config::BridgeConfig;
pub use flags::Flags;
pub use port::PersistPort;
pub use storage::{KeyValueStore, MemoryStore, StorageError};

/// Persistence constants
pub mod consts {
    /// LocalStorage slot holding the serialized flags
    pub const STORAGE_KEY: &str = "todos-elm";

    /// DOM element id the application mounts on
    pub const MOUNT_NODE_ID: &str = "app";
}
