//! Persistence bridge
//!
//! Reads the stored flags once at startup and writes every payload the
//! application asks to persist. All state lives in the injected store; the
//! bridge itself only holds the store handle and its config.

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::app::Program;
use crate::config::BridgeConfig;
use crate::port::PersistPort;
use crate::storage::{KeyValueStore, StorageError};

/// Errors surfaced by the bridge
#[derive(Error, Debug)]
pub enum PersistError {
    /// The payload could not be turned into JSON text
    #[error("failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Neither the stored flags nor the default fit the requested type
    #[error("failed to decode flags: {0}")]
    Decode(#[source] serde_json::Error),

    /// The store rejected the operation
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Bridge between the application runtime and a key-value store
#[derive(Debug)]
pub struct PersistenceBridge<S> {
    store: S,
    config: BridgeConfig,
}

impl<S: KeyValueStore> PersistenceBridge<S> {
    /// Bridge using the default key and default flags
    pub fn new(store: S) -> Self {
        Self::with_config(store, BridgeConfig::default())
    }

    pub fn with_config(store: S, config: BridgeConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Initial flags for the application
    ///
    /// Returns the stored JSON value if there is one. Absent, unreadable or
    /// corrupt records all yield the configured default flags.
    pub fn hydrate(&self) -> Value {
        let key = &self.config.storage_key;

        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("No stored flags under '{}', using defaults", key);
                return self.config.default_flags.clone();
            }
            Err(err) => {
                log::warn!("Could not read stored flags ({}), using defaults", err);
                return self.config.default_flags.clone();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(flags) => {
                log::info!("Hydrated flags from '{}' ({} bytes)", key, raw.len());
                flags
            }
            Err(err) => {
                log::warn!("Stored flags under '{}' are not valid JSON ({}), using defaults", key, err);
                self.config.default_flags.clone()
            }
        }
    }

    /// Hydrate and decode into `T`
    ///
    /// A stored value that does not fit `T` falls back to the default flags.
    pub fn hydrate_as<T: DeserializeOwned>(&self) -> Result<T, PersistError> {
        match serde_json::from_value(self.hydrate()) {
            Ok(flags) => Ok(flags),
            Err(err) => {
                log::warn!("Stored flags do not match the expected shape ({}), using defaults", err);
                serde_json::from_value(self.config.default_flags.clone()).map_err(PersistError::Decode)
            }
        }
    }

    /// Serialize `payload` and store it under the storage key, replacing any
    /// previous value
    pub fn on_persist_requested<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), PersistError> {
        let json = serde_json::to_string(payload).map_err(PersistError::Serialize)?;
        self.store.set_item(&self.config.storage_key, &json)?;
        log::debug!("Persisted {} bytes to '{}'", json.len(), self.config.storage_key);
        Ok(())
    }
}

impl<S: KeyValueStore + 'static> PersistenceBridge<S> {
    /// Persist every payload sent on `port`
    ///
    /// Failed writes are logged and dropped; later payloads are still written.
    pub fn attach(self: Rc<Self>, port: &PersistPort) {
        port.subscribe(move |payload| {
            if let Err(err) = self.on_persist_requested(payload) {
                log::error!("Failed to persist flags: {}", err);
            }
        });
    }
}

/// Start `program` with hydrated flags and persist whatever it sends
///
/// Hydration happens before `init`, so the program sees the stored state
/// from its first frame.
pub fn launch<P, S>(
    program: &mut P,
    mount: &str,
    store: S,
    config: BridgeConfig,
) -> Rc<PersistenceBridge<S>>
where
    P: Program + ?Sized,
    S: KeyValueStore + 'static,
{
    let bridge = Rc::new(PersistenceBridge::with_config(store, config));
    let flags = bridge.hydrate();

    let port = PersistPort::new();
    bridge.clone().attach(&port);

    program.init(mount, flags, port);
    bridge
}
