//! Browser LocalStorage (WASM only)

use wasm_bindgen::{JsCast, JsValue};

use super::{KeyValueStore, StorageError};

/// `window.localStorage`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Grab the window's LocalStorage
    pub fn open() -> Result<Self, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window object".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(js_reason(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| StorageError::Read {
            key: key.to_string(),
            reason: js_reason(&e),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: js_reason(&e),
            })
    }
}

/// Best-effort text for a thrown JS value
fn js_reason(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_local_storage_round_trip() {
        let store = LocalStorage::open().unwrap();
        store.set_item("todos-persist-test", "{\"uid\":3}").unwrap();
        assert_eq!(
            store.get_item("todos-persist-test").unwrap().as_deref(),
            Some("{\"uid\":3}")
        );

        store.storage.remove_item("todos-persist-test").unwrap();
        assert_eq!(store.get_item("todos-persist-test").unwrap(), None);
    }
}
