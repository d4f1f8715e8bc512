//! Bridge configuration

use serde_json::Value;

use crate::consts::STORAGE_KEY;
use crate::flags::default_flags;

/// Where the bridge stores flags and what it hands out when nothing is stored
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// The single key ever read or written
    pub storage_key: String,
    /// Returned by `hydrate` for absent or unreadable records
    pub default_flags: Value,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            default_flags: default_flags(),
        }
    }
}

impl BridgeConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_default_flags(mut self, flags: Value) -> Self {
        self.default_flags = flags;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.storage_key, "todos-elm");
        assert_eq!(config.default_flags, json!({"tasks": [], "uid": 0}));
    }

    #[test]
    fn test_builder_overrides() {
        let config = BridgeConfig::default()
            .with_storage_key("other")
            .with_default_flags(json!({"tasks": [], "uid": 7}));
        assert_eq!(config.storage_key, "other");
        assert_eq!(config.default_flags["uid"], 7);
    }
}
