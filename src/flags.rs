//! Application flags
//!
//! The bridge treats the stored payload as opaque JSON. This module only
//! provides the built-in default and a typed view for callers that want one.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Initial state handed to the application at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flags<T = Value> {
    pub tasks: Vec<T>,
    pub uid: u64,
}

impl<T> Default for Flags<T> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            uid: 0,
        }
    }
}

/// Flags used when nothing usable is stored: `{"tasks": [], "uid": 0}`
pub fn default_flags() -> Value {
    json!({
        "tasks": [],
        "uid": 0,
    })
}
