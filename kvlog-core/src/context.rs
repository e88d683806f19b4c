//! Request-scoped context handed through to sinks.
//!
//! The facade never looks inside a [`Context`]; it is carried so that sinks
//! can pick up correlation data such as a trace id.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Cheaply cloneable, immutable key/value bag.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Arc<BTreeMap<String, String>>,
}

impl Context {
    /// The empty context used by the plain formatted calls.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a child context with `key` set to `value`.
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key.into(), value.into());
        Self {
            values: Arc::new(values),
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
