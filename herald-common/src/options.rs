//! Process-wide string options, populated once at startup.
//!
//! Hosts seed the registry from whatever configuration source they own;
//! after [`init`] the registry is read-only. Components read through the
//! lenient accessors and fall back to their own defaults on anything
//! missing or malformed.

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use serde::{Deserialize, Serialize};

/// Keys the gateway itself consults.
pub mod keys {
    /// Milliseconds to hold a dispatched notification before sending it.
    pub const DISPATCHED_DELAY: &str = "herald.gateway.dispatched_delay";
}

/// A flat string-to-string option table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(HashMap<String, String>);

impl Options {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Integer read with a silent fallback: a missing or unparseable value
    /// yields `default`.
    #[must_use]
    pub fn integer_or(&self, key: &str, default: u64) -> u64 {
        self.get(key)
            .map_or(default, |value| value.trim().parse().unwrap_or(default))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for Options {
    fn from(value: HashMap<String, String>) -> Self {
        Self(value)
    }
}

/// Global options registry (thread-safe)
static OPTIONS: OnceLock<Arc<Options>> = OnceLock::new();

/// Install the process-wide options. The first call wins; later calls are
/// ignored, matching the populate-at-startup, read-only lifecycle.
pub fn init(options: Options) {
    OPTIONS.get_or_init(|| Arc::new(options));
}

/// The process-wide options, empty if [`init`] was never called.
#[must_use]
pub fn global() -> Arc<Options> {
    OPTIONS
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(Options::default()))
}
