//! Persisted string key/value store.
//!
//! The trust layer only ever needs three keys, each holding a small JSON
//! document. Backends must be all-or-nothing per `set`: a failed write leaves
//! the previous value untouched.

mod file;

pub use file::FileStore;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{PhonebookError, Result};

/// String-valued persistent store.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug)]
struct MemoryInner {
    entries: HashMap<String, String>,
    available: bool,
}

/// In-memory store. Clones share the same entries, which lets a test keep a
/// handle across a simulated reload.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                entries: HashMap::new(),
                available: true,
            })),
        }
    }

    /// Toggles simulated availability. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.available = available;
        }
    }

    /// Raw value under `key`, bypassing availability.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.entries.get(key).cloned())
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut MemoryInner) -> T) -> Result<T> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| PhonebookError::storage("memory store lock poisoned"))?;
        if !inner.available {
            return Err(PhonebookError::storage("store is blocked"));
        }
        Ok(f(&mut inner))
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_inner(|inner| inner.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_inner(|inner| {
            inner.entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_inner(|inner| {
            inner.entries.remove(key);
        })
    }
}
