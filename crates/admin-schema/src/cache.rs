//! Per-model caches owned by the adapter.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Model-keyed cache of shared derivations, invalidated by hand.
#[derive(Debug)]
pub struct SchemaCache<T> {
    entries: Mutex<BTreeMap<String, Arc<T>>>,
}

impl<T> Default for SchemaCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T> SchemaCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, model_name: &str) -> Option<Arc<T>> {
        self.lock().get(model_name).cloned()
    }

    /// Stores `value` and returns the shared handle.
    pub fn insert(&self, model_name: impl Into<String>, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.lock().insert(model_name.into(), Arc::clone(&value));
        value
    }

    /// Drops one model's entry, or every entry when `model_name` is `None`.
    pub fn invalidate(&self, model_name: Option<&str>) {
        let mut entries = self.lock();
        match model_name {
            Some(model_name) => {
                entries.remove(model_name);
            }
            None => entries.clear(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Arc<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
