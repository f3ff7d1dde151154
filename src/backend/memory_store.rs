use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::backend::interface::{KeyValueStore, Result};

#[derive(Default)]
struct Entries {
    scalars: HashMap<String, f64>,
    sets: HashMap<String, HashSet<String>>
}

/// In-process store, lost with the session.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // a panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_scalar(&self, key: &str) -> Result<Option<f64>> {
        Ok(self.lock().scalars.get(key).copied())
    }

    fn put_scalar(&self, key: &str, value: f64) -> Result<()> {
        self.lock().scalars.insert(key.to_owned(), value);
        Ok(())
    }

    fn get_set(&self, key: &str) -> Result<Option<HashSet<String>>> {
        Ok(self.lock().sets.get(key).cloned())
    }

    fn put_set(&self, key: &str, values: HashSet<String>) -> Result<()> {
        self.lock().sets.insert(key.to_owned(), values);
        Ok(())
    }
}
