//! In-memory secret store backing generated parameter defaults.
//!
//! Generated passwords are written here the first time they are resolved so every later
//! evaluation (connection strings, environment, manifests) sees the same value. A store can
//! be seeded from the `secrets` section of the host config to pin values across runs.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct SecretStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl SecretStore {
    pub fn new() -> Self {
        SecretStore::default()
    }

    pub fn from_map(values: HashMap<String, String>) -> Self {
        SecretStore {
            values: Arc::new(RwLock::new(values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }

    /// Return the stored value, or store and return the one produced by `f`.
    pub fn get_or_insert_with(&self, key: &str, f: impl FnOnce() -> String) -> String {
        if let Some(v) = self.get(key) {
            return v;
        }
        self.values.write().entry(key.to_string()).or_insert_with(f).clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self.values.read().keys().cloned().collect();
        keys.sort();
        f.debug_struct("SecretStore").field("keys", &keys).finish()
    }
}
