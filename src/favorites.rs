//! Favorite restaurants and dishes.
//!
//! Each set is stored as a JSON array under a fixed key in an injected
//! [`KeyValueStore`], so the toggle logic runs the same against memory in
//! tests and SQLite in the binary.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use thiserror::Error;

const RESTAURANTS_KEY: &str = "favorite_restaurants";
const DISHES_KEY: &str = "favorite_dishes";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("stored value is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("{0}")]
    Backend(String),
}

/// Minimal string key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store, lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().expect("memory store lock poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Clone)]
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
}

impl Favorites {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Flip a restaurant's favorite flag. Returns `true` if it is now a favorite.
    pub fn toggle_restaurant(&self, restaurant_id: &str) -> Result<bool, StoreError> {
        self.toggle(RESTAURANTS_KEY, restaurant_id)
    }

    /// Flip a dish's favorite flag. Returns `true` if it is now a favorite.
    pub fn toggle_dish(&self, item_id: &str) -> Result<bool, StoreError> {
        self.toggle(DISHES_KEY, item_id)
    }

    pub fn is_favorite_restaurant(&self, restaurant_id: &str) -> Result<bool, StoreError> {
        Ok(self.load(RESTAURANTS_KEY)?.contains(restaurant_id))
    }

    pub fn is_favorite_dish(&self, item_id: &str) -> Result<bool, StoreError> {
        Ok(self.load(DISHES_KEY)?.contains(item_id))
    }

    pub fn restaurants(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load(RESTAURANTS_KEY)?.into_iter().collect())
    }

    pub fn dishes(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load(DISHES_KEY)?.into_iter().collect())
    }

    fn load(&self, key: &str) -> Result<BTreeSet<String>, StoreError> {
        match self.store.get(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeSet::new()),
        }
    }

    fn toggle(&self, key: &str, id: &str) -> Result<bool, StoreError> {
        let mut set = self.load(key)?;
        let now_favorite = if set.remove(id) {
            false
        } else {
            set.insert(id.to_string());
            true
        };
        self.store.set(key, &serde_json::to_string(&set)?)?;
        Ok(now_favorite)
    }
}
