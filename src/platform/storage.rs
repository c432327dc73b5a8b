//! Key-value storage backends

use std::collections::HashMap;
use std::fmt;

/// Storage failure. Callers log these and carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No storage backend (private browsing, sandboxed iframe)
    Unavailable,
    /// Backend refused the write (quota, permissions)
    Rejected(String),
    /// Value could not be serialized
    Encode(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::Rejected(reason) => write!(f, "storage write rejected: {}", reason),
            StorageError::Encode(reason) => write!(f, "could not encode value: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {}

/// Flat string key-value store (LocalStorage semantics)
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str);
}

/// In-process store used by the native build and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    /// A store whose writes always fail
    pub fn read_only() -> Self {
        Self {
            items: HashMap::new(),
            read_only: true,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Rejected("read-only store".to_string()));
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn open() -> Result<Self, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }

    fn remove_item(&mut self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        assert!(store.is_empty());
        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").as_deref(), Some("1"));
        store.set_item("a", "2").unwrap();
        assert_eq!(store.get_item("a").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
        store.remove_item("a");
        assert_eq!(store.get_item("a"), None);
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        let mut store = MemoryStore::read_only();
        let err = store.set_item("a", "1").unwrap_err();
        assert!(matches!(err, StorageError::Rejected(_)));
        assert!(err.to_string().contains("rejected"));
        assert!(store.get_item("a").is_none());
    }
}
