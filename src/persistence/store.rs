//! Key-value store contract and the in-memory implementation

use std::collections::BTreeMap;

use crate::error::StoreError;

/// Synchronous string key-value store with a capacity quota.
///
/// Each `set` is atomic for its own key; there is no atomicity across keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Bytes the entries would occupy after writing `key = value`.
pub(crate) fn usage_after_set(
    entries: &BTreeMap<String, String>,
    key: &str,
    value: &str,
) -> usize {
    let current: usize = entries
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
    current + key.len() + value.len()
}

pub(crate) fn check_quota(
    entries: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    quota: usize,
) -> Result<(), StoreError> {
    let required = usage_after_set(entries, key, value);
    if required > quota {
        return Err(StoreError::QuotaExceeded { required, quota });
    }
    Ok(())
}

/// Store that lives only as long as the process
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_quota(crate::config::storage::QUOTA_BYTES)
    }
}

impl MemoryStore {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        check_quota(&self.entries, key, value, self.quota)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::default();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        store.remove("a").unwrap();
    }

    #[test]
    fn over_quota_write_keeps_previous_value() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "small").unwrap();
        let err = store.set("k", "far too large").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { quota: 10, .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn overwriting_a_key_does_not_count_the_old_value() {
        let mut store = MemoryStore::with_quota(8);
        store.set("k", "1234567").unwrap();
        store.set("k", "7654321").unwrap();
        assert_eq!(store.len(), 1);
    }
}
