use super::LocalStore;
use crate::core::error::PerrosError;
use std::collections::HashMap;
use std::sync::RwLock;

/// Store that forgets everything when dropped. Used when no data directory
/// is available, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> PerrosError {
    PerrosError::Storage("memory store lock poisoned".into())
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PerrosError> {
        Ok(self.inner.read().map_err(poisoned)?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), PerrosError> {
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PerrosError> {
        self.inner.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback::sample_entries;
    use crate::core::state::PersistedState;
    use crate::store::STATE_KEY;

    #[test]
    fn test_get_put_remove() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.put("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_state_and_disclaimer_are_separate() {
        let store = MemoryStore::new();
        assert!(store.load_state().unwrap().is_none());
        assert!(!store.disclaimer_seen().unwrap());

        let state = PersistedState {
            entries: sample_entries(),
            user_location: None,
            exchange_rates: None,
        };
        store.save_state(&state).unwrap();
        assert!(!store.disclaimer_seen().unwrap());
        assert_eq!(store.load_state().unwrap(), Some(state));

        store.mark_disclaimer_seen().unwrap();
        assert!(store.disclaimer_seen().unwrap());
    }

    #[test]
    fn test_corrupt_state_is_storage_error() {
        let store = MemoryStore::new();
        store.put(STATE_KEY, b"{not json").unwrap();
        assert!(matches!(
            store.load_state(),
            Err(PerrosError::Storage(_))
        ));
    }
}
