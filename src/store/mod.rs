//! Local persistence of the client state between runs

pub mod disk;
pub mod memory;

use crate::core::error::PerrosError;
use crate::core::state::PersistedState;
use tracing::debug;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Key holding the serialized client state.
pub const STATE_KEY: &str = "perros-index-storage";
/// Key recording that the user dismissed the disclaimer.
pub const DISCLAIMER_KEY: &str = "disclaimer_seen";

/// Named blobs kept on the local machine.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PerrosError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), PerrosError>;
    fn remove(&self, key: &str) -> Result<(), PerrosError>;

    fn load_state(&self) -> Result<Option<PersistedState>, PerrosError> {
        match self.get(STATE_KEY)? {
            Some(bytes) => {
                let state = serde_json::from_slice(&bytes)?;
                debug!("Loaded persisted state");
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    fn save_state(&self, state: &PersistedState) -> Result<(), PerrosError> {
        self.put(STATE_KEY, &serde_json::to_vec(state)?)?;
        debug!(entries = state.entries.len(), "Saved state");
        Ok(())
    }

    fn disclaimer_seen(&self) -> Result<bool, PerrosError> {
        Ok(self.get(DISCLAIMER_KEY)?.is_some_and(|v| v == b"true"))
    }

    fn mark_disclaimer_seen(&self) -> Result<(), PerrosError> {
        self.put(DISCLAIMER_KEY, b"true")
    }
}
