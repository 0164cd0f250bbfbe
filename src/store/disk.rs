use super::LocalStore;
use crate::core::error::PerrosError;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "local";

/// fjall-backed store living under the data directory.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(data_path: &Path) -> Result<Self, PerrosError> {
        let path = data_path.join("store");
        std::fs::create_dir_all(&path)
            .map_err(|e| PerrosError::Storage(format!("{}: {e}", path.display())))?;

        let keyspace = Config::new(&path).open()?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened local store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl LocalStore for DiskStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PerrosError> {
        Ok(self.partition.get(key)?.map(|value| value.to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), PerrosError> {
        self.partition.insert(key, value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PerrosError> {
        self.partition.remove(key)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}
