#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

use bank_store_aws::adapters::store::{
    BatchSubmission, StoreError, TableReader, TableStatus, TableWriter,
};
use bank_store_core::entity::Entity;
use bank_store_core::keys::EntityKey;

/// In-memory stand-in for the key-value store: tables are created up front,
/// writes upsert by key, and throttling can be scripted per call.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<BTreeMap<String, BTreeMap<EntityKey, Entity>>>,
    rejections: Mutex<VecDeque<usize>>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl InMemoryStore {
    pub fn with_tables(names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().expect("poisoned mutex");
            for name in names {
                tables.insert(name.to_string(), BTreeMap::new());
            }
        }
        store
    }

    /// Each queued value is how many trailing items the next write call rejects.
    pub fn script_rejections(&self, per_call: &[usize]) {
        self.rejections
            .lock()
            .expect("poisoned mutex")
            .extend(per_call.iter().copied());
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().expect("poisoned mutex").clone()
    }

    pub fn entities(&self, table: &str) -> Vec<Entity> {
        self.tables
            .lock()
            .expect("poisoned mutex")
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn partition_keys(&self, table: &str) -> BTreeSet<String> {
        self.entities(table)
            .into_iter()
            .map(|entity| entity.key.partition_key)
            .collect()
    }

    fn missing_table(table: &str) -> StoreError {
        StoreError::Transport(format!("Requested resource not found: {table}"))
    }
}

impl TableWriter for InMemoryStore {
    fn describe_table(&self, table: &str) -> Result<TableStatus, StoreError> {
        let tables = self.tables.lock().expect("poisoned mutex");
        Ok(if tables.contains_key(table) {
            TableStatus::Exists
        } else {
            TableStatus::NotFound
        })
    }

    fn batch_write(&self, table: &str, entities: &[Entity]) -> Result<BatchSubmission, StoreError> {
        self.batch_sizes
            .lock()
            .expect("poisoned mutex")
            .push(entities.len());

        let reject = self
            .rejections
            .lock()
            .expect("poisoned mutex")
            .pop_front()
            .unwrap_or(0)
            .min(entities.len());
        let split = entities.len() - reject;

        let mut tables = self.tables.lock().expect("poisoned mutex");
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| Self::missing_table(table))?;
        for entity in &entities[..split] {
            rows.insert(entity.key.clone(), entity.clone());
        }

        Ok(BatchSubmission {
            accepted: entities[..split].to_vec(),
            rejected: entities[split..].to_vec(),
        })
    }
}

impl TableReader for InMemoryStore {
    fn query_partition(&self, table: &str, partition_key: &str) -> Result<Vec<Entity>, StoreError> {
        let tables = self.tables.lock().expect("poisoned mutex");
        let rows = tables
            .get(table)
            .ok_or_else(|| Self::missing_table(table))?;
        Ok(rows
            .values()
            .filter(|entity| entity.partition_key() == partition_key)
            .cloned()
            .collect())
    }

    fn scan_table(&self, table: &str) -> Result<Vec<Entity>, StoreError> {
        let tables = self.tables.lock().expect("poisoned mutex");
        let rows = tables
            .get(table)
            .ok_or_else(|| Self::missing_table(table))?;
        Ok(rows.values().cloned().collect())
    }
}
