//! The ledger's keyed state, as seen by a transaction handler
use crate::address;
use crate::error::StoreError;
use sled::Batch;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The two primitives the host ledger exposes.
///
/// `get` omits addresses that hold no data. `set` writes every entry as one
/// commit and returns the addresses that were committed.
pub trait Store {
    fn get(&self, addresses: &[String]) -> Result<Vec<(String, Vec<u8>)>, StoreError>;
    fn set(&mut self, entries: Vec<(String, Vec<u8>)>) -> Result<Vec<String>, StoreError>;
}

fn check_addresses<'a>(mut addresses: impl Iterator<Item = &'a String>) -> Result<(), StoreError> {
    match addresses.find(|a| !address::is_valid(a)) {
        Some(bad) => Err(StoreError::InvalidAddress(bad.clone())),
        None => Ok(()),
    }
}

/// In-memory state, one snapshot per instance
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn raw(&self, address: &str) -> Option<&[u8]> {
        self.entries.get(address).map(Vec::as_slice)
    }
    /// Writes bytes without any address check, for seeding corrupt state in tests
    pub fn insert_raw(&mut self, address: impl Into<String>, data: Vec<u8>) {
        self.entries.insert(address.into(), data);
    }
}

impl Store for MemoryStore {
    fn get(&self, addresses: &[String]) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        check_addresses(addresses.iter())?;
        Ok(addresses
            .iter()
            .filter_map(|a| self.entries.get(a).map(|data| (a.clone(), data.clone())))
            .collect())
    }

    fn set(&mut self, entries: Vec<(String, Vec<u8>)>) -> Result<Vec<String>, StoreError> {
        check_addresses(entries.iter().map(|(a, _)| a))?;
        let mut committed = Vec::with_capacity(entries.len());
        for (address, data) in entries {
            self.entries.insert(address.clone(), data);
            committed.push(address);
        }
        Ok(committed)
    }
}

/// State persisted in a sled database
pub struct SledStore {
    instance: Arc<sled::Db>,
}

impl SledStore {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }
}

impl Store for SledStore {
    fn get(&self, addresses: &[String]) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        check_addresses(addresses.iter())?;
        let mut found = Vec::new();
        for address in addresses {
            if let Some(data) = self.instance.get(address.as_bytes())? {
                found.push((address.clone(), data.to_vec()));
            }
        }
        Ok(found)
    }

    fn set(&mut self, entries: Vec<(String, Vec<u8>)>) -> Result<Vec<String>, StoreError> {
        check_addresses(entries.iter().map(|(a, _)| a))?;
        // one batch so the commit is all or nothing
        let mut batch = Batch::default();
        let mut committed = Vec::with_capacity(entries.len());
        for (address, data) in entries {
            batch.insert(address.as_bytes(), data);
            committed.push(address);
        }
        self.instance.apply_batch(batch)?;
        Ok(committed)
    }
}
