//! In-memory implementation of the state store for tests and local replay.

use std::collections::{BTreeMap, HashMap};

use crate::adapters::codec::decode_record;
use crate::domain::{namespace, ProcessorError, Record, StateAddress, StoreError};
use crate::ports::StateStore;

/// Ordered map of address to bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryStateStore {
    entries: BTreeMap<StateAddress, Vec<u8>>,
    write_calls: usize,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls that reached this store.
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn raw(&self, address: &StateAddress) -> Option<&[u8]> {
        self.entries.get(address).map(Vec::as_slice)
    }

    /// Decode the record at `address`, if present.
    pub fn record<T: Record>(&self, address: &StateAddress) -> Result<Option<T>, ProcessorError> {
        match self.entries.get(address) {
            Some(bytes) if !bytes.is_empty() => decode_record(address, bytes).map(Some),
            _ => Ok(None),
        }
    }

    /// Copy of the full state, for comparing replicas.
    pub fn snapshot(&self) -> BTreeMap<StateAddress, Vec<u8>> {
        self.entries.clone()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(
        &self,
        addresses: &[StateAddress],
    ) -> Result<HashMap<StateAddress, Vec<u8>>, StoreError> {
        Ok(addresses
            .iter()
            .filter_map(|address| {
                self.entries
                    .get(address)
                    .map(|bytes| (address.clone(), bytes.clone()))
            })
            .collect())
    }

    fn set(
        &mut self,
        entries: BTreeMap<StateAddress, Vec<u8>>,
    ) -> Result<Vec<StateAddress>, StoreError> {
        if let Some(foreign) = entries
            .keys()
            .find(|address| !address.as_str().starts_with(namespace()))
        {
            return Err(StoreError::OutsideNamespace(foreign.to_string()));
        }
        self.write_calls += 1;
        let written = entries.keys().cloned().collect();
        self.entries.extend(entries);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::codec::encode_record;
    use crate::domain::{task_type_address, TaskType};

    #[test]
    fn test_set_then_get() {
        let mut store = InMemoryStateStore::new();
        let address = task_type_address("TT1");
        let record = TaskType {
            id: "TT1".to_string(),
            task: "Pruning".to_string(),
        };
        let mut batch = BTreeMap::new();
        batch.insert(address.clone(), encode_record(&record).unwrap());
        let written = store.set(batch).unwrap();

        assert_eq!(written, vec![address.clone()]);
        assert_eq!(store.write_calls(), 1);
        assert_eq!(store.record::<TaskType>(&address).unwrap(), Some(record));
    }

    #[test]
    fn test_get_omits_absent_addresses() {
        let store = InMemoryStateStore::new();
        let found = store.get(&[task_type_address("missing")]).unwrap();
        assert!(found.is_empty());
    }
}
