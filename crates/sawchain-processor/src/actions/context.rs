//! # Transaction State Context
//!
//! Read-validate-then-write discipline for a single transaction. Reads go
//! through a cache in front of the store; writes are staged in an ordered
//! change set and flushed with one `set` call on commit. Dropping the
//! context without committing leaves the store untouched.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::adapters::codec::{decode_record, encode_record};
use crate::domain::{ProcessorError, Record, Rejection, StateAddress};
use crate::ports::StateStore;

pub struct StateContext<'s> {
    store: &'s mut dyn StateStore,
    /// `None` marks an address known to be empty.
    cache: HashMap<StateAddress, Option<Vec<u8>>>,
    staged: BTreeMap<StateAddress, Vec<u8>>,
}

impl<'s> StateContext<'s> {
    pub fn new(store: &'s mut dyn StateStore) -> Self {
        Self {
            store,
            cache: HashMap::new(),
            staged: BTreeMap::new(),
        }
    }

    /// Fetch every address not yet cached in a single store read.
    pub fn prefetch(&mut self, addresses: &[StateAddress]) -> Result<(), ProcessorError> {
        let mut missing: Vec<StateAddress> = addresses
            .iter()
            .filter(|address| !self.cache.contains_key(*address))
            .cloned()
            .collect();
        missing.sort();
        missing.dedup();
        if missing.is_empty() {
            return Ok(());
        }

        let mut found = self.store.get(&missing)?;
        for address in missing {
            let bytes = found.remove(&address).filter(|bytes| !bytes.is_empty());
            self.cache.insert(address, bytes);
        }
        Ok(())
    }

    fn raw(&mut self, address: &StateAddress) -> Result<Option<Vec<u8>>, ProcessorError> {
        if let Some(bytes) = self.staged.get(address) {
            return Ok(Some(bytes.clone()));
        }
        self.prefetch(std::slice::from_ref(address))?;
        Ok(self.cache.get(address).cloned().flatten())
    }

    /// True if any record is stored (or staged) at `address`.
    pub fn exists(&mut self, address: &StateAddress) -> Result<bool, ProcessorError> {
        Ok(self.raw(address)?.is_some())
    }

    /// Load the record at `address`, seeing this transaction's own writes.
    pub fn load<T: Record>(&mut self, address: &StateAddress) -> Result<Option<T>, ProcessorError> {
        if address.kind() != Some(T::KIND) {
            return Err(Rejection::WrongKind {
                expected: T::KIND.name(),
                address: address.to_string(),
            }
            .into());
        }
        match self.raw(address)? {
            Some(bytes) => decode_record(address, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Load a referenced record, rejecting dangling references.
    pub fn require<T: Record>(&mut self, address: &StateAddress) -> Result<T, ProcessorError> {
        self.load(address)?.ok_or_else(|| {
            Rejection::DanglingReference {
                kind: T::KIND.name(),
                address: address.to_string(),
            }
            .into()
        })
    }

    /// Load every referenced record, in order.
    pub fn require_all<T: Record>(
        &mut self,
        addresses: &[StateAddress],
    ) -> Result<Vec<T>, ProcessorError> {
        self.prefetch(addresses)?;
        addresses.iter().map(|address| self.require(address)).collect()
    }

    /// Reject if a record already occupies `address`.
    pub fn ensure_vacant(&mut self, address: &StateAddress) -> Result<(), ProcessorError> {
        if self.exists(address)? {
            let kind = address.kind().map_or("record", |kind| kind.name());
            return Err(Rejection::invariant(format!("{kind} already exists at {address}")).into());
        }
        Ok(())
    }

    /// Stage a write. Later stages of the same address replace earlier ones.
    pub fn stage<T: Record>(&mut self, address: &StateAddress, record: &T) -> Result<(), ProcessorError> {
        let bytes = encode_record(record)?;
        debug!(address = %address, kind = %T::KIND, bytes = bytes.len(), "Staged write");
        self.staged.insert(address.clone(), bytes);
        Ok(())
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Flush all staged writes in one store call.
    pub fn commit(self) -> Result<Vec<StateAddress>, ProcessorError> {
        if self.staged.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.set(self.staged)?)
    }
}
