//! # Outbound Ports (Driven Side)
//!
//! The address-keyed state store provided by the ledger runtime.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{StateAddress, StoreError};

/// Key-value state scoped to the SawChain namespace.
///
/// Absent addresses are either missing from the returned map or mapped to
/// an empty byte vector; callers treat both the same way.
pub trait StateStore {
    /// Read the current value of every requested address.
    fn get(
        &self,
        addresses: &[StateAddress],
    ) -> Result<HashMap<StateAddress, Vec<u8>>, StoreError>;

    /// Write all entries in one call. Returns the addresses written.
    fn set(
        &mut self,
        entries: BTreeMap<StateAddress, Vec<u8>>,
    ) -> Result<Vec<StateAddress>, StoreError>;
}
