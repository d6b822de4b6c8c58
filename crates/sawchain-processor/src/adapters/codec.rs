//! Binary record encoding.
//!
//! Records are stored as bincode blobs. The encoding is deterministic, so
//! identical records produce identical bytes on every replica.

use crate::domain::{ProcessorError, Record, StateAddress};

pub fn encode_record<T: Record>(record: &T) -> Result<Vec<u8>, ProcessorError> {
    bincode::serialize(record).map_err(|e| ProcessorError::Encoding(e.to_string()))
}

/// Decode the record stored at `address`.
///
/// A stored record that fails to decode means the replica's state is
/// damaged, not that the transaction is invalid.
pub fn decode_record<T: Record>(address: &StateAddress, bytes: &[u8]) -> Result<T, ProcessorError> {
    bincode::deserialize(bytes).map_err(|e| ProcessorError::Corrupted {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
