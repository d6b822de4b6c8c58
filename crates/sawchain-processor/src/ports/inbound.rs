//! # Inbound Ports (Driving Side)
//!
//! API the ledger runtime calls once per transaction.

use crate::domain::ProcessorError;
use crate::ports::outbound::StateStore;

/// A transaction delivered by the runtime.
///
/// The signature has already been verified upstream; only the signer key
/// is passed through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Hex encoded public key of the verified signer.
    pub signer_public_key: String,
    /// Encoded [`crate::payload::Payload`].
    pub payload: Vec<u8>,
}

impl TransactionRequest {
    pub fn new(signer_public_key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            signer_public_key: signer_public_key.into(),
            payload,
        }
    }
}

/// Transaction family handler.
pub trait TransactionHandler: Send + Sync {
    fn family_name(&self) -> &str;

    fn family_versions(&self) -> &[String];

    /// Address prefixes this handler reads and writes.
    fn namespaces(&self) -> Vec<String>;

    /// Validate the transaction and commit its writes, or reject it with
    /// zero writes.
    fn apply(
        &self,
        request: &TransactionRequest,
        state: &mut dyn StateStore,
    ) -> Result<(), ProcessorError>;
}
