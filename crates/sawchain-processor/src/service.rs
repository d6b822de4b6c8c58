//! # SawChain Handler Service
//!
//! Entry point used by the ledger runtime. Decodes the payload, applies it
//! through the router and logs the outcome.
//!
//! ## Outcomes
//!
//! - `Ok(())`: every write was committed in one store call.
//! - `InvalidTransaction`: rejected with zero writes; the runtime must not
//!   retry it.
//! - any other error: this replica is faulty (store failure, corrupted
//!   record) and the runtime must not treat the transaction as invalid.

use tracing::{error, info, instrument, warn};

use crate::config::ProcessorConfig;
use crate::domain::{namespace, ProcessorError};
use crate::payload::Payload;
use crate::ports::{StateStore, TransactionHandler, TransactionRequest};
use crate::router::apply_payload;

/// Stateless transaction handler for the SawChain family.
#[derive(Clone, Debug, Default)]
pub struct SawChainHandler {
    config: ProcessorConfig,
}

impl SawChainHandler {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }
}

impl TransactionHandler for SawChainHandler {
    fn family_name(&self) -> &str {
        &self.config.family_name
    }

    fn family_versions(&self) -> &[String] {
        &self.config.family_versions
    }

    fn namespaces(&self) -> Vec<String> {
        vec![namespace().to_string()]
    }

    #[instrument(
        skip(self, request, state),
        fields(signer = %request.signer_public_key, action = tracing::field::Empty)
    )]
    fn apply(
        &self,
        request: &TransactionRequest,
        state: &mut dyn StateStore,
    ) -> Result<(), ProcessorError> {
        let result = Payload::from_bytes(&request.payload)
            .map_err(ProcessorError::from)
            .and_then(|payload| {
                tracing::Span::current().record("action", payload.action.name());
                apply_payload(state, &self.config, &request.signer_public_key, &payload)
            });

        match result {
            Ok(written) => {
                info!(writes = written.len(), "Transaction applied");
                Ok(())
            }
            Err(ProcessorError::InvalidTransaction(rejection)) => {
                warn!(reason = %rejection, "Transaction rejected");
                Err(ProcessorError::InvalidTransaction(rejection))
            }
            Err(fault) => {
                error!(error = %fault, "Internal error while applying transaction");
                Err(fault)
            }
        }
    }
}
