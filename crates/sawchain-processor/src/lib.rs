//! # SawChain Processor - Supply-Chain Transaction Processor
//!
//! Deterministic state-transition engine for the SawChain permissioned
//! ledger. Given the current state slice and a signed transaction, it
//! either commits a new state slice in a single write or rejects the
//! transaction with no side effects.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | AddressCodec | `domain/addressing.rs` | (kind, key) to 70-char state address |
//! | TypeRegistry | `actions/types.rs` | task, product, parameter, event, property types |
//! | IdentityDirectory | `actions/identity.rs`, `actions/authorization.rs` | roles and role lookup |
//! | CompanyDirectory | `actions/company.rs` | companies, company admins, fields |
//! | BatchLedger | `actions/events.rs`, `actions/batches.rs` | events, properties, certificates, proposals, finalization |
//! | ActionRouter | `router.rs` | exhaustive dispatch and single commit |
//!
//! ## Transaction Shape
//!
//! 1. Structural checks on the payload
//! 2. Address well-formedness
//! 3. Role authorization via [`actions::resolve_role`]
//! 4. Referential integrity
//! 5. Domain invariants
//! 6. One `StateStore::set` call with every mutated record
//!
//! ## Usage Example
//!
//! ```ignore
//! use sawchain_processor::prelude::*;
//!
//! let handler = SawChainHandler::new(ProcessorConfig::from_env()?);
//! let payload = Payload::new(timestamp, Action::CreateSystemAdmin).to_bytes()?;
//! handler.apply(&TransactionRequest::new(signer_key, payload), &mut state)?;
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod actions;
pub mod adapters;
pub mod config;
pub mod domain;
pub mod payload;
pub mod ports;
pub mod router;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

pub mod prelude {
    pub use crate::actions::{resolve_role, Role};
    pub use crate::adapters::InMemoryStateStore;
    pub use crate::config::{ConfigError, ProcessorConfig};
    pub use crate::domain::{
        namespace, Batch, Company, DataType, EntityKind, Field, FinalizationReason, Location,
        ProcessorError, ProposalStatus, PublicKey, Rejection, StateAddress, StoreError, Typology,
        UnitOfMeasure, Value,
    };
    pub use crate::payload::{Action, Payload};
    pub use crate::ports::{StateStore, TransactionHandler, TransactionRequest};
    pub use crate::service::SawChainHandler;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
