//! # Action Handlers
//!
//! One function per action. Each handler follows the same order: structural
//! checks on the payload, address parsing, role authorization, referential
//! integrity, domain invariants, then staging of every mutated record.
//! Nothing reaches the store until the router commits the context.

pub mod authorization;
pub mod batches;
pub mod company;
pub mod context;
pub mod events;
pub mod identity;
pub mod types;

pub use authorization::{resolve_role, Role};
pub use context::StateContext;

use std::collections::HashSet;

use crate::config::ProcessorConfig;
use crate::domain::{EntityKind, PublicKey, Rejection, StateAddress};

/// Per-transaction inputs shared by every handler.
#[derive(Clone, Debug)]
pub struct Invocation<'a> {
    pub signer: PublicKey,
    pub timestamp: u64,
    pub config: &'a ProcessorConfig,
}

impl Invocation<'_> {
    /// Mandatory free text: non-blank and within the configured length.
    pub(crate) fn require_text(&self, field: &str, value: &str) -> Result<(), Rejection> {
        if value.trim().is_empty() {
            return Err(Rejection::malformed(format!("{field} is required")));
        }
        self.check_text(field, value)
    }

    /// Optional free text: only the length limit applies.
    pub(crate) fn check_text(&self, field: &str, value: &str) -> Result<(), Rejection> {
        if value.chars().count() > self.config.max_text_length {
            return Err(Rejection::malformed(format!(
                "{field} exceeds {} characters",
                self.config.max_text_length
            )));
        }
        Ok(())
    }
}

/// Parse a caller-supplied address of the given kind.
pub(crate) fn parse_address(
    field: &'static str,
    value: &str,
    kind: EntityKind,
) -> Result<StateAddress, Rejection> {
    StateAddress::parse_kind(field, value, kind)
}

/// Parse a list of addresses of one kind. Duplicates are rejected.
pub(crate) fn parse_addresses(
    field: &'static str,
    values: &[String],
    kind: EntityKind,
) -> Result<Vec<StateAddress>, Rejection> {
    let addresses = values
        .iter()
        .map(|value| parse_address(field, value, kind))
        .collect::<Result<Vec<_>, _>>()?;
    ensure_distinct(field, &addresses)?;
    Ok(addresses)
}

pub(crate) fn ensure_distinct(field: &str, addresses: &[StateAddress]) -> Result<(), Rejection> {
    let mut seen = HashSet::with_capacity(addresses.len());
    for address in addresses {
        if !seen.insert(address) {
            return Err(Rejection::malformed(format!(
                "{field} lists {address} more than once"
            )));
        }
    }
    Ok(())
}
