//! # Value Objects
//!
//! Validated identifiers and the closed enumerations shared by records and
//! payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::addressing::{namespace, EntityKind, ADDRESS_LENGTH};
use super::errors::Rejection;

/// Hex length of a compressed secp256k1 public key.
pub const PUBLIC_KEY_LENGTH: usize = 66;

/// Hex length of a SHA-512 digest.
pub const SHA512_HEX_LENGTH: usize = 128;

/// Characters of a rejected value echoed back in a rejection.
const ECHO_LIMIT: usize = 80;

/// Leading characters of caller input, bounded for rejection messages.
fn excerpt(value: &str) -> String {
    value.chars().take(ECHO_LIMIT).collect()
}

fn is_hex(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// True if `value` is a hex encoded SHA-512 digest.
pub fn is_sha512_hex(value: &str) -> bool {
    value.len() == SHA512_HEX_LENGTH && is_hex(value)
}

// =============================================================================
// PUBLIC KEY
// =============================================================================

/// Signer identity, normalized to lowercase hex.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(String);

impl PublicKey {
    pub fn parse(field: &'static str, value: &str) -> Result<Self, Rejection> {
        if value.len() != PUBLIC_KEY_LENGTH || !is_hex(value) {
            return Err(Rejection::MalformedPayload(format!(
                "{field} is not a valid public key: {:?}",
                excerpt(value)
            )));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// STATE ADDRESS
// =============================================================================

/// A well-formed address inside the SawChain namespace.
///
/// Caller-supplied addresses go through [`StateAddress::parse`]; addresses
/// computed by the codec are trusted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateAddress(String);

impl StateAddress {
    /// Validate length, charset and namespace of a caller-supplied address.
    pub fn parse(field: &'static str, value: &str) -> Result<Self, Rejection> {
        let well_formed = value.len() == ADDRESS_LENGTH
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            && value.starts_with(namespace());
        if !well_formed {
            return Err(Rejection::MalformedAddress {
                field,
                address: excerpt(value),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Parse and require a specific entity kind.
    pub fn parse_kind(
        field: &'static str,
        value: &str,
        expected: EntityKind,
    ) -> Result<Self, Rejection> {
        let address = Self::parse(field, value)?;
        if address.kind() != Some(expected) {
            return Err(Rejection::WrongKind {
                expected: expected.name(),
                address: address.0,
            });
        }
        Ok(address)
    }

    pub(crate) fn from_codec(value: String) -> Self {
        Self(value)
    }

    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::of(self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Declared type of an event parameter or a batch property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Number,
    Text,
    Bytes,
    Location,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Number => "number",
            DataType::Text => "string",
            DataType::Bytes => "bytes",
            DataType::Location => "location",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    Unit,
    Kilos,
    Litre,
}

/// Whether an event annotates its target or consumes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Typology {
    Description,
    Transformation,
}

/// Proposal lifecycle. `Issued` is the only non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    Issued,
    Accepted,
    Rejected,
    Canceled,
}

impl ProposalStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ProposalStatus::Issued)
    }

    /// Transitions allowed by the proposal state machine.
    pub fn can_transition_to(self, next: ProposalStatus) -> bool {
        matches!(self, ProposalStatus::Issued) && next.is_terminal()
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProposalStatus::Issued => "ISSUED",
            ProposalStatus::Accepted => "ACCEPTED",
            ProposalStatus::Rejected => "REJECTED",
            ProposalStatus::Canceled => "CANCELED",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalizationReason {
    Withdrawn,
    Exported,
    Destroyed,
}

// =============================================================================
// VALUES
// =============================================================================

/// Approximate coordinates in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A parameter or property value. Exactly one arm is populated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Bytes(Vec<u8>),
    Location(Location),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Number(_) => DataType::Number,
            Value::Text(_) => DataType::Text,
            Value::Bytes(_) => DataType::Bytes,
            Value::Location(_) => DataType::Location,
        }
    }
}
