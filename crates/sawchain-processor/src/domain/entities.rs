//! # Domain Entities
//!
//! Records stored at SawChain state addresses. Each record is replaced as a
//! whole on every mutation; the append-only logs (`events`, `properties`,
//! `certificates`, `proposals`, and the company address lists) are only ever
//! pushed to.
//!
//! ## Ownership
//!
//! A batch is owned by `Batch::company` and a field by `Field::company`.
//! `Company::batches` records every batch ever associated with the company,
//! so it keeps an entry after the batch is transferred away.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::addressing::EntityKind;
use super::value_objects::{
    DataType, FinalizationReason, Location, ProposalStatus, PublicKey, StateAddress, Typology,
    UnitOfMeasure, Value,
};

/// A record that lives at an address of a single [`EntityKind`].
pub trait Record: Serialize + DeserializeOwned {
    const KIND: EntityKind;
}

macro_rules! record {
    ($ty:ty, $kind:expr) => {
        impl Record for $ty {
            const KIND: EntityKind = $kind;
        }
    };
}

// =============================================================================
// IDENTITIES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemAdmin {
    pub public_key: PublicKey,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyAdmin {
    pub public_key: PublicKey,
    pub company: StateAddress,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub public_key: PublicKey,
    pub company: StateAddress,
    /// Task Type address.
    pub task: StateAddress,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CertificationAuthority {
    pub public_key: PublicKey,
    pub name: String,
    pub website: String,
    pub enabled_product_types: Vec<StateAddress>,
    pub timestamp: u64,
}

record!(SystemAdmin, EntityKind::SystemAdmin);
record!(CompanyAdmin, EntityKind::CompanyAdmin);
record!(Operator, EntityKind::Operator);
record!(CertificationAuthority, EntityKind::CertificationAuthority);

// =============================================================================
// TYPES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskType {
    pub id: String,
    pub task: String,
}

/// A product reachable from another by transformation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedProductType {
    pub product_type: StateAddress,
    /// Output units per consumed input unit. Always `> 0`.
    pub conversion_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub measure: UnitOfMeasure,
    pub derived_product_types: Vec<DerivedProductType>,
}

impl ProductType {
    pub fn conversion_rate_to(&self, target: &StateAddress) -> Option<f64> {
        self.derived_product_types
            .iter()
            .find(|derived| &derived.product_type == target)
            .map(|derived| derived.conversion_rate)
    }

    pub fn derives(&self, target: &StateAddress) -> bool {
        self.conversion_rate_to(target).is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventParameterType {
    pub id: String,
    pub name: String,
    pub data_type: DataType,
}

/// Constraints an Event Type places on one of its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventParameter {
    pub parameter_type: StateAddress,
    pub required: bool,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    pub id: String,
    pub typology: Typology,
    pub name: String,
    pub description: String,
    pub enabled_task_types: Vec<StateAddress>,
    pub enabled_product_types: Vec<StateAddress>,
    pub parameters: Vec<EventParameter>,
    /// Always empty for description events.
    pub enabled_derived_product_types: Vec<StateAddress>,
}

impl EventType {
    pub fn parameter(&self, parameter_type: &StateAddress) -> Option<&EventParameter> {
        self.parameters
            .iter()
            .find(|parameter| &parameter.parameter_type == parameter_type)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
    pub id: String,
    pub name: String,
    pub data_type: DataType,
    pub enabled_task_types: Vec<StateAddress>,
    pub enabled_product_types: Vec<StateAddress>,
}

record!(TaskType, EntityKind::TaskType);
record!(ProductType, EntityKind::ProductType);
record!(EventParameterType, EntityKind::EventParameterType);
record!(EventType, EntityKind::EventType);
record!(PropertyType, EntityKind::PropertyType);

// =============================================================================
// ORGANIZATIONS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: String,
    pub admin_public_key: PublicKey,
    pub enabled_product_types: Vec<StateAddress>,
    /// Operator addresses, in creation order.
    pub operators: Vec<StateAddress>,
    /// Field addresses, in creation order.
    pub fields: Vec<StateAddress>,
    /// Every batch ever created by or transferred to this company.
    pub batches: Vec<StateAddress>,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub company: StateAddress,
    pub description: String,
    pub product: StateAddress,
    pub quantity: f64,
    pub location: Location,
    pub events: Vec<Event>,
    pub timestamp: u64,
}

record!(Company, EntityKind::Company);
record!(Field, EntityKind::Field);

// =============================================================================
// EVENTS
// =============================================================================

/// A value supplied for one Event Type parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    pub parameter_type: StateAddress,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventDetail {
    Description { values: Vec<ParameterValue> },
    /// Quantity consumed from the target.
    Transformation { quantity: f64 },
}

/// Immutable entry in a Field or Batch event log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: StateAddress,
    pub reporter: PublicKey,
    pub timestamp: u64,
    pub detail: EventDetail,
}

// =============================================================================
// BATCHES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub value: Value,
    pub reporter: PublicKey,
    pub timestamp: u64,
}

/// Time series of values recorded for one Property Type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub property_type: StateAddress,
    pub values: Vec<PropertyValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub authority: PublicKey,
    pub link: String,
    /// SHA-512 hex digest of the linked document.
    pub hash: String,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub sender_company: StateAddress,
    pub receiver_company: StateAddress,
    pub status: ProposalStatus,
    pub notes: String,
    pub motivation: String,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finalization {
    pub reporter: PublicKey,
    pub reason: FinalizationReason,
    pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    /// Current owner.
    pub company: StateAddress,
    pub product: StateAddress,
    pub quantity: f64,
    pub parent_fields: Vec<StateAddress>,
    pub parent_batches: Vec<StateAddress>,
    pub events: Vec<Event>,
    pub properties: Vec<Property>,
    pub certificates: Vec<Certificate>,
    pub proposals: Vec<Proposal>,
    pub finalization: Option<Finalization>,
    pub timestamp: u64,
}

impl Batch {
    pub fn is_finalized(&self) -> bool {
        self.finalization.is_some()
    }

    /// Index of the most recent proposal still in `Issued` state.
    pub fn issued_proposal(&self) -> Option<usize> {
        self.proposals
            .iter()
            .rposition(|proposal| proposal.status == ProposalStatus::Issued)
    }

    /// Append to the property's history, creating the entry on first use.
    pub fn record_property(&mut self, property_type: &StateAddress, value: PropertyValue) {
        match self
            .properties
            .iter_mut()
            .find(|property| &property.property_type == property_type)
        {
            Some(property) => property.values.push(value),
            None => self.properties.push(Property {
                property_type: property_type.clone(),
                values: vec![value],
            }),
        }
    }
}

record!(Batch, EntityKind::Batch);

// =============================================================================
// TRACEABLE TARGETS
// =============================================================================

/// Common view over Fields and Batches as event targets and
/// transformation inputs.
pub trait Traceable: Record {
    fn owner(&self) -> &StateAddress;
    fn product(&self) -> &StateAddress;
    fn quantity(&self) -> f64;
    fn is_finalized(&self) -> bool;
    fn push_event(&mut self, event: Event);

    /// Subtract `amount` and log the transformation event.
    fn consume(&mut self, amount: f64, event: Event);
}

impl Traceable for Field {
    fn owner(&self) -> &StateAddress {
        &self.company
    }

    fn product(&self) -> &StateAddress {
        &self.product
    }

    fn quantity(&self) -> f64 {
        self.quantity
    }

    fn is_finalized(&self) -> bool {
        false
    }

    fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    fn consume(&mut self, amount: f64, event: Event) {
        self.quantity -= amount;
        self.events.push(event);
    }
}

impl Traceable for Batch {
    fn owner(&self) -> &StateAddress {
        &self.company
    }

    fn product(&self) -> &StateAddress {
        &self.product
    }

    fn quantity(&self) -> f64 {
        self.quantity
    }

    fn is_finalized(&self) -> bool {
        Batch::is_finalized(self)
    }

    fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    fn consume(&mut self, amount: f64, event: Event) {
        self.quantity -= amount;
        self.events.push(event);
    }
}
