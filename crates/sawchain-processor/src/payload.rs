//! # Transaction Payload
//!
//! Every transaction carries a [`Payload`]: a nonzero timestamp and exactly
//! one [`Action`]. Addresses and public keys arrive as raw strings and are
//! validated by the action handlers before any state is read.

use serde::{Deserialize, Serialize};

use crate::domain::{
    DataType, FinalizationReason, Location, ProcessorError, ProposalStatus, Rejection, Typology,
    UnitOfMeasure, Value,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub timestamp: u64,
    pub action: Action,
}

impl Payload {
    pub fn new(timestamp: u64, action: Action) -> Self {
        Self { timestamp, action }
    }

    /// Decode a payload. Undecodable bytes and unknown actions are malformed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Rejection> {
        bincode::deserialize(bytes)
            .map_err(|e| Rejection::malformed(format!("undecodable payload: {e}")))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ProcessorError> {
        bincode::serialize(self).map_err(|e| ProcessorError::Encoding(e.to_string()))
    }
}

/// Closed set of actions understood by the processor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    CreateSystemAdmin,
    UpdateSystemAdmin(UpdateSystemAdminAction),
    CreateCertificationAuthority(CreateCertificationAuthorityAction),
    CreateCompany(CreateCompanyAction),
    CreateField(CreateFieldAction),
    CreateOperator(CreateOperatorAction),
    CreateTaskType(CreateTaskTypeAction),
    CreateProductType(CreateProductTypeAction),
    CreateEventParameterType(CreateEventParameterTypeAction),
    CreateEventType(CreateEventTypeAction),
    CreatePropertyType(CreatePropertyTypeAction),
    CreateDescriptionEvent(CreateDescriptionEventAction),
    CreateTransformationEvent(CreateTransformationEventAction),
    RecordBatchProperty(RecordBatchPropertyAction),
    AddBatchCertificate(AddBatchCertificateAction),
    CreateProposal(CreateProposalAction),
    AnswerProposal(AnswerProposalAction),
    FinalizeBatch(FinalizeBatchAction),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateSystemAdmin => "CreateSystemAdmin",
            Action::UpdateSystemAdmin(_) => "UpdateSystemAdmin",
            Action::CreateCertificationAuthority(_) => "CreateCertificationAuthority",
            Action::CreateCompany(_) => "CreateCompany",
            Action::CreateField(_) => "CreateField",
            Action::CreateOperator(_) => "CreateOperator",
            Action::CreateTaskType(_) => "CreateTaskType",
            Action::CreateProductType(_) => "CreateProductType",
            Action::CreateEventParameterType(_) => "CreateEventParameterType",
            Action::CreateEventType(_) => "CreateEventType",
            Action::CreatePropertyType(_) => "CreatePropertyType",
            Action::CreateDescriptionEvent(_) => "CreateDescriptionEvent",
            Action::CreateTransformationEvent(_) => "CreateTransformationEvent",
            Action::RecordBatchProperty(_) => "RecordBatchProperty",
            Action::AddBatchCertificate(_) => "AddBatchCertificate",
            Action::CreateProposal(_) => "CreateProposal",
            Action::AnswerProposal(_) => "AnswerProposal",
            Action::FinalizeBatch(_) => "FinalizeBatch",
        }
    }
}

// =============================================================================
// IDENTITIES AND ORGANIZATIONS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateSystemAdminAction {
    pub public_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateCertificationAuthorityAction {
    pub public_key: String,
    pub name: String,
    pub website: String,
    pub enabled_product_types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateCompanyAction {
    pub name: String,
    pub description: String,
    pub website: String,
    /// Public key of the Company Admin created alongside.
    pub admin: String,
    pub enabled_product_types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateFieldAction {
    pub id: String,
    pub description: String,
    pub product: String,
    pub quantity: f64,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateOperatorAction {
    pub public_key: String,
    pub task: String,
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskTypeAction {
    pub id: String,
    pub task: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedProductTypeSpec {
    pub product_type: String,
    pub conversion_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateProductTypeAction {
    pub id: String,
    pub name: String,
    pub description: String,
    pub measure: UnitOfMeasure,
    pub derived_product_types: Vec<DerivedProductTypeSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateEventParameterTypeAction {
    pub id: String,
    pub name: String,
    pub data_type: DataType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventParameterSpec {
    pub parameter_type: String,
    pub required: bool,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateEventTypeAction {
    pub id: String,
    pub typology: Typology,
    pub name: String,
    pub description: String,
    pub enabled_task_types: Vec<String>,
    pub enabled_product_types: Vec<String>,
    pub parameters: Vec<EventParameterSpec>,
    pub enabled_derived_product_types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatePropertyTypeAction {
    pub id: String,
    pub name: String,
    pub data_type: DataType,
    pub enabled_task_types: Vec<String>,
    pub enabled_product_types: Vec<String>,
}

// =============================================================================
// EVENTS
// =============================================================================

/// Target of a description event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventTarget {
    Field(String),
    Batch(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterValueSpec {
    pub parameter_type: String,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateDescriptionEventAction {
    pub event_type: String,
    pub target: EventTarget,
    pub values: Vec<ParameterValueSpec>,
}

/// Inputs consumed by a transformation. Fields and batches never mix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransformationInputs {
    Fields(Vec<String>),
    Batches(Vec<String>),
}

impl TransformationInputs {
    pub fn len(&self) -> usize {
        match self {
            TransformationInputs::Fields(inputs) | TransformationInputs::Batches(inputs) => {
                inputs.len()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateTransformationEventAction {
    pub event_type: String,
    pub inputs: TransformationInputs,
    /// Parallel to `inputs`.
    pub quantities: Vec<f64>,
    pub derived_product: String,
    pub output_batch_id: String,
}

// =============================================================================
// BATCHES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordBatchPropertyAction {
    pub batch: String,
    pub property_type: String,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddBatchCertificateAction {
    pub batch: String,
    pub link: String,
    pub hash: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateProposalAction {
    pub batch: String,
    pub receiver_company: String,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerProposalAction {
    pub batch: String,
    pub response: ProposalStatus,
    pub motivation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalizeBatchAction {
    pub batch: String,
    pub reason: FinalizationReason,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_bytes_decode() {
        let payload = Payload::new(
            42,
            Action::CreateTaskType(CreateTaskTypeAction {
                id: "TT1".to_string(),
                task: "Harvesting".to_string(),
            }),
        );
        let decoded = Payload::from_bytes(&payload.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.action.name(), "CreateTaskType");
    }

    #[test]
    fn test_unknown_action_tag_is_malformed() {
        let mut bytes = 7u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&99u32.to_le_bytes());
        assert!(matches!(
            Payload::from_bytes(&bytes),
            Err(Rejection::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        assert!(Payload::from_bytes(&[1, 2, 3]).is_err());
    }
}
