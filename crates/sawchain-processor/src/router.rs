//! # Action Router
//!
//! Exhaustive dispatch from [`Action`] to its handler, wrapped in the
//! single-commit transaction shape.

use crate::actions::{batches, company, events, identity, types, Invocation, StateContext};
use crate::config::ProcessorConfig;
use crate::domain::{ProcessorError, PublicKey, Rejection, StateAddress};
use crate::payload::{Action, Payload};
use crate::ports::StateStore;

/// Dispatch one action. Writes are staged in `ctx`, never committed here.
pub fn route(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &Action,
) -> Result<(), ProcessorError> {
    match action {
        Action::CreateSystemAdmin => identity::create_system_admin(ctx, inv),
        Action::UpdateSystemAdmin(a) => identity::update_system_admin(ctx, inv, a),
        Action::CreateCertificationAuthority(a) => {
            identity::create_certification_authority(ctx, inv, a)
        }
        Action::CreateCompany(a) => company::create_company(ctx, inv, a),
        Action::CreateField(a) => company::create_field(ctx, inv, a),
        Action::CreateOperator(a) => identity::create_operator(ctx, inv, a),
        Action::CreateTaskType(a) => types::create_task_type(ctx, inv, a),
        Action::CreateProductType(a) => types::create_product_type(ctx, inv, a),
        Action::CreateEventParameterType(a) => types::create_event_parameter_type(ctx, inv, a),
        Action::CreateEventType(a) => types::create_event_type(ctx, inv, a),
        Action::CreatePropertyType(a) => types::create_property_type(ctx, inv, a),
        Action::CreateDescriptionEvent(a) => events::create_description_event(ctx, inv, a),
        Action::CreateTransformationEvent(a) => events::create_transformation_event(ctx, inv, a),
        Action::RecordBatchProperty(a) => batches::record_batch_property(ctx, inv, a),
        Action::AddBatchCertificate(a) => batches::add_batch_certificate(ctx, inv, a),
        Action::CreateProposal(a) => batches::create_proposal(ctx, inv, a),
        Action::AnswerProposal(a) => batches::answer_proposal(ctx, inv, a),
        Action::FinalizeBatch(a) => batches::finalize_batch(ctx, inv, a),
    }
}

/// Validate and apply a decoded payload against `store`.
///
/// Returns the addresses written. On any error the store is untouched.
pub fn apply_payload(
    store: &mut dyn StateStore,
    config: &ProcessorConfig,
    signer: &str,
    payload: &Payload,
) -> Result<Vec<StateAddress>, ProcessorError> {
    if payload.timestamp == 0 {
        return Err(Rejection::malformed("timestamp is required").into());
    }
    let inv = Invocation {
        signer: PublicKey::parse("signer", signer)?,
        timestamp: payload.timestamp,
        config,
    };

    let mut ctx = StateContext::new(store);
    route(&mut ctx, &inv, &payload.action)?;
    ctx.commit()
}
