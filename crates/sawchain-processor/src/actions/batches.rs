//! # Batch Ledger: Batch Lifecycle
//!
//! Properties, certificates, ownership transfer proposals and finalization.
//!
//! ## Proposal state machine
//!
//! ```text
//! ISSUED ──(receiver)──> ACCEPTED | REJECTED
//!        └─(sender)────> CANCELED
//! ```
//!
//! At most one proposal per batch is `Issued` at any time. Acceptance moves
//! `Batch::company` to the receiver; the sender keeps the batch in its
//! history log.

use tracing::info;

use crate::actions::authorization::{
    ensure_member_of, ensure_task_enabled, require_certification_authority, require_operator,
};
use crate::actions::{parse_address, Invocation, StateContext};
use crate::domain::{
    check_proposal_answer, check_value_matches, is_sha512_hex, Batch, Certificate, Company,
    EntityKind, Finalization, ProcessorError, Proposal, ProposalParty, ProposalStatus,
    PropertyType, PropertyValue, Rejection, StateAddress, Value,
};
use crate::payload::{
    AddBatchCertificateAction, AnswerProposalAction, CreateProposalAction, FinalizeBatchAction,
    RecordBatchPropertyAction,
};

fn ensure_active(address: &StateAddress, batch: &Batch) -> Result<(), Rejection> {
    if batch.is_finalized() {
        return Err(Rejection::invariant(format!("batch {address} is finalized")));
    }
    Ok(())
}

// =============================================================================
// PROPERTIES AND CERTIFICATES
// =============================================================================

pub fn record_batch_property(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &RecordBatchPropertyAction,
) -> Result<(), ProcessorError> {
    let address = parse_address("batch", &action.batch, EntityKind::Batch)?;
    let property_type_address =
        parse_address("property_type", &action.property_type, EntityKind::PropertyType)?;
    if let Value::Text(text) = &action.value {
        inv.check_text("value", text)?;
    }

    let operator = require_operator(ctx, &inv.signer)?;
    let mut batch = ctx.require::<Batch>(&address)?;
    ensure_member_of(&operator, &batch.company)?;
    ensure_active(&address, &batch)?;
    let property_type = ctx.require::<PropertyType>(&property_type_address)?;
    ensure_task_enabled(&operator, &property_type.enabled_task_types, "this property type")?;
    if !property_type.enabled_product_types.contains(&batch.product) {
        return Err(Rejection::invariant(format!(
            "product {} is not enabled for property type {property_type_address}",
            batch.product
        ))
        .into());
    }
    check_value_matches(property_type.data_type, &action.value)?;

    batch.record_property(
        &property_type_address,
        PropertyValue {
            value: action.value.clone(),
            reporter: inv.signer.clone(),
            timestamp: inv.timestamp,
        },
    );
    ctx.stage(&address, &batch)?;
    info!(batch = %address, property_type = %property_type_address, "Property recorded");
    Ok(())
}

pub fn add_batch_certificate(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &AddBatchCertificateAction,
) -> Result<(), ProcessorError> {
    let address = parse_address("batch", &action.batch, EntityKind::Batch)?;
    inv.require_text("link", &action.link)?;
    if !is_sha512_hex(&action.hash) {
        return Err(Rejection::malformed(format!(
            "hash must be a 128 character hex SHA-512 digest, got {} characters",
            action.hash.len()
        ))
        .into());
    }

    let authority = require_certification_authority(ctx, &inv.signer)?;
    let mut batch = ctx.require::<Batch>(&address)?;
    ensure_active(&address, &batch)?;
    if !authority.enabled_product_types.contains(&batch.product) {
        return Err(Rejection::unauthorized(format!(
            "certification authority is not enabled for product {}",
            batch.product
        ))
        .into());
    }

    batch.certificates.push(Certificate {
        authority: inv.signer.clone(),
        link: action.link.clone(),
        hash: action.hash.to_ascii_lowercase(),
        timestamp: inv.timestamp,
    });
    ctx.stage(&address, &batch)?;
    info!(batch = %address, certificates = batch.certificates.len(), "Certificate added");
    Ok(())
}

// =============================================================================
// OWNERSHIP TRANSFER
// =============================================================================

pub fn create_proposal(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateProposalAction,
) -> Result<(), ProcessorError> {
    let address = parse_address("batch", &action.batch, EntityKind::Batch)?;
    let receiver_address =
        parse_address("receiver_company", &action.receiver_company, EntityKind::Company)?;
    inv.check_text("notes", &action.notes)?;

    let operator = require_operator(ctx, &inv.signer)?;
    let mut batch = ctx.require::<Batch>(&address)?;
    ensure_member_of(&operator, &batch.company)?;
    ensure_active(&address, &batch)?;
    if receiver_address == batch.company {
        return Err(Rejection::invariant("receiver company already owns the batch").into());
    }
    let receiver = ctx.require::<Company>(&receiver_address)?;
    if !receiver.enabled_product_types.contains(&batch.product) {
        return Err(Rejection::invariant(format!(
            "receiver company does not handle product {}",
            batch.product
        ))
        .into());
    }
    if batch.issued_proposal().is_some() {
        return Err(Rejection::invariant(format!(
            "batch {address} already has an issued proposal"
        ))
        .into());
    }

    batch.proposals.push(Proposal {
        sender_company: batch.company.clone(),
        receiver_company: receiver_address.clone(),
        status: ProposalStatus::Issued,
        notes: action.notes.clone(),
        motivation: String::new(),
        timestamp: inv.timestamp,
    });
    ctx.stage(&address, &batch)?;
    info!(batch = %address, receiver = %receiver_address, "Proposal issued");
    Ok(())
}

pub fn answer_proposal(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &AnswerProposalAction,
) -> Result<(), ProcessorError> {
    let address = parse_address("batch", &action.batch, EntityKind::Batch)?;
    inv.check_text("motivation", &action.motivation)?;
    if !action.response.is_terminal() {
        return Err(Rejection::malformed("response must be ACCEPTED, REJECTED or CANCELED").into());
    }

    let operator = require_operator(ctx, &inv.signer)?;
    let mut batch = ctx.require::<Batch>(&address)?;
    let index = batch.issued_proposal().ok_or_else(|| {
        Rejection::invariant(format!("batch {address} has no issued proposal"))
    })?;
    let proposal = &batch.proposals[index];
    let party = if operator.company == proposal.sender_company {
        ProposalParty::Sender
    } else if operator.company == proposal.receiver_company {
        ProposalParty::Receiver
    } else {
        return Err(Rejection::unauthorized(format!(
            "operator of {} is not a party to the proposal",
            operator.company
        ))
        .into());
    };
    check_proposal_answer(party, proposal.status, action.response)?;
    let receiver_address = proposal.receiver_company.clone();

    if action.response == ProposalStatus::Accepted {
        let mut receiver = ctx.require::<Company>(&receiver_address)?;
        batch.company = receiver_address.clone();
        if !receiver.batches.contains(&address) {
            receiver.batches.push(address.clone());
        }
        ctx.stage(&receiver_address, &receiver)?;
    }
    let proposal = &mut batch.proposals[index];
    proposal.status = action.response;
    proposal.motivation = action.motivation.clone();
    ctx.stage(&address, &batch)?;
    info!(batch = %address, response = %action.response, owner = %batch.company, "Proposal answered");
    Ok(())
}

// =============================================================================
// FINALIZATION
// =============================================================================

pub fn finalize_batch(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &FinalizeBatchAction,
) -> Result<(), ProcessorError> {
    let address = parse_address("batch", &action.batch, EntityKind::Batch)?;
    inv.check_text("explanation", &action.explanation)?;

    let operator = require_operator(ctx, &inv.signer)?;
    let mut batch = ctx.require::<Batch>(&address)?;
    ensure_member_of(&operator, &batch.company)?;
    ensure_active(&address, &batch)?;
    if batch.issued_proposal().is_some() {
        return Err(Rejection::invariant(format!(
            "batch {address} has a pending proposal"
        ))
        .into());
    }

    batch.finalization = Some(Finalization {
        reporter: inv.signer.clone(),
        reason: action.reason,
        explanation: action.explanation.clone(),
    });
    ctx.stage(&address, &batch)?;
    info!(batch = %address, reason = ?action.reason, "Batch finalized");
    Ok(())
}
