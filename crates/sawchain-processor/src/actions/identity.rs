//! # Identity Directory
//!
//! System Admin, Certification Authorities and Operators. Company Admins
//! are created together with their company in [`crate::actions::company`].

use tracing::info;

use crate::actions::authorization::{
    ensure_key_unused, require_company_admin, require_system_admin,
};
use crate::actions::{parse_address, parse_addresses, Invocation, StateContext};
use crate::domain::{
    certification_authority_address, operator_address, system_admin_address,
    CertificationAuthority, Company, EntityKind, Operator, ProcessorError, ProductType, PublicKey,
    Rejection, SystemAdmin, TaskType,
};
use crate::payload::{CreateCertificationAuthorityAction, CreateOperatorAction, UpdateSystemAdminAction};

/// First writer wins. The signer becomes the System Admin.
pub fn create_system_admin(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
) -> Result<(), ProcessorError> {
    let address = system_admin_address();
    if ctx.exists(&address)? {
        return Err(Rejection::invariant("System Admin already exists").into());
    }
    ensure_key_unused(ctx, &inv.signer)?;

    let admin = SystemAdmin {
        public_key: inv.signer.clone(),
        timestamp: inv.timestamp,
    };
    ctx.stage(&address, &admin)?;
    info!(public_key = %inv.signer, "System Admin created");
    Ok(())
}

/// Hand the singleton over to a new, unused key.
pub fn update_system_admin(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &UpdateSystemAdminAction,
) -> Result<(), ProcessorError> {
    let new_key = PublicKey::parse("public_key", &action.public_key)?;
    let current = require_system_admin(ctx, &inv.signer)?;
    if new_key == current.public_key {
        return Err(Rejection::invariant("new System Admin key equals the current one").into());
    }
    ensure_key_unused(ctx, &new_key)?;

    let admin = SystemAdmin {
        public_key: new_key,
        timestamp: current.timestamp,
    };
    ctx.stage(&system_admin_address(), &admin)?;
    info!(public_key = %admin.public_key, "System Admin key replaced");
    Ok(())
}

pub fn create_certification_authority(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateCertificationAuthorityAction,
) -> Result<(), ProcessorError> {
    let public_key = PublicKey::parse("public_key", &action.public_key)?;
    inv.require_text("name", &action.name)?;
    inv.require_text("website", &action.website)?;
    let products = parse_addresses(
        "enabled_product_types",
        &action.enabled_product_types,
        EntityKind::ProductType,
    )?;

    require_system_admin(ctx, &inv.signer)?;
    ctx.require_all::<ProductType>(&products)?;
    ensure_key_unused(ctx, &public_key)?;

    let address = certification_authority_address(&public_key);
    let authority = CertificationAuthority {
        public_key,
        name: action.name.clone(),
        website: action.website.clone(),
        enabled_product_types: products,
        timestamp: inv.timestamp,
    };
    ctx.stage(&address, &authority)?;
    info!(address = %address, "Certification Authority created");
    Ok(())
}

/// Company Admin registers an operator for a task within their company.
pub fn create_operator(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateOperatorAction,
) -> Result<(), ProcessorError> {
    let public_key = PublicKey::parse("public_key", &action.public_key)?;
    let task = parse_address("task", &action.task, EntityKind::TaskType)?;

    let admin = require_company_admin(ctx, &inv.signer)?;
    ctx.require::<TaskType>(&task)?;
    let mut company = ctx.require::<Company>(&admin.company)?;
    ensure_key_unused(ctx, &public_key)?;

    let address = operator_address(&public_key);
    let operator = Operator {
        public_key,
        company: admin.company.clone(),
        task,
        timestamp: inv.timestamp,
    };
    company.operators.push(address.clone());
    ctx.stage(&address, &operator)?;
    ctx.stage(&admin.company, &company)?;
    info!(address = %address, company = %admin.company, "Operator created");
    Ok(())
}
