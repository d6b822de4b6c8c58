//! # Company Directory
//!
//! Companies are created by the System Admin together with their Company
//! Admin. Fields are registered by the Company Admin.

use tracing::info;

use crate::actions::authorization::{ensure_key_unused, require_company_admin, require_system_admin};
use crate::actions::{parse_address, parse_addresses, Invocation, StateContext};
use crate::domain::{
    check_quantity, company_address, company_admin_address, company_id, field_address, Company,
    CompanyAdmin, EntityKind, Field, ProcessorError, ProductType, PublicKey, Rejection,
};
use crate::payload::{CreateCompanyAction, CreateFieldAction};

pub fn create_company(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateCompanyAction,
) -> Result<(), ProcessorError> {
    inv.require_text("name", &action.name)?;
    inv.require_text("description", &action.description)?;
    inv.require_text("website", &action.website)?;
    let admin_key = PublicKey::parse("admin", &action.admin)?;
    let products = parse_addresses(
        "enabled_product_types",
        &action.enabled_product_types,
        EntityKind::ProductType,
    )?;

    require_system_admin(ctx, &inv.signer)?;
    ctx.require_all::<ProductType>(&products)?;
    ensure_key_unused(ctx, &admin_key)?;

    let id = company_id(&admin_key);
    let address = company_address(&id);
    ctx.ensure_vacant(&address)?;

    let admin_address = company_admin_address(&admin_key);
    let admin = CompanyAdmin {
        public_key: admin_key.clone(),
        company: address.clone(),
        timestamp: inv.timestamp,
    };
    let company = Company {
        id,
        name: action.name.clone(),
        description: action.description.clone(),
        website: action.website.clone(),
        admin_public_key: admin_key,
        enabled_product_types: products,
        operators: Vec::new(),
        fields: Vec::new(),
        batches: Vec::new(),
        timestamp: inv.timestamp,
    };
    ctx.stage(&address, &company)?;
    ctx.stage(&admin_address, &admin)?;
    info!(company = %address, id = %company.id, "Company created");
    Ok(())
}

pub fn create_field(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateFieldAction,
) -> Result<(), ProcessorError> {
    inv.require_text("id", &action.id)?;
    inv.require_text("description", &action.description)?;
    let product = parse_address("product", &action.product, EntityKind::ProductType)?;
    check_quantity("quantity", action.quantity)?;
    if !action.location.is_valid() {
        return Err(Rejection::malformed("location is outside valid coordinates").into());
    }

    let admin = require_company_admin(ctx, &inv.signer)?;
    let mut company = ctx.require::<Company>(&admin.company)?;
    ctx.require::<ProductType>(&product)?;
    if !company.enabled_product_types.contains(&product) {
        return Err(Rejection::invariant(format!(
            "product {product} is not enabled for company {}",
            admin.company
        ))
        .into());
    }
    let address = field_address(&action.id, &company.id);
    ctx.ensure_vacant(&address)?;

    let field = Field {
        id: action.id.clone(),
        company: admin.company.clone(),
        description: action.description.clone(),
        product,
        quantity: action.quantity,
        location: action.location,
        events: Vec::new(),
        timestamp: inv.timestamp,
    };
    company.fields.push(address.clone());
    ctx.stage(&address, &field)?;
    ctx.stage(&admin.company, &company)?;
    info!(field = %address, company = %admin.company, "Field created");
    Ok(())
}
