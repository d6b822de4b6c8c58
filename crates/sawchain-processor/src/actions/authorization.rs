//! # Role Resolution
//!
//! A public key holds at most one role. The role is found by probing the
//! System Admin singleton and the three per-key user addresses; every
//! authorization decision goes through [`resolve_role`].

use crate::actions::StateContext;
use crate::domain::{
    certification_authority_address, company_admin_address, operator_address,
    system_admin_address, CertificationAuthority, CompanyAdmin, Operator, ProcessorError,
    PublicKey, Rejection, StateAddress, SystemAdmin,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Role {
    SystemAdmin(SystemAdmin),
    CompanyAdmin(CompanyAdmin),
    Operator(Operator),
    CertificationAuthority(CertificationAuthority),
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::SystemAdmin(_) => "System Admin",
            Role::CompanyAdmin(_) => "Company Admin",
            Role::Operator(_) => "Operator",
            Role::CertificationAuthority(_) => "Certification Authority",
        }
    }
}

/// Find the role held by `public_key`, if any.
pub fn resolve_role(
    ctx: &mut StateContext<'_>,
    public_key: &PublicKey,
) -> Result<Option<Role>, ProcessorError> {
    let system_admin = system_admin_address();
    let company_admin = company_admin_address(public_key);
    let operator = operator_address(public_key);
    let authority = certification_authority_address(public_key);
    ctx.prefetch(&[
        system_admin.clone(),
        company_admin.clone(),
        operator.clone(),
        authority.clone(),
    ])?;

    if let Some(admin) = ctx.load::<SystemAdmin>(&system_admin)? {
        if &admin.public_key == public_key {
            return Ok(Some(Role::SystemAdmin(admin)));
        }
    }
    if let Some(admin) = ctx.load::<CompanyAdmin>(&company_admin)? {
        return Ok(Some(Role::CompanyAdmin(admin)));
    }
    if let Some(operator) = ctx.load::<Operator>(&operator)? {
        return Ok(Some(Role::Operator(operator)));
    }
    if let Some(authority) = ctx.load::<CertificationAuthority>(&authority)? {
        return Ok(Some(Role::CertificationAuthority(authority)));
    }
    Ok(None)
}

fn wrong_role(required: &str, found: Option<Role>) -> ProcessorError {
    let held = found.as_ref().map_or("no role", Role::name);
    Rejection::unauthorized(format!("signer must be a {required}, holds {held}")).into()
}

pub fn require_system_admin(
    ctx: &mut StateContext<'_>,
    signer: &PublicKey,
) -> Result<SystemAdmin, ProcessorError> {
    match resolve_role(ctx, signer)? {
        Some(Role::SystemAdmin(admin)) => Ok(admin),
        other => Err(wrong_role("System Admin", other)),
    }
}

pub fn require_company_admin(
    ctx: &mut StateContext<'_>,
    signer: &PublicKey,
) -> Result<CompanyAdmin, ProcessorError> {
    match resolve_role(ctx, signer)? {
        Some(Role::CompanyAdmin(admin)) => Ok(admin),
        other => Err(wrong_role("Company Admin", other)),
    }
}

pub fn require_operator(
    ctx: &mut StateContext<'_>,
    signer: &PublicKey,
) -> Result<Operator, ProcessorError> {
    match resolve_role(ctx, signer)? {
        Some(Role::Operator(operator)) => Ok(operator),
        other => Err(wrong_role("Operator", other)),
    }
}

pub fn require_certification_authority(
    ctx: &mut StateContext<'_>,
    signer: &PublicKey,
) -> Result<CertificationAuthority, ProcessorError> {
    match resolve_role(ctx, signer)? {
        Some(Role::CertificationAuthority(authority)) => Ok(authority),
        other => Err(wrong_role("Certification Authority", other)),
    }
}

/// The operator must belong to the company owning the target.
pub fn ensure_member_of(operator: &Operator, owner: &StateAddress) -> Result<(), Rejection> {
    if &operator.company != owner {
        return Err(Rejection::unauthorized(format!(
            "operator of {} cannot act on assets of {owner}",
            operator.company
        )));
    }
    Ok(())
}

/// The operator's task must be enabled by the type being used.
pub fn ensure_task_enabled(
    operator: &Operator,
    enabled_task_types: &[StateAddress],
    type_name: &str,
) -> Result<(), Rejection> {
    if !enabled_task_types.contains(&operator.task) {
        return Err(Rejection::unauthorized(format!(
            "task {} is not enabled for {type_name}",
            operator.task
        )));
    }
    Ok(())
}

/// Public keys are unique across every role.
pub fn ensure_key_unused(
    ctx: &mut StateContext<'_>,
    public_key: &PublicKey,
) -> Result<(), ProcessorError> {
    if let Some(role) = resolve_role(ctx, public_key)? {
        return Err(Rejection::invariant(format!(
            "public key {public_key} is already registered as {}",
            role.name()
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStateStore;
    use crate::domain::{company_address, task_type_address};

    fn key(fill: char) -> PublicKey {
        PublicKey::parse("key", &format!("03{}", fill.to_string().repeat(64))).unwrap()
    }

    #[test]
    fn test_unknown_key_has_no_role() {
        let mut store = InMemoryStateStore::new();
        let mut ctx = StateContext::new(&mut store);
        assert_eq!(resolve_role(&mut ctx, &key('1')).unwrap(), None);
        assert!(ensure_key_unused(&mut ctx, &key('1')).is_ok());
    }

    #[test]
    fn test_system_admin_matched_by_key() {
        let mut store = InMemoryStateStore::new();
        let mut ctx = StateContext::new(&mut store);
        let admin = SystemAdmin {
            public_key: key('a'),
            timestamp: 1,
        };
        ctx.stage(&system_admin_address(), &admin).unwrap();

        assert_eq!(
            resolve_role(&mut ctx, &key('a')).unwrap(),
            Some(Role::SystemAdmin(admin))
        );
        assert_eq!(resolve_role(&mut ctx, &key('b')).unwrap(), None);
        let err = require_system_admin(&mut ctx, &key('b')).unwrap_err();
        assert!(matches!(err.rejection(), Some(Rejection::Unauthorized(_))));
    }

    #[test]
    fn test_operator_role_and_membership() {
        let mut store = InMemoryStateStore::new();
        let mut ctx = StateContext::new(&mut store);
        let operator = Operator {
            public_key: key('c'),
            company: company_address("c1"),
            task: task_type_address("TT1"),
            timestamp: 1,
        };
        ctx.stage(&operator_address(&key('c')), &operator).unwrap();

        let found = require_operator(&mut ctx, &key('c')).unwrap();
        assert!(ensure_member_of(&found, &company_address("c1")).is_ok());
        assert!(ensure_member_of(&found, &company_address("c2")).is_err());
        assert!(ensure_task_enabled(&found, &[task_type_address("TT1")], "event type").is_ok());
        assert!(ensure_task_enabled(&found, &[], "event type").is_err());
        assert!(require_company_admin(&mut ctx, &key('c')).is_err());
        assert!(ensure_key_unused(&mut ctx, &key('c')).is_err());
    }
}
