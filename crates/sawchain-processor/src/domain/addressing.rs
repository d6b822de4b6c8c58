//! # State Addressing
//!
//! Deterministic mapping from (entity kind, natural key) to a 70-character
//! hexadecimal state address inside the SawChain namespace.
//!
//! ## Layout
//!
//! ```text
//! namespace (6) ‖ kind (2) ‖ sub-kind (2) ‖ sha512(key)[0..60]     users, types
//! namespace (6) ‖ kind (2) ‖ sha512(key)[0..62]                    company, batch
//! namespace (6) ‖ kind (2) ‖ sha512(id)[0..42] ‖ sha512(company)[0..20]   field
//! ```
//!
//! The System Admin lives at a fixed address whose hash part is all zeros.
//! Distinct kinds carry distinct prefixes, so equal keys never collide
//! across kinds.

use std::fmt;
use std::sync::OnceLock;

use sha2::{Digest, Sha512};

use super::value_objects::{PublicKey, StateAddress};

/// Transaction family served by this processor.
pub const FAMILY_NAME: &str = "SawChain";

/// Length of every state address, in hex characters.
pub const ADDRESS_LENGTH: usize = 70;

/// Length of the namespace prefix, in hex characters.
pub const NAMESPACE_LENGTH: usize = 6;

/// Length of a company identifier derived from its admin key.
pub const COMPANY_ID_LENGTH: usize = 10;

mod prefixes {
    pub const USERS: &str = "00";
    pub const TYPES: &str = "01";
    pub const COMPANY: &str = "02";
    pub const FIELD: &str = "03";
    pub const BATCH: &str = "04";

    pub const SYSTEM_ADMIN: &str = "10";
    pub const COMPANY_ADMIN: &str = "11";
    pub const OPERATOR: &str = "12";
    pub const CERTIFICATION_AUTHORITY: &str = "13";

    pub const TASK_TYPE: &str = "20";
    pub const PRODUCT_TYPE: &str = "21";
    pub const EVENT_PARAMETER_TYPE: &str = "22";
    pub const EVENT_TYPE: &str = "23";
    pub const PROPERTY_TYPE: &str = "24";
}

/// Every kind of record stored under the namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    SystemAdmin,
    CompanyAdmin,
    Operator,
    CertificationAuthority,
    TaskType,
    ProductType,
    EventParameterType,
    EventType,
    PropertyType,
    Company,
    Field,
    Batch,
}

impl EntityKind {
    /// All kinds, in prefix order.
    pub const ALL: [EntityKind; 12] = [
        EntityKind::SystemAdmin,
        EntityKind::CompanyAdmin,
        EntityKind::Operator,
        EntityKind::CertificationAuthority,
        EntityKind::TaskType,
        EntityKind::ProductType,
        EntityKind::EventParameterType,
        EntityKind::EventType,
        EntityKind::PropertyType,
        EntityKind::Company,
        EntityKind::Field,
        EntityKind::Batch,
    ];

    /// Prefix following the namespace (2 or 4 hex characters).
    pub fn prefix(self) -> String {
        let (kind, sub) = match self {
            EntityKind::SystemAdmin => (prefixes::USERS, prefixes::SYSTEM_ADMIN),
            EntityKind::CompanyAdmin => (prefixes::USERS, prefixes::COMPANY_ADMIN),
            EntityKind::Operator => (prefixes::USERS, prefixes::OPERATOR),
            EntityKind::CertificationAuthority => {
                (prefixes::USERS, prefixes::CERTIFICATION_AUTHORITY)
            }
            EntityKind::TaskType => (prefixes::TYPES, prefixes::TASK_TYPE),
            EntityKind::ProductType => (prefixes::TYPES, prefixes::PRODUCT_TYPE),
            EntityKind::EventParameterType => (prefixes::TYPES, prefixes::EVENT_PARAMETER_TYPE),
            EntityKind::EventType => (prefixes::TYPES, prefixes::EVENT_TYPE),
            EntityKind::PropertyType => (prefixes::TYPES, prefixes::PROPERTY_TYPE),
            EntityKind::Company => (prefixes::COMPANY, ""),
            EntityKind::Field => (prefixes::FIELD, ""),
            EntityKind::Batch => (prefixes::BATCH, ""),
        };
        format!("{kind}{sub}")
    }

    /// Classify a well-formed address by its prefix.
    pub fn of(address: &StateAddress) -> Option<EntityKind> {
        let rest = address.as_str().get(NAMESPACE_LENGTH..)?;
        Self::ALL
            .into_iter()
            .find(|kind| rest.starts_with(&kind.prefix()))
    }

    /// Human readable name, used in rejection messages.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::SystemAdmin => "System Admin",
            EntityKind::CompanyAdmin => "Company Admin",
            EntityKind::Operator => "Operator",
            EntityKind::CertificationAuthority => "Certification Authority",
            EntityKind::TaskType => "Task Type",
            EntityKind::ProductType => "Product Type",
            EntityKind::EventParameterType => "Event Parameter Type",
            EntityKind::EventType => "Event Type",
            EntityKind::PropertyType => "Property Type",
            EntityKind::Company => "Company",
            EntityKind::Field => "Field",
            EntityKind::Batch => "Batch",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// SHA-512 of `input`, hex encoded and truncated to `len` characters.
pub fn hash_and_slice(input: &str, len: usize) -> String {
    let mut digest = hex::encode(Sha512::digest(input.as_bytes()));
    digest.truncate(len);
    digest
}

/// Namespace prefix shared by every SawChain address.
pub fn namespace() -> &'static str {
    static NAMESPACE: OnceLock<String> = OnceLock::new();
    NAMESPACE.get_or_init(|| hash_and_slice(FAMILY_NAME, NAMESPACE_LENGTH))
}

fn build(kind: EntityKind, suffix: &str) -> StateAddress {
    StateAddress::from_codec(format!("{}{}{}", namespace(), kind.prefix(), suffix))
}

fn user_address(kind: EntityKind, public_key: &PublicKey) -> StateAddress {
    build(kind, &hash_and_slice(public_key.as_str(), 60))
}

fn type_address(kind: EntityKind, id: &str) -> StateAddress {
    build(kind, &hash_and_slice(id, 60))
}

// =============================================================================
// USERS
// =============================================================================

/// Fixed address of the System Admin singleton.
pub fn system_admin_address() -> StateAddress {
    build(EntityKind::SystemAdmin, &"0".repeat(60))
}

pub fn company_admin_address(public_key: &PublicKey) -> StateAddress {
    user_address(EntityKind::CompanyAdmin, public_key)
}

pub fn operator_address(public_key: &PublicKey) -> StateAddress {
    user_address(EntityKind::Operator, public_key)
}

pub fn certification_authority_address(public_key: &PublicKey) -> StateAddress {
    user_address(EntityKind::CertificationAuthority, public_key)
}

// =============================================================================
// TYPES
// =============================================================================

pub fn task_type_address(id: &str) -> StateAddress {
    type_address(EntityKind::TaskType, id)
}

pub fn product_type_address(id: &str) -> StateAddress {
    type_address(EntityKind::ProductType, id)
}

pub fn event_parameter_type_address(id: &str) -> StateAddress {
    type_address(EntityKind::EventParameterType, id)
}

pub fn event_type_address(id: &str) -> StateAddress {
    type_address(EntityKind::EventType, id)
}

pub fn property_type_address(id: &str) -> StateAddress {
    type_address(EntityKind::PropertyType, id)
}

// =============================================================================
// ORGANIZATIONS AND BATCHES
// =============================================================================

/// Company identifier derived from the admin's public key.
///
/// Links a CompanyAdmin to its Company without storing a back-reference
/// in the key itself.
pub fn company_id(admin: &PublicKey) -> String {
    hash_and_slice(admin.as_str(), COMPANY_ID_LENGTH)
}

pub fn company_address(company_id: &str) -> StateAddress {
    build(EntityKind::Company, &hash_and_slice(company_id, 62))
}

/// Field ids are unique per company, so the company id is part of the key.
pub fn field_address(field_id: &str, company_id: &str) -> StateAddress {
    let suffix = format!(
        "{}{}",
        hash_and_slice(field_id, 42),
        hash_and_slice(company_id, 20)
    );
    build(EntityKind::Field, &suffix)
}

pub fn batch_address(batch_id: &str) -> StateAddress {
    build(EntityKind::Batch, &hash_and_slice(batch_id, 62))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(fill: char) -> PublicKey {
        PublicKey::parse("key", &format!("02{}", fill.to_string().repeat(64)))
            .expect("valid key")
    }

    #[test]
    fn test_namespace_is_stable() {
        assert_eq!(namespace(), "87f67d");
        assert_eq!(namespace().len(), NAMESPACE_LENGTH);
    }

    #[test]
    fn test_every_address_has_fixed_width() {
        let k = key('a');
        let addresses = [
            system_admin_address(),
            company_admin_address(&k),
            operator_address(&k),
            certification_authority_address(&k),
            task_type_address("TT1"),
            product_type_address("PDT1"),
            event_parameter_type_address("EPT1"),
            event_type_address("ET1"),
            property_type_address("PRT1"),
            company_address(&company_id(&k)),
            field_address("FLD1", &company_id(&k)),
            batch_address("BTC1"),
        ];
        for address in &addresses {
            assert_eq!(address.as_str().len(), ADDRESS_LENGTH, "{address}");
            assert!(address.as_str().starts_with(namespace()));
        }
    }

    #[test]
    fn test_task_type_address_vector() {
        let address = task_type_address("TT1");
        assert_eq!(
            address.as_str(),
            "87f67d0120f7fd8688fd1862e98deaa75e5896f2e384e0a80055932d4ac9ad041cd0cb"
        );
    }

    #[test]
    fn test_company_id_vector() {
        assert_eq!(company_id(&key('a')), "821536abe0");
    }

    #[test]
    fn test_same_key_different_kinds_never_collide() {
        let k = key('b');
        assert_ne!(company_admin_address(&k), operator_address(&k));
        assert_ne!(operator_address(&k), certification_authority_address(&k));
        assert_ne!(task_type_address("X"), product_type_address("X"));
        assert_ne!(company_address("X"), batch_address("X"));
    }

    #[test]
    fn test_kind_classification() {
        let k = key('c');
        assert_eq!(
            EntityKind::of(&system_admin_address()),
            Some(EntityKind::SystemAdmin)
        );
        assert_eq!(EntityKind::of(&operator_address(&k)), Some(EntityKind::Operator));
        assert_eq!(
            EntityKind::of(&event_type_address("ET")),
            Some(EntityKind::EventType)
        );
        assert_eq!(
            EntityKind::of(&field_address("F", "C")),
            Some(EntityKind::Field)
        );
        assert_eq!(EntityKind::of(&batch_address("B")), Some(EntityKind::Batch));
    }

    #[test]
    fn test_field_address_scoped_by_company() {
        assert_ne!(field_address("F1", "aaaa"), field_address("F1", "bbbb"));
    }
}
