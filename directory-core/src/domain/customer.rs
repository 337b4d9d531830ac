//! Customer data model and role normalisation.

use std::fmt;
use std::str::FromStr;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::{NoContext, Timestamp, Uuid};

/// Validation errors raised when constructing customer values from input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerValidationError {
    #[error("customer id must not be empty")]
    EmptyId,
    #[error("customer name must not be empty")]
    EmptyName,
    #[error("customer email must not be empty")]
    EmptyEmail,
    #[error("customer email must contain '@'")]
    InvalidEmail,
    #[error("unknown role selector '{value}' (expected all, admin, or manager)")]
    UnknownRoleSelector { value: String },
}

/// Canonical customer role.
///
/// Every record held in memory or in the local store carries one of these two
/// values. External strings only become a `Role` through [`normalize_role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Role {
    Admin,
    Manager,
}

impl Role {
    /// Stored and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        normalize_role(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        normalize_role(&value)
    }
}

/// Map an arbitrary role label onto the canonical [`Role`] set.
///
/// The mapping is total and lossy: the trimmed, lowercased input maps to
/// [`Role::Admin`] when it contains `"admin"` and to [`Role::Manager`]
/// otherwise, including for empty or unrecognised labels.
///
/// # Examples
///
/// ```
/// use directory_core::domain::{Role, normalize_role};
///
/// assert_eq!(normalize_role("ADMIN"), Role::Admin);
/// assert_eq!(normalize_role("  Administrator "), Role::Admin);
/// assert_eq!(normalize_role("team_manager"), Role::Manager);
/// assert_eq!(normalize_role(""), Role::Manager);
/// ```
pub fn normalize_role(input: &str) -> Role {
    if input.trim().to_lowercase().contains("admin") {
        Role::Admin
    } else {
        Role::Manager
    }
}

/// View-level role filter. `All` disables role filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleSelector {
    #[default]
    All,
    Admin,
    Manager,
}

impl RoleSelector {
    /// The role this selector narrows to, or `None` for [`RoleSelector::All`].
    pub const fn role(self) -> Option<Role> {
        match self {
            Self::All => None,
            Self::Admin => Some(Role::Admin),
            Self::Manager => Some(Role::Manager),
        }
    }

    /// Whether a record with `role` passes this selector.
    pub fn matches(self, role: Role) -> bool {
        self.role().is_none_or(|selected| selected == role)
    }
}

impl From<Role> for RoleSelector {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => Self::Admin,
            Role::Manager => Self::Manager,
        }
    }
}

impl fmt::Display for RoleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Admin => f.write_str("Admin"),
            Self::Manager => f.write_str("Manager"),
        }
    }
}

impl FromStr for RoleSelector {
    type Err = CustomerValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            _ => Err(CustomerValidationError::UnknownRoleSelector {
                value: value.to_owned(),
            }),
        }
    }
}

/// Opaque customer identifier, unique and immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    /// Validate and construct a [`CustomerId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, CustomerValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a fresh identifier from the clock's current time plus random
    /// bits (UUIDv7), so rapid sequential calls within one millisecond still
    /// yield distinct ids.
    pub fn generate(clock: &dyn Clock) -> Self {
        let now = clock.utc();
        let seconds = u64::try_from(now.timestamp()).unwrap_or_default();
        let timestamp = Timestamp::from_unix(NoContext, seconds, now.timestamp_subsec_nanos());
        Self::from(Uuid::new_v7(timestamp))
    }

    fn from_owned(id: String) -> Result<Self, CustomerValidationError> {
        if id.trim().is_empty() {
            return Err(CustomerValidationError::EmptyId);
        }
        Ok(Self(id))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CustomerId> for String {
    fn from(value: CustomerId) -> Self {
        value.0
    }
}

impl From<Uuid> for CustomerId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<String> for CustomerId {
    type Error = CustomerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Validated input for creating a customer. The id is assigned later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    name: String,
    email: String,
    role: Role,
}

impl NewCustomer {
    /// Trim and validate user-supplied fields.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerValidationError`] when the name or email is blank, or
    /// when the email lacks an `@`.
    pub fn new(
        name: impl AsRef<str>,
        email: impl AsRef<str>,
        role: Role,
    ) -> Result<Self, CustomerValidationError> {
        let name = name.as_ref().trim();
        let email = email.as_ref().trim();
        if name.is_empty() {
            return Err(CustomerValidationError::EmptyName);
        }
        if email.is_empty() {
            return Err(CustomerValidationError::EmptyEmail);
        }
        if !email.contains('@') {
            return Err(CustomerValidationError::InvalidEmail);
        }
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
            role,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Attach an identifier, producing a full record.
    pub fn into_customer(self, id: CustomerId) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            role: self.role,
        }
    }
}

/// Customer record.
///
/// ## Invariants
/// - `id` is non-empty and never changes after creation.
/// - `role` is canonical by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: String,
    role: Role,
}

impl Customer {
    /// Build a record from already-typed parts.
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for role normalisation and value validation.

    use std::collections::HashSet;

    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::test_support::FixedClock;

    #[rstest]
    #[case("ADMIN", Role::Admin)]
    #[case("admin", Role::Admin)]
    #[case("  Administrator  ", Role::Admin)]
    #[case("SYSTEM_ADMIN", Role::Admin)]
    #[case("sysadmin", Role::Admin)]
    #[case("Manager", Role::Manager)]
    #[case("team_manager", Role::Manager)]
    #[case("", Role::Manager)]
    #[case("   ", Role::Manager)]
    #[case("adm in", Role::Manager)]
    #[case("🦀", Role::Manager)]
    fn normalize_role_maps_labels(#[case] input: &str, #[case] expected: Role) {
        assert_eq!(normalize_role(input), expected);
    }

    #[test]
    fn role_deserializes_through_normalizer() {
        let role: Role = serde_json::from_str("\"Administrator\"").expect("decode");
        assert_eq!(role, Role::Admin);
        let role: Role = serde_json::from_str("\"viewer\"").expect("decode");
        assert_eq!(role, Role::Manager);
    }

    #[test]
    fn role_serializes_canonically() {
        assert_eq!(
            serde_json::to_string(&Role::Admin).expect("encode"),
            "\"Admin\""
        );
    }

    #[rstest]
    #[case(RoleSelector::All, Role::Admin, true)]
    #[case(RoleSelector::All, Role::Manager, true)]
    #[case(RoleSelector::Admin, Role::Admin, true)]
    #[case(RoleSelector::Admin, Role::Manager, false)]
    #[case(RoleSelector::Manager, Role::Admin, false)]
    fn selector_matches_roles(
        #[case] selector: RoleSelector,
        #[case] role: Role,
        #[case] expected: bool,
    ) {
        assert_eq!(selector.matches(role), expected);
    }

    #[rstest]
    #[case("all", RoleSelector::All)]
    #[case(" Admin ", RoleSelector::Admin)]
    #[case("MANAGER", RoleSelector::Manager)]
    fn selector_parses_case_insensitively(#[case] input: &str, #[case] expected: RoleSelector) {
        assert_eq!(input.parse::<RoleSelector>(), Ok(expected));
    }

    #[test]
    fn selector_rejects_unknown_values() {
        let error = "owner".parse::<RoleSelector>().expect_err("unknown selector");
        assert_eq!(
            error,
            CustomerValidationError::UnknownRoleSelector {
                value: "owner".to_owned()
            }
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn customer_id_rejects_blank(#[case] input: &str) {
        assert_eq!(CustomerId::new(input), Err(CustomerValidationError::EmptyId));
    }

    #[test]
    fn generated_ids_are_unique_under_a_frozen_clock() {
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0)
                .single()
                .expect("valid time"),
        );
        let ids: HashSet<_> = (0..1_000).map(|_| CustomerId::generate(&clock)).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[rstest]
    #[case("", "a@b.c", CustomerValidationError::EmptyName)]
    #[case("Ada", "  ", CustomerValidationError::EmptyEmail)]
    #[case("Ada", "ada.example.com", CustomerValidationError::InvalidEmail)]
    fn new_customer_validates_fields(
        #[case] name: &str,
        #[case] email: &str,
        #[case] expected: CustomerValidationError,
    ) {
        assert_eq!(NewCustomer::new(name, email, Role::Admin), Err(expected));
    }

    #[test]
    fn new_customer_trims_fields() {
        let input = NewCustomer::new("  Ada Lovelace ", " ada@example.com ", Role::Admin)
            .expect("valid input");
        let id = CustomerId::new("c-1").expect("valid id");
        let customer = input.into_customer(id.clone());
        assert_eq!(customer.id(), &id);
        assert_eq!(customer.name(), "Ada Lovelace");
        assert_eq!(customer.email(), "ada@example.com");
    }
}
