//! Authenticated-principal types shared by all modules.
//!
//! The core crate does NOT depend on any specific auth module. Handlers
//! receive a fully-resolved [`Principal`] through request extensions and
//! gate themselves with [`Principal::require_any`] — there is no ambient
//! request-global state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// The closed set of recognized roles.
///
/// Role names in tokens and storage are matched case-insensitively;
/// unrecognized names are ignored at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Fellow,
    SuccessOps,
    SocietySecretary,
    SocietyPresident,
    VicePresident,
    Finance,
    Cio,
}

impl Role {
    /// Canonical display name, as stored and shown to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fellow => "fellow",
            Self::SuccessOps => "success ops",
            Self::SocietySecretary => "society secretary",
            Self::SocietyPresident => "society president",
            Self::VicePresident => "vice president",
            Self::Finance => "finance",
            Self::Cio => "cio",
        }
    }

    /// Parse a role name, case-insensitively. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "fellow" => Some(Self::Fellow),
            "success ops" => Some(Self::SuccessOps),
            "society secretary" => Some(Self::SocietySecretary),
            "society president" => Some(Self::SocietyPresident),
            "vice president" => Some(Self::VicePresident),
            "finance" => Some(Self::Finance),
            "cio" => Some(Self::Cio),
            _ => None,
        }
    }

    /// Every recognized role, for seeding and listings.
    pub fn all() -> &'static [Role] {
        &[
            Self::Fellow,
            Self::SuccessOps,
            Self::SocietySecretary,
            Self::SocietyPresident,
            Self::VicePresident,
            Self::Finance,
            Self::Cio,
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller, resolved once per request by the auth
/// middleware and threaded to handlers via request extensions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// User id (the identity provider's subject).
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Society the user belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub society_id: Option<String>,
    /// Resolved role set (recognized roles only).
    pub roles: BTreeSet<Role>,
}

impl Principal {
    /// Whether the caller holds the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Any-intersection check: the caller passes if they hold at least
    /// one of `required`.
    pub fn has_any(&self, required: &[Role]) -> bool {
        required.iter().any(|r| self.roles.contains(r))
    }

    /// Gate a handler on the any-intersection predicate.
    pub fn require_any(&self, required: &[Role]) -> Result<(), ServiceError> {
        if self.has_any(required) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "You're unauthorized to perform this operation".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: &[Role]) -> Principal {
        Principal {
            user_id: "u1".into(),
            name: "Test User".into(),
            email: "test@example.com".into(),
            society_id: Some("s1".into()),
            roles: roles.iter().copied().collect(),
        }
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("Success Ops"), Some(Role::SuccessOps));
        assert_eq!(Role::parse("SUCCESS OPS"), Some(Role::SuccessOps));
        assert_eq!(Role::parse(" society secretary "), Some(Role::SocietySecretary));
        assert_eq!(Role::parse("Andelan"), None);
    }

    #[test]
    fn role_round_trips_through_canonical_name() {
        for role in Role::all() {
            assert_eq!(Role::parse(role.as_str()), Some(*role));
        }
    }

    #[test]
    fn require_any_is_any_intersection() {
        let p = principal(&[Role::Fellow, Role::SocietySecretary]);
        assert!(p.require_any(&[Role::SocietySecretary]).is_ok());
        assert!(p.require_any(&[Role::SuccessOps, Role::SocietySecretary]).is_ok());

        let err = p.require_any(&[Role::SuccessOps, Role::Cio]).unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));
    }

    #[test]
    fn empty_role_set_fails_every_gate() {
        let p = principal(&[]);
        assert!(p.require_any(&[Role::Fellow]).is_err());
    }
}
