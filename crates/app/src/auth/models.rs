//! Auth data models.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Role carried by a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The verified identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uuid: Uuid,
    pub email: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this principal may act on a resource owned by `owner`.
    #[must_use]
    pub fn can_access(&self, owner: Uuid) -> bool {
        self.is_admin() || self.uuid == owner
    }
}

/// Input for issuing a credential.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub subject: Uuid,
    pub email: String,
    pub role: Role,
    pub expires_at: Timestamp,
}

/// A freshly issued credential. The token is only ever shown once.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub principal: Principal,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_and_admin_can_access() {
        let owner = Uuid::now_v7();

        let customer = Principal {
            uuid: owner,
            email: "owner@example.com".to_string(),
            role: Role::Customer,
        };

        let stranger = Principal {
            uuid: Uuid::now_v7(),
            email: "stranger@example.com".to_string(),
            role: Role::Customer,
        };

        let admin = Principal {
            uuid: Uuid::now_v7(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        };

        assert!(customer.can_access(owner));
        assert!(!stranger.can_access(owner));
        assert!(admin.can_access(owner));
    }

    #[test]
    fn role_parses_lowercase_names() {
        assert_eq!("admin".parse::<Role>().ok(), Some(Role::Admin));
        assert_eq!("customer".parse::<Role>().ok(), Some(Role::Customer));
        assert!("root".parse::<Role>().is_err());
    }
}
