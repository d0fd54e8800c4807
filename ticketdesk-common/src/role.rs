//! User role.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ticket::ParseEnumError;

/// Closed set of roles a user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May assign users to any ticket. Never assignable itself.
    Admin,
    Customer,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Customer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    /// Exact match only; roles are stored and compared lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}
