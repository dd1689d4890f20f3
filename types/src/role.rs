//! Caller roles and their capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AgtError;

/// The role attached to an authenticated wallet.
///
/// Wallets absent from the admin table are `Participant`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Participant,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether this role may run season administration (activate, decide, seed...).
    pub fn can_administer(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Whether this role may grant or revoke admin rights.
    pub fn can_manage_admins(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AgtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "participant" => Ok(Self::Participant),
            "admin" => Ok(Self::Admin),
            "super_admin" | "super" => Ok(Self::SuperAdmin),
            _ => Err(AgtError::InvalidRole(s.to_string())),
        }
    }
}
