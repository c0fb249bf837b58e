//! Staff identity and roles.

use bagworks_core::StaffId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Staff role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    /// Full access to order and coupon management.
    Admin,
    /// Read-only access to store data.
    Viewer,
}

impl StaffRole {
    /// Whether this role may mutate store data.
    #[must_use]
    pub const fn can_write(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid staff role: {s}")),
        }
    }
}

/// A back-office staff member.
#[derive(Debug, Clone, Serialize)]
pub struct Staff {
    pub id: StaffId,
    pub email: String,
    pub name: String,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        assert_eq!("admin".parse::<StaffRole>().unwrap(), StaffRole::Admin);
        assert_eq!(StaffRole::Viewer.to_string(), "viewer");
        assert!("root".parse::<StaffRole>().is_err());
    }

    #[test]
    fn test_viewer_cannot_write() {
        assert!(StaffRole::Admin.can_write());
        assert!(!StaffRole::Viewer.can_write());
    }
}
