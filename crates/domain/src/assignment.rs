use std::str::FromStr;

use chrono::{DateTime, Utc};
use clearance_core::{AppError, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Grant is in effect.
    Active,
    /// Grant was explicitly revoked.
    Inactive,
    /// Grant lapsed through its expiry timestamp.
    Expired,
}

impl AssignmentStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }

    /// Returns whether this status may transition into `next`.
    ///
    /// The state set is closed: active grants may be revoked or expired,
    /// nothing transitions back to active.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Inactive) | (Self::Active, Self::Expired)
        )
    }
}

impl FromStr for AssignmentStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            _ => Err(AppError::Validation(format!(
                "unknown assignment status '{value}'"
            ))),
        }
    }
}

/// A grant of a role to a user within a scope, with lifecycle status.
///
/// Assignments are never hard-deleted; revocation and expiry are status
/// transitions so the grant history stays auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Stable assignment identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// User the role is granted to.
    pub user_id: String,
    /// Key of the granted role.
    pub role_key: String,
    /// Resource boundary the grant applies to.
    pub scope: String,
    /// Lifecycle status.
    pub status: AssignmentStatus,
    /// Optional expiry timestamp.
    pub expires_at: Option<DateTime<Utc>>,
    /// Actor that granted the role.
    pub granted_by: String,
    /// Grant timestamp.
    pub granted_at: DateTime<Utc>,
    /// Optional human-readable grant reason.
    pub reason: Option<String>,
    /// Optimistic concurrency version, incremented on every update.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl RoleAssignment {
    /// Returns whether the assignment has lapsed through its expiry time.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Returns whether the grant is in effect at `now`.
    ///
    /// An assignment whose `expires_at` has passed no longer grants
    /// anything, even when its stored status is still nominally active.
    #[must_use]
    pub fn grants_at(&self, now: DateTime<Utc>) -> bool {
        self.status == AssignmentStatus::Active && !self.is_expired_at(now)
    }
}
