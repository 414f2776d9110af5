use chrono::{DateTime, Utc};
use clearance_core::TenantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission::PermissionPattern;
use crate::role::RiskLevel;

/// Contextual conditions attached to a policy.
///
/// Condition enforcement happens in the calling environment; the engine
/// stores and surfaces them alongside effective permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConditions {
    /// Requires a multi-factor-authenticated session.
    pub requires_mfa: bool,
    /// Restricts use to business hours.
    pub only_business_hours: bool,
    /// Device types allowed to exercise the grant.
    pub allowed_device_types: Vec<String>,
    /// Source addresses allowed to exercise the grant.
    pub ip_allowlist: Vec<String>,
    /// Maximum session duration in minutes.
    pub max_session_duration_minutes: Option<u32>,
}

/// A named bundle of allow/deny permission patterns plus optional conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Stable policy identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Unique human key in tenant scope.
    pub key: String,
    /// Display name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Patterns granting permissions.
    pub allow: Vec<PermissionPattern>,
    /// Patterns denying permissions; deny always wins over allow.
    pub deny: Vec<PermissionPattern>,
    /// Optional contextual conditions.
    pub conditions: Option<PolicyConditions>,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Indicates a system-managed policy that rejects mutation.
    pub is_system: bool,
    /// Optimistic concurrency version, incremented on every update.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Actor that created the policy.
    pub created_by: String,
    /// Actor that last updated the policy.
    pub updated_by: String,
}
