use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clearance_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Risk classification attached to roles and policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Routine, low-impact capability.
    Low,
    /// Elevated but bounded capability.
    Medium,
    /// Broad or destructive capability.
    High,
    /// Tenant-wide administrative capability.
    Critical,
}

impl RiskLevel {
    /// Returns a stable storage value for this risk level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(AppError::Validation(format!(
                "unknown risk level '{value}'"
            ))),
        }
    }
}

/// A named bundle of policy references, assignable to users within a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Unique human key in tenant scope.
    pub key: String,
    /// Display name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Ordered policy keys granted by the role.
    pub policies: Vec<String>,
    /// Free-form classification tags.
    pub tags: Vec<String>,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Indicates a system-managed role that rejects mutation.
    pub is_system: bool,
    /// Optimistic concurrency version, incremented on every update.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Actor that created the role.
    pub created_by: String,
    /// Actor that last updated the role.
    pub updated_by: String,
}

/// Validates a role's policy reference list: non-empty, duplicate-free,
/// every key non-blank.
pub fn validate_role_policies(policies: &[String]) -> AppResult<()> {
    if policies.is_empty() {
        return Err(AppError::Validation(
            "role must reference at least one policy".to_owned(),
        ));
    }

    let mut seen = HashSet::new();
    for key in policies {
        if key.trim().is_empty() {
            return Err(AppError::Validation(
                "policy key must not be empty or whitespace".to_owned(),
            ));
        }
        if !seen.insert(key.as_str()) {
            return Err(AppError::Validation(format!(
                "policy key '{key}' is referenced more than once"
            )));
        }
    }

    Ok(())
}
