use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use clearance_domain::{
    AssignmentStatus, Decision, Permission, PermissionPattern, PolicyConditions, RiskLevel,
};

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRoleInput {
    /// Unique human key in tenant scope.
    pub key: String,
    /// Display name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Policy keys granted by the role.
    pub policies: Vec<String>,
    /// Free-form classification tags.
    pub tags: Vec<String>,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Marks a system-managed role; set only by platform seeding.
    pub is_system: bool,
}

/// Patch payload for updating a role.
///
/// `version` carries the value the caller read; the store rejects the write
/// with a conflict when it no longer matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRoleInput {
    /// Replacement display name.
    pub display_name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement policy key list.
    pub policies: Option<Vec<String>>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// Replacement risk classification.
    pub risk_level: Option<RiskLevel>,
    /// Version observed before mutation.
    pub version: i64,
}

impl UpdateRoleInput {
    /// Returns the names of the fields this patch touches.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.display_name.is_some() {
            fields.push("display_name");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.policies.is_some() {
            fields.push("policies");
        }
        if self.tags.is_some() {
            fields.push("tags");
        }
        if self.risk_level.is_some() {
            fields.push("risk_level");
        }
        fields
    }
}

/// Input payload for creating a policy.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePolicyInput {
    /// Unique human key in tenant scope.
    pub key: String,
    /// Display name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Patterns granting permissions.
    pub allow: Vec<PermissionPattern>,
    /// Patterns denying permissions.
    pub deny: Vec<PermissionPattern>,
    /// Optional contextual conditions.
    pub conditions: Option<PolicyConditions>,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Marks a system-managed policy; set only by platform seeding.
    pub is_system: bool,
}

/// Patch payload for updating a policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePolicyInput {
    /// Replacement display name.
    pub display_name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement allow patterns.
    pub allow: Option<Vec<PermissionPattern>>,
    /// Replacement deny patterns.
    pub deny: Option<Vec<PermissionPattern>>,
    /// Replacement conditions.
    pub conditions: Option<PolicyConditions>,
    /// Version observed before mutation.
    pub version: i64,
}

impl UpdatePolicyInput {
    /// Returns the names of the fields this patch touches.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.display_name.is_some() {
            fields.push("display_name");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.allow.is_some() {
            fields.push("allow");
        }
        if self.deny.is_some() {
            fields.push("deny");
        }
        if self.conditions.is_some() {
            fields.push("conditions");
        }
        fields
    }
}

/// Input payload for granting a role to a user within a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignRoleInput {
    /// User the role is granted to.
    pub user_id: String,
    /// Key of the granted role.
    pub role_key: String,
    /// Resource boundary the grant applies to.
    pub scope: String,
    /// Optional expiry timestamp.
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional human-readable grant reason.
    pub reason: Option<String>,
}

/// Filters and cursor for role listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleListQuery {
    /// Optional risk-level filter.
    pub risk_level: Option<RiskLevel>,
    /// Optional system-role filter.
    pub is_system: Option<bool>,
    /// Maximum items returned.
    pub limit: usize,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

/// Filters and cursor for policy listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyListQuery {
    /// Optional risk-level filter.
    pub risk_level: Option<RiskLevel>,
    /// Optional system-policy filter.
    pub is_system: Option<bool>,
    /// Maximum items returned.
    pub limit: usize,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

/// Filters and cursor for assignment listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentListQuery {
    /// Optional user filter.
    pub user_id: Option<String>,
    /// Optional role-key filter.
    pub role_key: Option<String>,
    /// Optional status filter.
    pub status: Option<AssignmentStatus>,
    /// Maximum items returned.
    pub limit: usize,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Whether more items remain past this page.
    pub has_more: bool,
    /// Cursor resuming after the last item, when more remain.
    pub next_cursor: Option<String>,
}

/// Input payload for a single permission check.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatePermissionInput {
    /// User being checked.
    pub user_id: String,
    /// Requested permission.
    pub permission: Permission,
    /// Resource boundary of the request.
    pub resource_scope: String,
}

/// Input payload for checking several permissions in one scope.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluateBatchInput {
    /// User being checked.
    pub user_id: String,
    /// Resource boundary of the request.
    pub resource_scope: String,
    /// Permissions to check.
    pub permissions: Vec<Permission>,
}

/// Result of a batch permission check.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEvaluation {
    /// Decision per requested permission string.
    pub results: BTreeMap<String, Decision>,
    /// Aggregate counts over `results`.
    pub summary: EvaluationSummary,
}

/// Aggregate counts of a batch evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Number of evaluated permissions.
    pub total: usize,
    /// Number of allowed decisions.
    pub allowed: usize,
    /// Number of denied decisions.
    pub denied: usize,
}

/// Aggregated allow/deny outcome for one literal permission pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectivePermission {
    /// The pattern as written in the source policy.
    pub permission: String,
    /// Whether the pattern is granted.
    pub allowed: bool,
    /// Key of the policy the outcome came from.
    pub source: String,
    /// Conditions of the source policy, when present.
    pub conditions: Option<PolicyConditions>,
}

#[cfg(test)]
mod tests {
    use super::{UpdatePolicyInput, UpdateRoleInput};

    #[test]
    fn role_patch_reports_touched_fields_only() {
        let patch = UpdateRoleInput {
            display_name: Some("Operators".to_owned()),
            policies: Some(vec!["p1".to_owned()]),
            version: 3,
            ..UpdateRoleInput::default()
        };
        assert_eq!(patch.changed_fields(), vec!["display_name", "policies"]);
    }

    #[test]
    fn empty_policy_patch_reports_no_fields() {
        let patch = UpdatePolicyInput {
            version: 1,
            ..UpdatePolicyInput::default()
        };
        assert!(patch.changed_fields().is_empty());
    }
}
