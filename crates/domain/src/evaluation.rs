use serde::{Deserialize, Serialize};

use crate::permission::{Permission, permission_matches};
use crate::policy::Policy;

/// Reason attached to an allowed decision.
pub const DECISION_REASON_GRANTED: &str = "Permission granted by policy";

/// Reason attached to the default-deny decision.
pub const DECISION_REASON_NOT_FOUND: &str =
    "Permission not found in any assigned policies";

/// Outcome of evaluating one permission against a set of matched policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the permission is granted.
    pub allowed: bool,
    /// Human-readable explanation of the outcome.
    pub reason: String,
    /// Keys of the policies that produced the outcome.
    pub matched_policy_keys: Vec<String>,
}

impl Decision {
    /// Builds a denial with the given reason and no matched policies.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            matched_policy_keys: Vec::new(),
        }
    }
}

/// Resolves a permission against matched policies with deny-over-allow
/// precedence.
///
/// A deny match in any policy is final regardless of allow matches in the
/// same or other policies, so the outcome does not depend on policy order.
/// Without a deny, any allow match grants; otherwise the default is deny.
#[must_use]
pub fn decide(policies: &[Policy], permission: &Permission) -> Decision {
    if let Some(denying) = policies
        .iter()
        .find(|policy| permission_matches(&policy.deny, permission))
    {
        return Decision {
            allowed: false,
            reason: format!("Explicitly denied by policy: {}", denying.key),
            matched_policy_keys: vec![denying.key.clone()],
        };
    }

    let allowing: Vec<String> = policies
        .iter()
        .filter(|policy| permission_matches(&policy.allow, permission))
        .map(|policy| policy.key.clone())
        .collect();

    if allowing.is_empty() {
        return Decision::denied(DECISION_REASON_NOT_FOUND);
    }

    Decision {
        allowed: true,
        reason: DECISION_REASON_GRANTED.to_owned(),
        matched_policy_keys: allowing,
    }
}
