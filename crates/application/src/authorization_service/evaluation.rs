use super::*;

use std::collections::BTreeMap;

use chrono::Utc;
use clearance_core::ActorIdentity;
use clearance_domain::{Decision, Permission, Policy, decide, scope_matches};
use serde_json::json;

use crate::authorization_ports::{
    BatchEvaluation, EffectivePermission, EvaluateBatchInput, EvaluatePermissionInput,
    EvaluationSummary, EventAction,
};

pub(super) const REASON_NO_ASSIGNMENTS: &str =
    "No active role assignments found for this scope";

/// Policies resolved for one user and resource scope.
struct EvaluationContext {
    /// False when no active assignment matched the scope.
    matched: bool,
    policies: Vec<Policy>,
}

impl AuthorizationService {
    /// Decides whether a user holds a permission within a resource scope.
    ///
    /// A denied outcome is a normal decision, not an error. Every
    /// evaluation emits an audit event; a failed emission never affects
    /// the returned decision.
    pub async fn evaluate_permission(
        &self,
        tenant_id: TenantId,
        input: EvaluatePermissionInput,
        actor: Option<&ActorIdentity>,
    ) -> AppResult<Decision> {
        let context = self
            .load_evaluation_context(tenant_id, &input.user_id, &input.resource_scope)
            .await?;
        let decision = Self::decide_in_context(&context, &input.permission);

        self.emit_evaluation(tenant_id, &input.user_id, &input.resource_scope, &input.permission, &decision, actor)
            .await;

        Ok(decision)
    }

    /// Decides several permissions against one resolved assignment set.
    ///
    /// Observable behavior matches independent `evaluate_permission` calls,
    /// including one evaluation event per permission; the context is only
    /// loaded once.
    pub async fn evaluate_batch(
        &self,
        tenant_id: TenantId,
        input: EvaluateBatchInput,
        actor: Option<&ActorIdentity>,
    ) -> AppResult<BatchEvaluation> {
        let context = self
            .load_evaluation_context(tenant_id, &input.user_id, &input.resource_scope)
            .await?;

        let mut results = BTreeMap::new();
        let mut allowed = 0usize;
        for permission in &input.permissions {
            let decision = Self::decide_in_context(&context, permission);
            if decision.allowed {
                allowed += 1;
            }

            self.emit_evaluation(tenant_id, &input.user_id, &input.resource_scope, permission, &decision, actor)
                .await;
            results.insert(permission.as_str().to_owned(), decision);
        }

        let total = results.len();
        Ok(BatchEvaluation {
            results,
            summary: EvaluationSummary {
                total,
                allowed,
                denied: total - allowed,
            },
        })
    }

    /// Aggregates the user's policies into one outcome per literal pattern.
    ///
    /// Aggregation works on patterns as written: per policy, allow entries
    /// never overwrite an existing deny for the same literal, deny entries
    /// always overwrite. Overlapping wildcard and concrete patterns stay
    /// separate entries.
    pub async fn get_effective_permissions(
        &self,
        tenant_id: TenantId,
        user_id: &str,
        scope: Option<&str>,
    ) -> AppResult<Vec<EffectivePermission>> {
        let now = Utc::now();
        let assignments = self.assignments.list_for_user(tenant_id, user_id).await?;
        let role_keys = unique_keys(
            assignments
                .iter()
                .filter(|assignment| assignment.grants_at(now))
                .filter(|assignment| {
                    scope.is_none_or(|resource| scope_matches(&assignment.scope, resource))
                })
                .map(|assignment| assignment.role_key.as_str()),
        );
        let policies = self.load_policies_for_roles(tenant_id, &role_keys).await?;

        let mut effective: BTreeMap<String, EffectivePermission> = BTreeMap::new();
        for policy in &policies {
            for pattern in &policy.allow {
                match effective.get(pattern.as_str()) {
                    // An existing deny is never overwritten by a later allow.
                    Some(existing) if !existing.allowed => {}
                    _ => {
                        effective.insert(
                            pattern.as_str().to_owned(),
                            EffectivePermission {
                                permission: pattern.as_str().to_owned(),
                                allowed: true,
                                source: policy.key.clone(),
                                conditions: policy.conditions.clone(),
                            },
                        );
                    }
                }
            }
            for pattern in &policy.deny {
                effective.insert(
                    pattern.as_str().to_owned(),
                    EffectivePermission {
                        permission: pattern.as_str().to_owned(),
                        allowed: false,
                        source: policy.key.clone(),
                        conditions: policy.conditions.clone(),
                    },
                );
            }
        }

        Ok(effective.into_values().collect())
    }

    fn decide_in_context(context: &EvaluationContext, permission: &Permission) -> Decision {
        if !context.matched {
            return Decision::denied(REASON_NO_ASSIGNMENTS);
        }
        decide(&context.policies, permission)
    }

    async fn load_evaluation_context(
        &self,
        tenant_id: TenantId,
        user_id: &str,
        resource_scope: &str,
    ) -> AppResult<EvaluationContext> {
        let now = Utc::now();
        let assignments = self.assignments.list_for_user(tenant_id, user_id).await?;
        let role_keys = unique_keys(
            assignments
                .iter()
                .filter(|assignment| assignment.grants_at(now))
                .filter(|assignment| scope_matches(&assignment.scope, resource_scope))
                .map(|assignment| assignment.role_key.as_str()),
        );
        if role_keys.is_empty() {
            return Ok(EvaluationContext {
                matched: false,
                policies: Vec::new(),
            });
        }

        let policies = self.load_policies_for_roles(tenant_id, &role_keys).await?;
        Ok(EvaluationContext {
            matched: true,
            policies,
        })
    }

    async fn load_policies_for_roles(
        &self,
        tenant_id: TenantId,
        role_keys: &[String],
    ) -> AppResult<Vec<Policy>> {
        if role_keys.is_empty() {
            return Ok(Vec::new());
        }

        let roles = self.roles.get_by_keys(tenant_id, role_keys).await?;
        let policy_keys = unique_keys(
            roles
                .iter()
                .flat_map(|role| role.policies.iter().map(String::as_str)),
        );
        if policy_keys.is_empty() {
            return Ok(Vec::new());
        }

        self.policies.get_by_keys(tenant_id, &policy_keys).await
    }

    async fn emit_evaluation(
        &self,
        tenant_id: TenantId,
        user_id: &str,
        resource_scope: &str,
        permission: &Permission,
        decision: &Decision,
        actor: Option<&ActorIdentity>,
    ) {
        let event_actor = actor
            .cloned()
            .unwrap_or_else(|| ActorIdentity::user(user_id));

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::PermissionEvaluated,
            user_id,
            json!({
                "permission": permission.as_str(),
                "resource_scope": resource_scope,
                "allowed": decision.allowed,
                "reason": decision.reason,
            }),
            &event_actor,
        ))
        .await;
    }
}

/// Collects keys preserving first-seen order and dropping duplicates.
fn unique_keys<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for key in keys {
        if seen.insert(key) {
            unique.push(key.to_owned());
        }
    }
    unique
}
