//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_assignment_store;
mod in_memory_policy_store;
mod in_memory_role_store;
mod pagination;
mod tracing_event_publisher;

pub use in_memory_assignment_store::InMemoryAssignmentStore;
pub use in_memory_policy_store::InMemoryPolicyStore;
pub use in_memory_role_store::InMemoryRoleStore;
pub use tracing_event_publisher::TracingEventPublisher;

#[cfg(test)]
mod engine_tests {
    use std::sync::Arc;

    use clearance_application::{
        AssignRoleInput, AuthorizationService, CreatePolicyInput, CreateRoleInput,
        EvaluateBatchInput, EvaluatePermissionInput,
    };
    use clearance_core::{ActorIdentity, TenantId};
    use clearance_domain::{Permission, PermissionPattern, RiskLevel};

    use super::{
        InMemoryAssignmentStore, InMemoryPolicyStore, InMemoryRoleStore, TracingEventPublisher,
    };

    fn engine() -> AuthorizationService {
        AuthorizationService::new(
            Arc::new(InMemoryRoleStore::new()),
            Arc::new(InMemoryPolicyStore::new()),
            Arc::new(InMemoryAssignmentStore::new()),
            Arc::new(TracingEventPublisher),
        )
    }

    fn patterns(values: &[&str]) -> Vec<PermissionPattern> {
        values
            .iter()
            .map(|value| PermissionPattern::new(*value).unwrap_or_else(|_| unreachable!()))
            .collect()
    }

    fn permission(value: &str) -> Permission {
        Permission::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn device_role_scenario_end_to_end() {
        let service = engine();
        let tenant_id = TenantId::new();
        let admin = ActorIdentity::user("admin");

        let created_policy = service
            .create_policy(
                tenant_id,
                CreatePolicyInput {
                    key: "p1".to_owned(),
                    display_name: "Device management".to_owned(),
                    description: String::new(),
                    allow: patterns(&["devices.*.*"]),
                    deny: patterns(&["devices.delete.*"]),
                    conditions: None,
                    risk_level: RiskLevel::High,
                    is_system: false,
                },
                &admin,
            )
            .await;
        assert!(created_policy.is_ok());

        let created_role = service
            .create_role(
                tenant_id,
                CreateRoleInput {
                    key: "r1".to_owned(),
                    display_name: "Device operator".to_owned(),
                    description: String::new(),
                    policies: vec!["p1".to_owned()],
                    tags: Vec::new(),
                    risk_level: RiskLevel::High,
                    is_system: false,
                },
                &admin,
            )
            .await;
        assert!(created_role.is_ok());

        let assigned = service
            .assign_role(
                tenant_id,
                AssignRoleInput {
                    user_id: "u1".to_owned(),
                    role_key: "r1".to_owned(),
                    scope: "customer:123".to_owned(),
                    expires_at: None,
                    reason: None,
                },
                &admin,
            )
            .await;
        assert!(assigned.is_ok());

        let read = service
            .evaluate_permission(
                tenant_id,
                EvaluatePermissionInput {
                    user_id: "u1".to_owned(),
                    permission: permission("devices.read.own"),
                    resource_scope: "customer:123".to_owned(),
                },
                None,
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(read.allowed);

        let delete = service
            .evaluate_permission(
                tenant_id,
                EvaluatePermissionInput {
                    user_id: "u1".to_owned(),
                    permission: permission("devices.delete.any"),
                    resource_scope: "customer:123".to_owned(),
                },
                None,
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(!delete.allowed);
        assert!(delete.reason.contains("p1"));

        let elsewhere = service
            .evaluate_permission(
                tenant_id,
                EvaluatePermissionInput {
                    user_id: "u1".to_owned(),
                    permission: permission("devices.read.own"),
                    resource_scope: "customer:999".to_owned(),
                },
                None,
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(!elsewhere.allowed);

        let batch = service
            .evaluate_batch(
                tenant_id,
                EvaluateBatchInput {
                    user_id: "u1".to_owned(),
                    resource_scope: "customer:123".to_owned(),
                    permissions: vec![
                        permission("devices.read.own"),
                        permission("devices.delete.any"),
                    ],
                },
                None,
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(batch.summary.total, 2);
        assert_eq!(batch.summary.allowed, 1);
        assert_eq!(batch.summary.denied, 1);
    }
}
