use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use clearance_application::{AssignRoleInput, AssignmentListQuery, AssignmentStore, Page};
use clearance_core::{ActorIdentity, AppError, AppResult, TenantId};
use clearance_domain::{AssignmentStatus, RoleAssignment};

use crate::pagination::page_after;

/// In-memory assignment store implementation.
///
/// Records are only ever inserted and status-transitioned, never removed.
#[derive(Debug, Default)]
pub struct InMemoryAssignmentStore {
    assignments: RwLock<HashMap<(TenantId, Uuid), RoleAssignment>>,
}

impl InMemoryAssignmentStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assignments: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn create(
        &self,
        tenant_id: TenantId,
        input: AssignRoleInput,
        granted_by: &ActorIdentity,
    ) -> AppResult<RoleAssignment> {
        let now = Utc::now();
        let assignment = RoleAssignment {
            id: Uuid::new_v4(),
            tenant_id,
            user_id: input.user_id,
            role_key: input.role_key,
            scope: input.scope,
            status: AssignmentStatus::Active,
            expires_at: input.expires_at,
            granted_by: granted_by.audit_label().to_owned(),
            granted_at: now,
            reason: input.reason,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.assignments
            .write()
            .await
            .insert((tenant_id, assignment.id), assignment.clone());
        Ok(assignment)
    }

    async fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: Uuid,
    ) -> AppResult<Option<RoleAssignment>> {
        Ok(self.assignments.read().await.get(&(tenant_id, id)).cloned())
    }

    async fn find_active(
        &self,
        tenant_id: TenantId,
        user_id: &str,
        role_key: &str,
        scope: &str,
    ) -> AppResult<Option<RoleAssignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .values()
            .find(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.status == AssignmentStatus::Active
                    && assignment.user_id == user_id
                    && assignment.role_key == role_key
                    && assignment.scope == scope
            })
            .cloned())
    }

    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Vec<RoleAssignment>> {
        let assignments = self.assignments.read().await;
        let mut listed: Vec<RoleAssignment> = assignments
            .values()
            .filter(|assignment| {
                assignment.tenant_id == tenant_id && assignment.user_id == user_id
            })
            .cloned()
            .collect();
        listed.sort_by_key(|assignment| assignment.granted_at);
        Ok(listed)
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        query: AssignmentListQuery,
    ) -> AppResult<Page<RoleAssignment>> {
        let assignments = self.assignments.read().await;
        let filtered: Vec<RoleAssignment> = assignments
            .values()
            .filter(|assignment| assignment.tenant_id == tenant_id)
            .filter(|assignment| {
                query
                    .user_id
                    .as_deref()
                    .is_none_or(|user_id| assignment.user_id == user_id)
            })
            .filter(|assignment| {
                query
                    .role_key
                    .as_deref()
                    .is_none_or(|role_key| assignment.role_key == role_key)
            })
            .filter(|assignment| query.status.is_none_or(|status| assignment.status == status))
            .cloned()
            .collect();

        Ok(page_after(
            filtered,
            query.cursor.as_deref(),
            query.limit,
            |assignment| assignment.id.to_string(),
        ))
    }

    async fn list_active_for_role(
        &self,
        tenant_id: TenantId,
        role_key: &str,
    ) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .values()
            .filter(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.status == AssignmentStatus::Active
                    && assignment.role_key == role_key
            })
            .cloned()
            .collect())
    }

    async fn list_active_expiring_before(
        &self,
        tenant_id: TenantId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .values()
            .filter(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.status == AssignmentStatus::Active
                    && assignment
                        .expires_at
                        .is_some_and(|expires_at| expires_at < cutoff)
            })
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        status: AssignmentStatus,
        expected_version: i64,
    ) -> AppResult<RoleAssignment> {
        let mut assignments = self.assignments.write().await;
        let assignment = assignments
            .get_mut(&(tenant_id, id))
            .ok_or_else(|| AppError::NotFound(format!("assignment '{id}' does not exist")))?;

        if assignment.version != expected_version {
            return Err(AppError::Conflict(format!(
                "assignment '{id}' was modified concurrently: stored version {} does not match {expected_version}",
                assignment.version
            )));
        }
        if !assignment.status.can_transition_to(status) {
            return Err(AppError::Validation(format!(
                "assignment status '{}' cannot transition to '{}'",
                assignment.status.as_str(),
                status.as_str()
            )));
        }

        assignment.status = status;
        assignment.version += 1;
        assignment.updated_at = Utc::now();

        Ok(assignment.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use clearance_application::{AssignRoleInput, AssignmentListQuery, AssignmentStore};
    use clearance_core::{ActorIdentity, AppError, TenantId};
    use clearance_domain::AssignmentStatus;

    use super::InMemoryAssignmentStore;

    fn input(user_id: &str, role_key: &str, scope: &str) -> AssignRoleInput {
        AssignRoleInput {
            user_id: user_id.to_owned(),
            role_key: role_key.to_owned(),
            scope: scope.to_owned(),
            expires_at: None,
            reason: None,
        }
    }

    fn admin() -> ActorIdentity {
        ActorIdentity::user("admin")
    }

    #[tokio::test]
    async fn find_active_matches_the_full_triple() {
        let store = InMemoryAssignmentStore::new();
        let tenant_id = TenantId::new();
        let created = store
            .create(tenant_id, input("u1", "ops", "customer:123"), &admin())
            .await;
        assert!(created.is_ok());

        let hit = store
            .find_active(tenant_id, "u1", "ops", "customer:123")
            .await
            .unwrap_or_default();
        assert!(hit.is_some());

        let other_scope = store
            .find_active(tenant_id, "u1", "ops", "customer:456")
            .await
            .unwrap_or_default();
        assert!(other_scope.is_none());
    }

    #[tokio::test]
    async fn status_transition_is_versioned_and_validated() {
        let store = InMemoryAssignmentStore::new();
        let tenant_id = TenantId::new();
        let assignment = store
            .create(tenant_id, input("u1", "ops", "customer:123"), &admin())
            .await
            .unwrap_or_else(|_| unreachable!());

        let revoked = store
            .update_status(tenant_id, assignment.id, AssignmentStatus::Inactive, 1)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(revoked.status, AssignmentStatus::Inactive);
        assert_eq!(revoked.version, 2);

        let stale = store
            .update_status(tenant_id, assignment.id, AssignmentStatus::Expired, 1)
            .await;
        assert!(matches!(stale, Err(AppError::Conflict(_))));

        let invalid = store
            .update_status(tenant_id, assignment.id, AssignmentStatus::Expired, 2)
            .await;
        assert!(matches!(invalid, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn expiring_before_returns_only_lapsed_active_assignments() {
        let store = InMemoryAssignmentStore::new();
        let tenant_id = TenantId::new();
        let now = Utc::now();

        let mut lapsed = input("u1", "ops", "customer:123");
        lapsed.expires_at = Some(now - Duration::minutes(10));
        let lapsed = store
            .create(tenant_id, lapsed, &admin())
            .await
            .unwrap_or_else(|_| unreachable!());

        let mut current = input("u1", "ops", "customer:456");
        current.expires_at = Some(now + Duration::hours(1));
        let created = store.create(tenant_id, current, &admin()).await;
        assert!(created.is_ok());

        let created = store
            .create(tenant_id, input("u1", "ops", "customer:789"), &admin())
            .await;
        assert!(created.is_ok());

        let candidates = store
            .list_active_expiring_before(tenant_id, now)
            .await
            .unwrap_or_default();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, lapsed.id);

        let swept = store
            .update_status(tenant_id, lapsed.id, AssignmentStatus::Expired, lapsed.version)
            .await;
        assert!(swept.is_ok());

        let remaining = store
            .list_active_expiring_before(tenant_id, now)
            .await
            .unwrap_or_default();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_user_role_and_status() {
        let store = InMemoryAssignmentStore::new();
        let tenant_id = TenantId::new();

        let first = store
            .create(tenant_id, input("u1", "ops", "customer:123"), &admin())
            .await
            .unwrap_or_else(|_| unreachable!());
        let created = store
            .create(tenant_id, input("u2", "ops", "customer:123"), &admin())
            .await;
        assert!(created.is_ok());

        let revoked = store
            .update_status(tenant_id, first.id, AssignmentStatus::Inactive, 1)
            .await;
        assert!(revoked.is_ok());

        let active_ops = store
            .list(
                tenant_id,
                AssignmentListQuery {
                    role_key: Some("ops".to_owned()),
                    status: Some(AssignmentStatus::Active),
                    ..AssignmentListQuery::default()
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(active_ops.items.len(), 1);
        assert_eq!(active_ops.items[0].user_id, "u2");
    }

    #[tokio::test]
    async fn records_survive_revocation_for_audit_history() {
        let store = InMemoryAssignmentStore::new();
        let tenant_id = TenantId::new();
        let assignment = store
            .create(tenant_id, input("u1", "ops", "customer:123"), &admin())
            .await
            .unwrap_or_else(|_| unreachable!());

        let revoked = store
            .update_status(tenant_id, assignment.id, AssignmentStatus::Inactive, 1)
            .await;
        assert!(revoked.is_ok());

        let history = store
            .list_for_user(tenant_id, "u1")
            .await
            .unwrap_or_default();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, AssignmentStatus::Inactive);
    }
}
