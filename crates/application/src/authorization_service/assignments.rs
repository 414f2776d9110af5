use super::*;

use chrono::Utc;
use clearance_core::ActorIdentity;
use clearance_domain::{AssignmentStatus, RoleAssignment, validate_scope};
use serde_json::json;
use uuid::Uuid;

use crate::authorization_ports::{AssignRoleInput, AssignmentListQuery, EventAction, Page};

impl AuthorizationService {
    /// Grants a role to a user within a scope.
    ///
    /// The role must exist, and at most one active assignment may exist per
    /// (user, role, scope) triple.
    pub async fn assign_role(
        &self,
        tenant_id: TenantId,
        input: AssignRoleInput,
        granted_by: &ActorIdentity,
    ) -> AppResult<RoleAssignment> {
        validate_scope(&input.scope)?;
        self.get_role_by_key(tenant_id, &input.role_key).await?;

        let existing = self
            .assignments
            .find_active(tenant_id, &input.user_id, &input.role_key, &input.scope)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "user '{}' already has an active assignment of role '{}' in scope '{}'",
                input.user_id, input.role_key, input.scope
            )));
        }

        let assignment = self.assignments.create(tenant_id, input, granted_by).await?;

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::AssignmentCreated,
            assignment.id.to_string(),
            json!({
                "user_id": assignment.user_id,
                "role_key": assignment.role_key,
                "scope": assignment.scope,
            }),
            granted_by,
        ))
        .await;

        Ok(assignment)
    }

    /// Revokes an assignment by transitioning it to inactive.
    ///
    /// The record is kept; history is never deleted.
    pub async fn revoke_assignment(
        &self,
        tenant_id: TenantId,
        assignment_id: Uuid,
        revoked_by: &ActorIdentity,
    ) -> AppResult<RoleAssignment> {
        let current = self
            .assignments
            .get_by_id(tenant_id, assignment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("assignment '{assignment_id}' does not exist"))
            })?;

        let revoked = self
            .assignments
            .update_status(
                tenant_id,
                assignment_id,
                AssignmentStatus::Inactive,
                current.version,
            )
            .await?;

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::AssignmentRevoked,
            revoked.id.to_string(),
            json!({
                "user_id": revoked.user_id,
                "role_key": revoked.role_key,
                "scope": revoked.scope,
            }),
            revoked_by,
        ))
        .await;

        Ok(revoked)
    }

    /// Returns all assignments of a user, regardless of status.
    pub async fn get_user_assignments(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Vec<RoleAssignment>> {
        self.assignments.list_for_user(tenant_id, user_id).await
    }

    /// Lists assignments with filters and cursor pagination.
    pub async fn list_assignments(
        &self,
        tenant_id: TenantId,
        query: AssignmentListQuery,
    ) -> AppResult<Page<RoleAssignment>> {
        self.assignments.list(tenant_id, query).await
    }

    /// Transitions lapsed active assignments to expired, returning how many
    /// were transitioned.
    ///
    /// Candidates that lose a concurrent race are skipped; a rerun finds no
    /// remaining candidates, so the sweep is idempotent.
    pub async fn expire_old_assignments(&self, tenant_id: TenantId) -> AppResult<usize> {
        let now = Utc::now();
        let sweeper = ActorIdentity::system();
        let candidates = self
            .assignments
            .list_active_expiring_before(tenant_id, now)
            .await?;

        let mut expired = 0usize;
        for candidate in candidates {
            let transitioned = self
                .assignments
                .update_status(
                    tenant_id,
                    candidate.id,
                    AssignmentStatus::Expired,
                    candidate.version,
                )
                .await;

            match transitioned {
                Ok(assignment) => {
                    expired += 1;
                    self.emit(DomainEvent::new(
                        tenant_id,
                        EventAction::AssignmentExpired,
                        assignment.id.to_string(),
                        json!({
                            "user_id": assignment.user_id,
                            "role_key": assignment.role_key,
                            "scope": assignment.scope,
                        }),
                        &sweeper,
                    ))
                    .await;
                }
                // Lost the race against a concurrent sweep or revoke.
                Err(AppError::Conflict(_) | AppError::NotFound(_) | AppError::Validation(_)) => {}
                Err(error) => return Err(error),
            }
        }

        Ok(expired)
    }
}
