use super::*;

use clearance_core::ActorIdentity;
use clearance_domain::{Role, validate_role_policies};
use serde_json::json;
use uuid::Uuid;

use crate::authorization_ports::{
    CreateRoleInput, EventAction, Page, RoleListQuery, UpdateRoleInput,
};

impl AuthorizationService {
    /// Creates a role after validating its policy references.
    pub async fn create_role(
        &self,
        tenant_id: TenantId,
        input: CreateRoleInput,
        actor: &ActorIdentity,
    ) -> AppResult<Role> {
        validate_role_policies(&input.policies)?;
        self.ensure_policies_exist(tenant_id, &input.policies).await?;

        let role = self.roles.create(tenant_id, input, actor).await?;

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::RoleCreated,
            role.id.to_string(),
            json!({ "key": role.key }),
            actor,
        ))
        .await;

        Ok(role)
    }

    /// Returns a role by id.
    pub async fn get_role_by_id(&self, tenant_id: TenantId, id: Uuid) -> AppResult<Role> {
        self.roles
            .get_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{id}' does not exist")))
    }

    /// Returns a role by its tenant-unique key.
    pub async fn get_role_by_key(&self, tenant_id: TenantId, key: &str) -> AppResult<Role> {
        self.roles
            .get_by_key(tenant_id, key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{key}' does not exist")))
    }

    /// Applies a patch to a role under the optimistic version check.
    pub async fn update_role(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        input: UpdateRoleInput,
        actor: &ActorIdentity,
    ) -> AppResult<Role> {
        let current = self.get_role_by_id(tenant_id, id).await?;
        if current.is_system {
            return Err(AppError::Forbidden(format!(
                "system role '{}' cannot be modified",
                current.key
            )));
        }

        if let Some(policies) = &input.policies {
            validate_role_policies(policies)?;
            self.ensure_policies_exist(tenant_id, policies).await?;
        }

        let changed_fields = input.changed_fields();
        let updated = self.roles.update(tenant_id, id, input, actor).await?;

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::RoleUpdated,
            updated.id.to_string(),
            json!({ "key": updated.key, "changed_fields": changed_fields }),
            actor,
        ))
        .await;

        Ok(updated)
    }

    /// Deletes a role unless an active assignment still references it.
    pub async fn delete_role(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        actor: &ActorIdentity,
    ) -> AppResult<()> {
        let role = self.get_role_by_id(tenant_id, id).await?;
        if role.is_system {
            return Err(AppError::Forbidden(format!(
                "system role '{}' cannot be deleted",
                role.key
            )));
        }

        let blocking = self
            .assignments
            .list_active_for_role(tenant_id, &role.key)
            .await?;
        if !blocking.is_empty() {
            let references: Vec<String> = blocking
                .iter()
                .map(|assignment| assignment.id.to_string())
                .collect();
            return Err(AppError::Conflict(format!(
                "role '{}' is still referenced by active assignments: {}",
                role.key,
                references.join(", ")
            )));
        }

        self.roles.delete(tenant_id, id).await?;

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::RoleDeleted,
            id.to_string(),
            json!({ "key": role.key }),
            actor,
        ))
        .await;

        Ok(())
    }

    /// Lists roles with filters and cursor pagination.
    pub async fn list_roles(
        &self,
        tenant_id: TenantId,
        query: RoleListQuery,
    ) -> AppResult<Page<Role>> {
        self.roles.list(tenant_id, query).await
    }
}
