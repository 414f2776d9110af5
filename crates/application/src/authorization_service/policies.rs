use super::*;

use clearance_core::ActorIdentity;
use clearance_domain::Policy;
use serde_json::json;
use uuid::Uuid;

use crate::authorization_ports::{
    CreatePolicyInput, EventAction, Page, PolicyListQuery, UpdatePolicyInput,
};

impl AuthorizationService {
    /// Creates a policy.
    pub async fn create_policy(
        &self,
        tenant_id: TenantId,
        input: CreatePolicyInput,
        actor: &ActorIdentity,
    ) -> AppResult<Policy> {
        let policy = self.policies.create(tenant_id, input, actor).await?;

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::PolicyCreated,
            policy.id.to_string(),
            json!({ "key": policy.key }),
            actor,
        ))
        .await;

        Ok(policy)
    }

    /// Returns a policy by id.
    pub async fn get_policy_by_id(&self, tenant_id: TenantId, id: Uuid) -> AppResult<Policy> {
        self.policies
            .get_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("policy '{id}' does not exist")))
    }

    /// Returns a policy by its tenant-unique key.
    pub async fn get_policy_by_key(&self, tenant_id: TenantId, key: &str) -> AppResult<Policy> {
        self.policies
            .get_by_key(tenant_id, key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("policy '{key}' does not exist")))
    }

    /// Applies a patch to a policy under the optimistic version check.
    pub async fn update_policy(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        input: UpdatePolicyInput,
        actor: &ActorIdentity,
    ) -> AppResult<Policy> {
        let current = self.get_policy_by_id(tenant_id, id).await?;
        if current.is_system {
            return Err(AppError::Forbidden(format!(
                "system policy '{}' cannot be modified",
                current.key
            )));
        }

        let changed_fields = input.changed_fields();
        let updated = self.policies.update(tenant_id, id, input, actor).await?;

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::PolicyUpdated,
            updated.id.to_string(),
            json!({ "key": updated.key, "changed_fields": changed_fields }),
            actor,
        ))
        .await;

        Ok(updated)
    }

    /// Deletes a policy unless a role still lists it.
    pub async fn delete_policy(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        actor: &ActorIdentity,
    ) -> AppResult<()> {
        let policy = self.get_policy_by_id(tenant_id, id).await?;
        if policy.is_system {
            return Err(AppError::Forbidden(format!(
                "system policy '{}' cannot be deleted",
                policy.key
            )));
        }

        let referencing = self
            .roles
            .list_referencing_policy(tenant_id, &policy.key)
            .await?;
        if !referencing.is_empty() {
            let references: Vec<&str> =
                referencing.iter().map(|role| role.key.as_str()).collect();
            return Err(AppError::Conflict(format!(
                "policy '{}' is still referenced by roles: {}",
                policy.key,
                references.join(", ")
            )));
        }

        self.policies.delete(tenant_id, id).await?;

        self.emit(DomainEvent::new(
            tenant_id,
            EventAction::PolicyDeleted,
            id.to_string(),
            json!({ "key": policy.key }),
            actor,
        ))
        .await;

        Ok(())
    }

    /// Lists policies with filters and cursor pagination.
    pub async fn list_policies(
        &self,
        tenant_id: TenantId,
        query: PolicyListQuery,
    ) -> AppResult<Page<Policy>> {
        self.policies.list(tenant_id, query).await
    }
}
