use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use clearance_application::{CreateRoleInput, Page, RoleListQuery, RoleStore, UpdateRoleInput};
use clearance_core::{ActorIdentity, AppError, AppResult, TenantId};
use clearance_domain::Role;

use crate::pagination::page_after;

/// In-memory role store implementation.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    roles: RwLock<HashMap<(TenantId, Uuid), Role>>,
}

impl InMemoryRoleStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateRoleInput,
        actor: &ActorIdentity,
    ) -> AppResult<Role> {
        let mut roles = self.roles.write().await;
        if roles
            .values()
            .any(|role| role.tenant_id == tenant_id && role.key == input.key)
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists for tenant '{tenant_id}'",
                input.key
            )));
        }

        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            tenant_id,
            key: input.key,
            display_name: input.display_name,
            description: input.description,
            policies: input.policies,
            tags: input.tags,
            risk_level: input.risk_level,
            is_system: input.is_system,
            version: 1,
            created_at: now,
            updated_at: now,
            created_by: actor.audit_label().to_owned(),
            updated_by: actor.audit_label().to_owned(),
        };
        roles.insert((tenant_id, role.id), role.clone());
        Ok(role)
    }

    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&(tenant_id, id)).cloned())
    }

    async fn get_by_key(&self, tenant_id: TenantId, key: &str) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .find(|role| role.tenant_id == tenant_id && role.key == key)
            .cloned())
    }

    async fn get_by_keys(&self, tenant_id: TenantId, keys: &[String]) -> AppResult<Vec<Role>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let roles = self.roles.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| {
                roles
                    .values()
                    .find(|role| role.tenant_id == tenant_id && &role.key == key)
                    .cloned()
            })
            .collect())
    }

    async fn update(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        input: UpdateRoleInput,
        actor: &ActorIdentity,
    ) -> AppResult<Role> {
        let mut roles = self.roles.write().await;
        let role = roles
            .get_mut(&(tenant_id, id))
            .ok_or_else(|| AppError::NotFound(format!("role '{id}' does not exist")))?;

        if role.version != input.version {
            return Err(AppError::Conflict(format!(
                "role '{}' was modified concurrently: stored version {} does not match {}",
                role.key, role.version, input.version
            )));
        }

        if let Some(display_name) = input.display_name {
            role.display_name = display_name;
        }
        if let Some(description) = input.description {
            role.description = description;
        }
        if let Some(policies) = input.policies {
            role.policies = policies;
        }
        if let Some(tags) = input.tags {
            role.tags = tags;
        }
        if let Some(risk_level) = input.risk_level {
            role.risk_level = risk_level;
        }
        role.version += 1;
        role.updated_at = Utc::now();
        role.updated_by = actor.audit_label().to_owned();

        Ok(role.clone())
    }

    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> AppResult<()> {
        let removed = self.roles.write().await.remove(&(tenant_id, id));
        if removed.is_none() {
            return Err(AppError::NotFound(format!("role '{id}' does not exist")));
        }
        Ok(())
    }

    async fn list(&self, tenant_id: TenantId, query: RoleListQuery) -> AppResult<Page<Role>> {
        let roles = self.roles.read().await;
        let filtered: Vec<Role> = roles
            .values()
            .filter(|role| role.tenant_id == tenant_id)
            .filter(|role| query.risk_level.is_none_or(|level| role.risk_level == level))
            .filter(|role| query.is_system.is_none_or(|flag| role.is_system == flag))
            .cloned()
            .collect();

        Ok(page_after(
            filtered,
            query.cursor.as_deref(),
            query.limit,
            |role| role.id.to_string(),
        ))
    }

    async fn list_referencing_policy(
        &self,
        tenant_id: TenantId,
        policy_key: &str,
    ) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .filter(|role| {
                role.tenant_id == tenant_id && role.policies.iter().any(|key| key == policy_key)
            })
            .cloned()
            .collect())
    }
}
