use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use clearance_application::{
    CreatePolicyInput, Page, PolicyListQuery, PolicyStore, UpdatePolicyInput,
};
use clearance_core::{ActorIdentity, AppError, AppResult, TenantId};
use clearance_domain::Policy;

use crate::pagination::page_after;

/// In-memory policy store implementation.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    policies: RwLock<HashMap<(TenantId, Uuid), Policy>>,
}

impl InMemoryPolicyStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn create(
        &self,
        tenant_id: TenantId,
        input: CreatePolicyInput,
        actor: &ActorIdentity,
    ) -> AppResult<Policy> {
        let mut policies = self.policies.write().await;
        if policies
            .values()
            .any(|policy| policy.tenant_id == tenant_id && policy.key == input.key)
        {
            return Err(AppError::Conflict(format!(
                "policy '{}' already exists for tenant '{tenant_id}'",
                input.key
            )));
        }

        let now = Utc::now();
        let policy = Policy {
            id: Uuid::new_v4(),
            tenant_id,
            key: input.key,
            display_name: input.display_name,
            description: input.description,
            allow: input.allow,
            deny: input.deny,
            conditions: input.conditions,
            risk_level: input.risk_level,
            is_system: input.is_system,
            version: 1,
            created_at: now,
            updated_at: now,
            created_by: actor.audit_label().to_owned(),
            updated_by: actor.audit_label().to_owned(),
        };
        policies.insert((tenant_id, policy.id), policy.clone());
        Ok(policy)
    }

    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> AppResult<Option<Policy>> {
        Ok(self.policies.read().await.get(&(tenant_id, id)).cloned())
    }

    async fn get_by_key(&self, tenant_id: TenantId, key: &str) -> AppResult<Option<Policy>> {
        Ok(self
            .policies
            .read()
            .await
            .values()
            .find(|policy| policy.tenant_id == tenant_id && policy.key == key)
            .cloned())
    }

    async fn get_by_keys(&self, tenant_id: TenantId, keys: &[String]) -> AppResult<Vec<Policy>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let policies = self.policies.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| {
                policies
                    .values()
                    .find(|policy| policy.tenant_id == tenant_id && &policy.key == key)
                    .cloned()
            })
            .collect())
    }

    async fn update(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        input: UpdatePolicyInput,
        actor: &ActorIdentity,
    ) -> AppResult<Policy> {
        let mut policies = self.policies.write().await;
        let policy = policies
            .get_mut(&(tenant_id, id))
            .ok_or_else(|| AppError::NotFound(format!("policy '{id}' does not exist")))?;

        if policy.version != input.version {
            return Err(AppError::Conflict(format!(
                "policy '{}' was modified concurrently: stored version {} does not match {}",
                policy.key, policy.version, input.version
            )));
        }

        if let Some(display_name) = input.display_name {
            policy.display_name = display_name;
        }
        if let Some(description) = input.description {
            policy.description = description;
        }
        if let Some(allow) = input.allow {
            policy.allow = allow;
        }
        if let Some(deny) = input.deny {
            policy.deny = deny;
        }
        if let Some(conditions) = input.conditions {
            policy.conditions = Some(conditions);
        }
        policy.version += 1;
        policy.updated_at = Utc::now();
        policy.updated_by = actor.audit_label().to_owned();

        Ok(policy.clone())
    }

    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> AppResult<()> {
        let removed = self.policies.write().await.remove(&(tenant_id, id));
        if removed.is_none() {
            return Err(AppError::NotFound(format!("policy '{id}' does not exist")));
        }
        Ok(())
    }

    async fn list(&self, tenant_id: TenantId, query: PolicyListQuery) -> AppResult<Page<Policy>> {
        let policies = self.policies.read().await;
        let filtered: Vec<Policy> = policies
            .values()
            .filter(|policy| policy.tenant_id == tenant_id)
            .filter(|policy| {
                query
                    .risk_level
                    .is_none_or(|level| policy.risk_level == level)
            })
            .filter(|policy| query.is_system.is_none_or(|flag| policy.is_system == flag))
            .cloned()
            .collect();

        Ok(page_after(
            filtered,
            query.cursor.as_deref(),
            query.limit,
            |policy| policy.id.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use clearance_application::{
        CreatePolicyInput, PolicyListQuery, PolicyStore, UpdatePolicyInput,
    };
    use clearance_core::{ActorIdentity, AppError, TenantId};
    use clearance_domain::{PermissionPattern, RiskLevel};

    use super::InMemoryPolicyStore;

    fn patterns(values: &[&str]) -> Vec<PermissionPattern> {
        values
            .iter()
            .map(|value| PermissionPattern::new(*value).unwrap_or_else(|_| unreachable!()))
            .collect()
    }

    fn input(key: &str) -> CreatePolicyInput {
        CreatePolicyInput {
            key: key.to_owned(),
            display_name: key.to_owned(),
            description: String::new(),
            allow: patterns(&["devices.*.*"]),
            deny: Vec::new(),
            conditions: None,
            risk_level: RiskLevel::Medium,
            is_system: false,
        }
    }

    fn admin() -> ActorIdentity {
        ActorIdentity::user("admin")
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected_before_writing() {
        let store = InMemoryPolicyStore::new();
        let tenant_id = TenantId::new();

        let first = store.create(tenant_id, input("p1"), &admin()).await;
        assert!(first.is_ok());

        let second = store.create(tenant_id, input("p1"), &admin()).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_replaces_patterns_under_version_check() {
        let store = InMemoryPolicyStore::new();
        let tenant_id = TenantId::new();
        let policy = store
            .create(tenant_id, input("p1"), &admin())
            .await
            .unwrap_or_else(|_| unreachable!());

        let updated = store
            .update(
                tenant_id,
                policy.id,
                UpdatePolicyInput {
                    deny: Some(patterns(&["devices.delete.*"])),
                    version: policy.version,
                    ..UpdatePolicyInput::default()
                },
                &admin(),
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(updated.version, 2);
        assert_eq!(updated.deny, patterns(&["devices.delete.*"]));

        let stale = store
            .update(
                tenant_id,
                policy.id,
                UpdatePolicyInput {
                    deny: Some(Vec::new()),
                    version: policy.version,
                    ..UpdatePolicyInput::default()
                },
                &admin(),
            )
            .await;
        assert!(matches!(stale, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn get_by_keys_preserves_requested_order() {
        let store = InMemoryPolicyStore::new();
        let tenant_id = TenantId::new();
        for key in ["p1", "p2", "p3"] {
            let created = store.create(tenant_id, input(key), &admin()).await;
            assert!(created.is_ok());
        }

        let fetched = store
            .get_by_keys(tenant_id, &["p3".to_owned(), "p1".to_owned()])
            .await
            .unwrap_or_default();
        let keys: Vec<&str> = fetched.iter().map(|policy| policy.key.as_str()).collect();
        assert_eq!(keys, vec!["p3", "p1"]);
    }

    #[tokio::test]
    async fn list_filters_by_system_flag() {
        let store = InMemoryPolicyStore::new();
        let tenant_id = TenantId::new();

        let mut seeded = input("baseline");
        seeded.is_system = true;
        let created = store.create(tenant_id, seeded, &admin()).await;
        assert!(created.is_ok());
        let created = store.create(tenant_id, input("custom"), &admin()).await;
        assert!(created.is_ok());

        let filtered = store
            .list(
                tenant_id,
                PolicyListQuery {
                    is_system: Some(false),
                    ..PolicyListQuery::default()
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(filtered.items.len(), 1);
        assert_eq!(filtered.items[0].key, "custom");
    }
}
