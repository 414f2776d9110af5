use std::collections::HashSet;
use std::sync::Arc;

use clearance_core::{AppError, AppResult, TenantId};

use crate::authorization_ports::{
    AssignmentStore, DomainEvent, DomainEventPublisher, PolicyStore, RoleStore,
};

mod assignments;
mod evaluation;
mod policies;
mod roles;


/// Application service orchestrating the entity stores and the permission
/// evaluator, and emitting best-effort domain events.
#[derive(Clone)]
pub struct AuthorizationService {
    roles: Arc<dyn RoleStore>,
    policies: Arc<dyn PolicyStore>,
    assignments: Arc<dyn AssignmentStore>,
    events: Arc<dyn DomainEventPublisher>,
}

impl AuthorizationService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        roles: Arc<dyn RoleStore>,
        policies: Arc<dyn PolicyStore>,
        assignments: Arc<dyn AssignmentStore>,
        events: Arc<dyn DomainEventPublisher>,
    ) -> Self {
        Self {
            roles,
            policies,
            assignments,
            events,
        }
    }

    /// Emits a domain event without letting a publisher failure surface.
    ///
    /// The bus is best-effort: a failed emission is logged and dropped, the
    /// triggering operation already succeeded.
    async fn emit(&self, event: DomainEvent) {
        let action = event.action;
        if let Err(error) = self.events.publish(event).await {
            tracing::warn!(action = action.as_str(), %error, "domain event emission failed");
        }
    }

    /// Ensures every referenced policy key exists in the tenant, reporting
    /// all missing keys in one error.
    async fn ensure_policies_exist(
        &self,
        tenant_id: TenantId,
        keys: &[String],
    ) -> AppResult<()> {
        let found = self.policies.get_by_keys(tenant_id, keys).await?;
        let found_keys: HashSet<&str> = found.iter().map(|policy| policy.key.as_str()).collect();

        let missing: Vec<&str> = keys
            .iter()
            .map(String::as_str)
            .filter(|key| !found_keys.contains(key))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        Err(AppError::NotFound(format!(
            "referenced policies not found: {}",
            missing.join(", ")
        )))
    }
}
