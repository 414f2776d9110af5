use async_trait::async_trait;

use clearance_application::{DomainEvent, DomainEventPublisher};
use clearance_core::AppResult;

/// Event bus adapter that emits domain events as structured tracing records.
///
/// Used where no real bus is wired up; delivery is the log stream, which
/// matches the best-effort contract of the publisher port.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

#[async_trait]
impl DomainEventPublisher for TracingEventPublisher {
    async fn publish(&self, event: DomainEvent) -> AppResult<()> {
        tracing::info!(
            tenant_id = %event.tenant_id,
            entity_type = event.entity_type.as_str(),
            entity_id = event.entity_id.as_str(),
            action = event.action.as_str(),
            actor_type = event.actor.actor_type.as_str(),
            data = %event.data,
            "domain event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clearance_application::{DomainEvent, DomainEventPublisher, EventAction};
    use clearance_core::{ActorIdentity, TenantId};

    use super::TracingEventPublisher;

    #[tokio::test]
    async fn publish_always_succeeds() {
        let publisher = TracingEventPublisher;
        let event = DomainEvent::new(
            TenantId::new(),
            EventAction::RoleCreated,
            "role-1",
            serde_json::json!({ "key": "ops" }),
            &ActorIdentity::user("admin"),
        );

        assert!(publisher.publish(event).await.is_ok());
    }
}
