use async_trait::async_trait;
use clearance_core::{ActorIdentity, ActorType, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable actions carried by domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is updated.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a policy is created.
    PolicyCreated,
    /// Emitted when a policy is updated.
    PolicyUpdated,
    /// Emitted when a policy is deleted.
    PolicyDeleted,
    /// Emitted when a role is assigned.
    AssignmentCreated,
    /// Emitted when an assignment is revoked.
    AssignmentRevoked,
    /// Emitted when an assignment lapses through expiry.
    AssignmentExpired,
    /// Emitted for every permission evaluation.
    PermissionEvaluated,
}

impl EventAction {
    /// Returns a stable wire value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "role.created",
            Self::RoleUpdated => "role.updated",
            Self::RoleDeleted => "role.deleted",
            Self::PolicyCreated => "policy.created",
            Self::PolicyUpdated => "policy.updated",
            Self::PolicyDeleted => "policy.deleted",
            Self::AssignmentCreated => "assignment.created",
            Self::AssignmentRevoked => "assignment.revoked",
            Self::AssignmentExpired => "assignment.expired",
            Self::PermissionEvaluated => "permission.evaluated",
        }
    }

    /// Returns the entity type the action applies to.
    #[must_use]
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::RoleCreated | Self::RoleUpdated | Self::RoleDeleted => "role",
            Self::PolicyCreated | Self::PolicyUpdated | Self::PolicyDeleted => "policy",
            Self::AssignmentCreated | Self::AssignmentRevoked | Self::AssignmentExpired => {
                "assignment"
            }
            Self::PermissionEvaluated => "evaluation",
        }
    }
}

/// Principal attached to a domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventActor {
    /// User identifier, absent for platform-initiated actions.
    pub user_id: Option<String>,
    /// Kind of principal.
    pub actor_type: ActorType,
}

impl From<&ActorIdentity> for EventActor {
    fn from(actor: &ActorIdentity) -> Self {
        Self {
            user_id: actor.user_id().map(str::to_owned),
            actor_type: actor.actor_type(),
        }
    }
}

/// Best-effort notification of a state change or evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Entity type the event applies to.
    pub entity_type: String,
    /// Identifier of the affected entity.
    pub entity_id: String,
    /// Stable action value.
    pub action: EventAction,
    /// Action-specific payload; changed-field names for updates, never
    /// full entity bodies.
    pub data: Value,
    /// Principal behind the change.
    pub actor: EventActor,
}

impl DomainEvent {
    /// Builds an event, deriving the entity type from the action.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        action: EventAction,
        entity_id: impl Into<String>,
        data: Value,
        actor: &ActorIdentity,
    ) -> Self {
        Self {
            tenant_id,
            entity_type: action.entity_type().to_owned(),
            entity_id: entity_id.into(),
            action,
            data,
            actor: EventActor::from(actor),
        }
    }
}

/// Port delivering domain events to the external bus.
///
/// Delivery is best-effort and fire-and-forget: implementations should
/// enqueue rather than deliver synchronously, and callers swallow failures.
#[async_trait]
pub trait DomainEventPublisher: Send + Sync {
    /// Hands one event to the bus.
    async fn publish(&self, event: DomainEvent) -> AppResult<()>;
}
