//! Ports consumed by the authorization service: entity stores, the domain
//! event publisher, and the input/output shapes they exchange.

mod events;
mod inputs;
mod stores;

pub use events::{DomainEvent, DomainEventPublisher, EventAction, EventActor};
pub use inputs::{
    AssignRoleInput, AssignmentListQuery, BatchEvaluation, CreatePolicyInput, CreateRoleInput,
    EffectivePermission, EvaluateBatchInput, EvaluatePermissionInput, EvaluationSummary, Page,
    PolicyListQuery, RoleListQuery, UpdatePolicyInput, UpdateRoleInput,
};
pub use stores::{AssignmentStore, PolicyStore, RoleStore};
