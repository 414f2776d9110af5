//! Authorization service and its store/event ports.

#![forbid(unsafe_code)]

mod authorization_ports;
mod authorization_service;

pub use authorization_ports::{
    AssignRoleInput, AssignmentListQuery, AssignmentStore, BatchEvaluation, CreatePolicyInput,
    CreateRoleInput, DomainEvent, DomainEventPublisher, EffectivePermission, EvaluateBatchInput,
    EvaluatePermissionInput, EvaluationSummary, EventAction, EventActor, Page, PolicyListQuery,
    PolicyStore, RoleListQuery, RoleStore, UpdatePolicyInput, UpdateRoleInput,
};
pub use authorization_service::AuthorizationService;
