use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clearance_core::{ActorIdentity, AppResult, TenantId};
use clearance_domain::{AssignmentStatus, Policy, Role, RoleAssignment};
use uuid::Uuid;

use super::inputs::{
    AssignRoleInput, AssignmentListQuery, CreatePolicyInput, CreateRoleInput, Page,
    PolicyListQuery, RoleListQuery, UpdatePolicyInput, UpdateRoleInput,
};

/// Store port for versioned role records.
///
/// Stores are system-agnostic: `is_system` immutability is enforced by the
/// service. Updates are optimistic: the write applies only when the stored
/// version equals the version carried by the patch, and a successful update
/// increments the version by exactly 1.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Creates a role; duplicate keys in the tenant are a conflict.
    async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateRoleInput,
        actor: &ActorIdentity,
    ) -> AppResult<Role>;

    /// Finds a role by id.
    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> AppResult<Option<Role>>;

    /// Finds a role by its tenant-unique key.
    async fn get_by_key(&self, tenant_id: TenantId, key: &str) -> AppResult<Option<Role>>;

    /// Bulk-fetches roles by key; empty input returns empty without
    /// touching storage, unknown keys are simply absent from the result.
    async fn get_by_keys(&self, tenant_id: TenantId, keys: &[String]) -> AppResult<Vec<Role>>;

    /// Applies a patch under the optimistic version check.
    async fn update(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        input: UpdateRoleInput,
        actor: &ActorIdentity,
    ) -> AppResult<Role>;

    /// Deletes a role by id.
    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> AppResult<()>;

    /// Lists roles with filters and cursor pagination.
    async fn list(&self, tenant_id: TenantId, query: RoleListQuery) -> AppResult<Page<Role>>;

    /// Lists roles whose policy list references the given policy key.
    async fn list_referencing_policy(
        &self,
        tenant_id: TenantId,
        policy_key: &str,
    ) -> AppResult<Vec<Role>>;
}

/// Store port for versioned policy records.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Creates a policy; duplicate keys in the tenant are a conflict.
    async fn create(
        &self,
        tenant_id: TenantId,
        input: CreatePolicyInput,
        actor: &ActorIdentity,
    ) -> AppResult<Policy>;

    /// Finds a policy by id.
    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> AppResult<Option<Policy>>;

    /// Finds a policy by its tenant-unique key.
    async fn get_by_key(&self, tenant_id: TenantId, key: &str) -> AppResult<Option<Policy>>;

    /// Bulk-fetches policies by key; empty input returns empty without
    /// touching storage, unknown keys are simply absent from the result.
    async fn get_by_keys(&self, tenant_id: TenantId, keys: &[String]) -> AppResult<Vec<Policy>>;

    /// Applies a patch under the optimistic version check.
    async fn update(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        input: UpdatePolicyInput,
        actor: &ActorIdentity,
    ) -> AppResult<Policy>;

    /// Deletes a policy by id.
    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> AppResult<()>;

    /// Lists policies with filters and cursor pagination.
    async fn list(&self, tenant_id: TenantId, query: PolicyListQuery) -> AppResult<Page<Policy>>;
}

/// Store port for role assignment records.
///
/// Assignments are append-plus-transition: records are never deleted, their
/// status moves through the closed lifecycle set via `update_status`.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Persists a new active assignment.
    async fn create(
        &self,
        tenant_id: TenantId,
        input: AssignRoleInput,
        granted_by: &ActorIdentity,
    ) -> AppResult<RoleAssignment>;

    /// Finds an assignment by id.
    async fn get_by_id(
        &self,
        tenant_id: TenantId,
        id: Uuid,
    ) -> AppResult<Option<RoleAssignment>>;

    /// Finds the active assignment for a (user, role, scope) triple.
    async fn find_active(
        &self,
        tenant_id: TenantId,
        user_id: &str,
        role_key: &str,
        scope: &str,
    ) -> AppResult<Option<RoleAssignment>>;

    /// Lists all assignments of a user, regardless of status.
    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Vec<RoleAssignment>>;

    /// Lists assignments with filters and cursor pagination.
    async fn list(
        &self,
        tenant_id: TenantId,
        query: AssignmentListQuery,
    ) -> AppResult<Page<RoleAssignment>>;

    /// Lists active assignments referencing a role key.
    async fn list_active_for_role(
        &self,
        tenant_id: TenantId,
        role_key: &str,
    ) -> AppResult<Vec<RoleAssignment>>;

    /// Lists active assignments whose expiry lies before the cutoff.
    async fn list_active_expiring_before(
        &self,
        tenant_id: TenantId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<RoleAssignment>>;

    /// Transitions an assignment's status under the optimistic version
    /// check; invalid lifecycle transitions are rejected.
    async fn update_status(
        &self,
        tenant_id: TenantId,
        id: Uuid,
        status: AssignmentStatus,
        expected_version: i64,
    ) -> AppResult<RoleAssignment>;
}
