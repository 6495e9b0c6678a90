use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entitlements_sdk::{ClientEntitlement, ModulePopularity};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::diff::{CurrentEntitlement, PlannedUpsert};
use crate::domain::error::DomainError;

/// Repository trait for the materialized (client, module) entitlement rows.
#[async_trait]
pub trait ClientModulesRepository: Send + Sync {
    /// Rows joined with module metadata, ordered by module display order.
    async fn list_for_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<ClientEntitlement>, DomainError>;

    async fn find<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        module_id: Uuid,
    ) -> Result<Option<ClientEntitlement>, DomainError>;

    async fn current_rows<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<CurrentEntitlement>, DomainError>;

    /// One statement: deactivate the client's active rows whose module is not in `keep`.
    async fn deactivate_except<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        keep: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// One statement: insert or refresh `rows` as active with a zeroed usage counter.
    async fn upsert_active<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        rows: &[PlannedUpsert],
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Insert or update only the active flag of one row.
    async fn set_active<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        module_id: Uuid,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Active rows of the tenant counted per module, most used first.
    async fn module_popularity<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
    ) -> Result<Vec<ModulePopularity>, DomainError>;
}
