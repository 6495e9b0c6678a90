use std::collections::HashMap;

use async_trait::async_trait;
use entitlements_sdk::{Module, ModuleUsage, NewModule};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Repository trait for the module catalog.
///
/// Every method takes a generic connection so it can run on the pool or
/// inside a caller-owned transaction.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Modules ordered by display order, optionally only the active ones.
    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        active_only: bool,
    ) -> Result<Vec<Module>, DomainError>;

    /// Every module with its plan count and the tenant's client row count.
    async fn list_usage<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
    ) -> Result<Vec<ModuleUsage>, DomainError>;

    async fn find_by_code<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<Option<Module>, DomainError>;

    /// Map each code that exists in the catalog to its module id.
    async fn resolve_codes<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        codes: &[String],
    ) -> Result<HashMap<String, Uuid>, DomainError>;

    /// Insert a module or refresh the one with the same code.
    async fn upsert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        module: NewModule,
    ) -> Result<Module, DomainError>;
}
