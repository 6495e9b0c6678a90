use std::sync::Arc;

use entitlements_sdk::{Module, ModuleUsage, NewModule, SecurityContext};
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::domain::repos::CatalogRepository;
use crate::domain::validation;

pub struct CatalogService<CR: CatalogRepository> {
    db: DatabaseConnection,
    repo: Arc<CR>,
}

impl<CR: CatalogRepository> CatalogService<CR> {
    pub fn new(db: DatabaseConnection, repo: Arc<CR>) -> Self {
        Self { db, repo }
    }

    pub async fn list_modules(&self) -> Result<Vec<Module>, DomainError> {
        debug!("Listing active modules");
        self.repo.list(&self.db, true).await
    }

    pub async fn list_all_modules(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<ModuleUsage>, DomainError> {
        debug!(tenant_id = %ctx.tenant_id(), "Listing all modules with usage");
        self.repo.list_usage(&self.db, ctx.tenant_id()).await
    }

    pub async fn upsert_module(&self, module: NewModule) -> Result<Module, DomainError> {
        validation::validate_new_module(&module)?;
        let saved = self.repo.upsert(&self.db, module).await?;
        info!(module_code = %saved.code, "Module upserted");
        Ok(saved)
    }

    /// Upsert every entry of `modules`, returning how many were written.
    pub async fn seed(&self, modules: Vec<NewModule>) -> Result<usize, DomainError> {
        let mut written = 0;
        for module in modules {
            self.upsert_module(module).await?;
            written += 1;
        }
        info!(count = written, "Module catalog seeded");
        Ok(written)
    }
}
