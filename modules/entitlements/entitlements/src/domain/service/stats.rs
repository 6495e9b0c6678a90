use std::sync::Arc;

use entitlements_sdk::{SecurityContext, TenantStats};
use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::repos::{ClientModulesRepository, SubscriptionsRepository};

/// Read-only tenant reporting.
pub struct StatsService<SR: SubscriptionsRepository, MR: ClientModulesRepository> {
    db: DatabaseConnection,
    subscriptions: Arc<SR>,
    modules: Arc<MR>,
}

impl<SR: SubscriptionsRepository, MR: ClientModulesRepository> StatsService<SR, MR> {
    pub fn new(db: DatabaseConnection, subscriptions: Arc<SR>, modules: Arc<MR>) -> Self {
        Self {
            db,
            subscriptions,
            modules,
        }
    }

    pub async fn stats(&self, ctx: &SecurityContext) -> Result<TenantStats, DomainError> {
        let tenant_id = ctx.tenant_id();
        debug!(%tenant_id, "Computing entitlement stats");

        Ok(TenantStats {
            plan_distribution: self.subscriptions.plan_distribution(&self.db, tenant_id).await?,
            module_popularity: self.modules.module_popularity(&self.db, tenant_id).await?,
        })
    }
}
