//! Domain service layer - business logic and rules.
//!
//! Per-resource submodules:
//! - `catalog` - module catalog listing, upsert and seeding
//! - `plans` - plan registry and plan module bundles
//! - `subscriptions` - client registration and subscription lifecycle
//! - `provisioning` - activation, manual toggle and the entitlement reader
//! - `stats` - tenant reporting
//!
//! Every write that touches more than one row runs in an explicit transaction
//! opened here and finished with [`finish`].

use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::domain::error::{DomainError, db_err};
use crate::domain::locks::ClientLocks;
use crate::domain::repos::{
    CatalogRepository, ClientModulesRepository, PlansRepository, SubscriptionsRepository,
};

mod catalog;
mod plans;
mod provisioning;
mod stats;
mod subscriptions;

pub use catalog::CatalogService;
pub use plans::PlansService;
pub use provisioning::ProvisioningService;
pub use stats::StatsService;
pub use subscriptions::SubscriptionsService;

/// Configuration for the domain services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Serialize activations, toggles and subscription changes per client in-process.
    pub serialize_client_activations: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            serialize_client_activations: true,
        }
    }
}

async fn begin(db: &DatabaseConnection) -> Result<DatabaseTransaction, DomainError> {
    db.begin().await.map_err(db_err)
}

/// Commit on success, roll back on failure.
async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, DomainError>,
) -> Result<T, DomainError> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(db_err)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(e)
        }
    }
}

// DI Container - aggregates all domain services
pub struct AppServices<CR, PR, SR, MR>
where
    CR: CatalogRepository + 'static,
    PR: PlansRepository + 'static,
    SR: SubscriptionsRepository + 'static,
    MR: ClientModulesRepository + 'static,
{
    pub catalog: Arc<CatalogService<CR>>,
    pub plans: Arc<PlansService<PR, CR>>,
    pub subscriptions: Arc<SubscriptionsService<SR, PR>>,
    pub provisioning: Arc<ProvisioningService<CR, PR, SR, MR>>,
    pub stats: Arc<StatsService<SR, MR>>,
}

impl<CR, PR, SR, MR> AppServices<CR, PR, SR, MR>
where
    CR: CatalogRepository + 'static,
    PR: PlansRepository + 'static,
    SR: SubscriptionsRepository + 'static,
    MR: ClientModulesRepository + 'static,
{
    pub fn new(
        catalog_repo: CR,
        plans_repo: PR,
        subscriptions_repo: SR,
        client_modules_repo: MR,
        db: DatabaseConnection,
        config: &ServiceConfig,
    ) -> Self {
        let catalog_repo = Arc::new(catalog_repo);
        let plans_repo = Arc::new(plans_repo);
        let subscriptions_repo = Arc::new(subscriptions_repo);
        let client_modules_repo = Arc::new(client_modules_repo);
        let locks = Arc::new(ClientLocks::new(config.serialize_client_activations));

        Self {
            catalog: Arc::new(CatalogService::new(db.clone(), Arc::clone(&catalog_repo))),
            plans: Arc::new(PlansService::new(
                db.clone(),
                Arc::clone(&plans_repo),
                Arc::clone(&catalog_repo),
            )),
            subscriptions: Arc::new(SubscriptionsService::new(
                db.clone(),
                Arc::clone(&subscriptions_repo),
                Arc::clone(&plans_repo),
                Arc::clone(&locks),
            )),
            provisioning: Arc::new(ProvisioningService::new(
                db.clone(),
                catalog_repo,
                plans_repo,
                Arc::clone(&subscriptions_repo),
                Arc::clone(&client_modules_repo),
                locks,
            )),
            stats: Arc::new(StatsService::new(db, subscriptions_repo, client_modules_repo)),
        }
    }
}
