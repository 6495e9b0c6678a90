use std::sync::Arc;

use axum::Router;
use entitlements_sdk::EntitlementsApi;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{self, auth::Authenticator};
use crate::config::{AuthConfig, EntitlementsConfig};
use crate::domain::service::{AppServices, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::seed;
use crate::infra::storage::{
    OrmCatalogRepository, OrmClientModulesRepository, OrmPlansRepository,
    OrmSubscriptionsRepository,
};
use crate::local_client::EntitlementsLocalClient;

/// Type alias for the concrete `AppServices` type used with ORM repositories.
/// This lives in the composition root (module.rs) to avoid infra dependencies in domain.
pub type ConcreteAppServices = AppServices<
    OrmCatalogRepository,
    OrmPlansRepository,
    OrmSubscriptionsRepository,
    OrmClientModulesRepository,
>;

/// Composition root of the entitlements module.
#[derive(Clone)]
pub struct EntitlementsModule {
    services: Arc<ConcreteAppServices>,
}

impl EntitlementsModule {
    /// Run migrations and wire the services on `db`.
    pub async fn init(db: DatabaseConnection, cfg: &EntitlementsConfig) -> anyhow::Result<Self> {
        info!("Initializing entitlements module");
        debug!(
            serialize_client_activations = cfg.serialize_client_activations,
            "Loaded entitlements config"
        );

        Migrator::up(&db, None).await?;

        let services = AppServices::new(
            OrmCatalogRepository::new(),
            OrmPlansRepository::new(),
            OrmSubscriptionsRepository::new(),
            OrmClientModulesRepository::new(),
            db,
            &ServiceConfig::from(cfg),
        );

        info!("Entitlements module initialized");
        Ok(Self {
            services: Arc::new(services),
        })
    }

    pub fn services(&self) -> Arc<ConcreteAppServices> {
        Arc::clone(&self.services)
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn EntitlementsApi> {
        Arc::new(EntitlementsLocalClient::new(self.services()))
    }

    /// REST routes, authenticated with `auth`.
    pub fn router(&self, auth: &AuthConfig) -> Router {
        rest::routes::router(self.services(), Arc::new(Authenticator::new(auth)))
    }

    /// Upsert the platform's default module catalog.
    pub async fn seed_catalog(&self) -> anyhow::Result<usize> {
        Ok(self.services.catalog.seed(seed::default_catalog()).await?)
    }
}
