#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Test support utilities for `entitlements` integration tests.
//!
//! Provides an in-memory database with migrations and the default catalog,
//! security contexts and a few seeding helpers.

#![allow(dead_code)] // Support module provides utilities that may not all be used

use std::sync::Arc;

use entitlements::config::EntitlementsConfig;
use entitlements::infra::storage::entity::client_module;
use entitlements::{EntitlementsApi, EntitlementsModule, ModuleAssignment, SecurityContext};
use entitlements_sdk::{BillingProviderIds, NewPlan, PlanDetails};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::Expr,
};
use uuid::Uuid;

pub struct TestContext {
    pub db: DatabaseConnection,
    pub module: EntitlementsModule,
    pub api: Arc<dyn EntitlementsApi>,
    pub tenant_id: Uuid,
    pub ctx: SecurityContext,
}

impl TestContext {
    /// Fresh database, migrated and seeded with the default catalog.
    pub async fn new() -> Self {
        let db = inmem_db().await;
        let module = EntitlementsModule::init(db.clone(), &EntitlementsConfig::default())
            .await
            .expect("Failed to init entitlements module");
        module
            .seed_catalog()
            .await
            .expect("Failed to seed catalog");

        let tenant_id = Uuid::new_v4();
        Self {
            api: module.client(),
            ctx: user_ctx(tenant_id),
            db,
            module,
            tenant_id,
        }
    }

    /// Register a client in this context's tenant.
    pub async fn client(&self, name: &str) -> Uuid {
        self.client_in(&self.ctx, name).await
    }

    pub async fn client_in(&self, ctx: &SecurityContext, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.api
            .register_client(ctx, id, name.to_owned())
            .await
            .expect("Failed to register client");
        id
    }

    /// Create an active plan bundling `codes`.
    pub async fn plan(&self, code: &str, codes: &[&str]) -> PlanDetails {
        self.api
            .create_plan(&self.ctx, new_plan(code, codes))
            .await
            .expect("Failed to create plan")
    }

    pub async fn active_codes(&self, client_id: Uuid) -> Vec<String> {
        let mut codes = self
            .api
            .active_module_codes(&self.ctx, client_id)
            .await
            .expect("Failed to read entitlements");
        codes.sort();
        codes
    }

    /// Overwrite the usage counter of every row the client has.
    pub async fn set_usage(&self, client_id: Uuid, value: i32) {
        client_module::Entity::update_many()
            .col_expr(client_module::Column::UsageCurrent, Expr::value(value))
            .filter(client_module::Column::ClientId.eq(client_id))
            .exec(&self.db)
            .await
            .expect("Failed to set usage");
    }

    pub async fn rows(&self, client_id: Uuid) -> Vec<client_module::Model> {
        client_module::Entity::find()
            .filter(client_module::Column::ClientId.eq(client_id))
            .all(&self.db)
            .await
            .expect("Failed to load client modules")
    }
}

/// A dashboard user of `tenant_id`.
#[must_use]
pub fn user_ctx(tenant_id: Uuid) -> SecurityContext {
    SecurityContext::user(tenant_id, Uuid::new_v4())
}

#[must_use]
pub fn new_plan(code: &str, codes: &[&str]) -> NewPlan {
    NewPlan {
        code: code.to_owned(),
        name: format!("Plan {code}"),
        description: None,
        price_monthly: Decimal::new(2900, 2),
        price_annual: None,
        trial_days: 0,
        display_order: 0,
        active: true,
        color: None,
        billing: BillingProviderIds::default(),
        modules: codes.iter().map(|c| ModuleAssignment::new(*c)).collect(),
    }
}

#[must_use]
pub fn modules(codes: &[&str]) -> Vec<ModuleAssignment> {
    codes.iter().map(|c| ModuleAssignment::new(*c)).collect()
}

/// Create a fresh in-memory `SQLite` database.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn inmem_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory database")
}
