use std::sync::Arc;

use chrono::Utc;
use entitlements_sdk::{
    ActivationOutcome, ActivationSource, ClientEntitlement, ClientEntitlements, SecurityContext,
};
use sea_orm::{DatabaseConnection, DatabaseTransaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{begin, finish};
use crate::domain::diff::plan_activation;
use crate::domain::error::DomainError;
use crate::domain::locks::ClientLocks;
use crate::domain::repos::{
    CatalogRepository, ClientModulesRepository, PlansRepository, SubscriptionsRepository,
};
use crate::domain::validation;

/// Writes and reads the materialized client entitlements.
///
/// `activate` and `toggle` are the only writers of client module rows. Both
/// hold the per-client lock and lock the client row inside their transaction.
pub struct ProvisioningService<CR, PR, SR, MR>
where
    CR: CatalogRepository,
    PR: PlansRepository,
    SR: SubscriptionsRepository,
    MR: ClientModulesRepository,
{
    db: DatabaseConnection,
    catalog: Arc<CR>,
    plans: Arc<PR>,
    subscriptions: Arc<SR>,
    modules: Arc<MR>,
    locks: Arc<ClientLocks>,
}

impl<CR, PR, SR, MR> ProvisioningService<CR, PR, SR, MR>
where
    CR: CatalogRepository,
    PR: PlansRepository,
    SR: SubscriptionsRepository,
    MR: ClientModulesRepository,
{
    pub fn new(
        db: DatabaseConnection,
        catalog: Arc<CR>,
        plans: Arc<PR>,
        subscriptions: Arc<SR>,
        modules: Arc<MR>,
        locks: Arc<ClientLocks>,
    ) -> Self {
        Self {
            db,
            catalog,
            plans,
            subscriptions,
            modules,
            locks,
        }
    }

    /// Make `source` the client's exact active module set.
    pub async fn activate(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        source: ActivationSource,
    ) -> Result<ActivationOutcome, DomainError> {
        match &source {
            ActivationSource::Plan { plan_code } => {
                validation::validate_plan_code("planCode", plan_code)?;
            }
            ActivationSource::Modules(list) => {
                validation::validate_assignments("modules", list)?;
            }
        }

        let tenant_id = ctx.tenant_id();
        let _guard = self.locks.acquire(client_id).await;

        let txn = begin(&self.db).await?;
        let result = self.activate_in(&txn, tenant_id, client_id, source).await;
        let outcome = finish(txn, result).await?;

        info!(
            %tenant_id,
            %client_id,
            activated = outcome.count(),
            deactivated = outcome.deactivated_codes.len(),
            skipped = outcome.skipped_codes.len(),
            "Client modules activated"
        );
        Ok(outcome)
    }

    async fn activate_in(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        client_id: Uuid,
        source: ActivationSource,
    ) -> Result<ActivationOutcome, DomainError> {
        self.subscriptions
            .lock_client(txn, tenant_id, client_id)
            .await?
            .ok_or_else(|| DomainError::client_not_found(client_id))?;

        let now = Utc::now();
        let desired = match source {
            ActivationSource::Plan { plan_code } => {
                let plan = self
                    .plans
                    .find_by_code(txn, &plan_code)
                    .await?
                    .ok_or_else(|| DomainError::plan_not_found(&plan_code))?;
                let repointed = self
                    .subscriptions
                    .repoint_current(txn, tenant_id, client_id, plan.id, now)
                    .await?;
                debug!(%client_id, plan_code = %plan.code, repointed, "Current subscription follows plan");
                self.plans.assignments(txn, plan.id).await?
            }
            ActivationSource::Modules(list) => list,
        };

        let codes: Vec<String> = desired.iter().map(|a| a.module_code.clone()).collect();
        let catalog = self.catalog.resolve_codes(txn, &codes).await?;
        let current = self.modules.current_rows(txn, tenant_id, client_id).await?;

        let plan = plan_activation(&current, &desired, &catalog);
        for code in &plan.skipped {
            warn!(%client_id, module_code = %code, "Module not found in catalog, skipped");
        }

        self.modules
            .deactivate_except(txn, tenant_id, client_id, &plan.keep_module_ids(), now)
            .await?;
        self.modules
            .upsert_active(txn, tenant_id, client_id, &plan.upserts, now)
            .await?;

        Ok(ActivationOutcome {
            activated_codes: plan.activated_codes(),
            deactivated_codes: plan.deactivated_codes(),
            skipped_codes: plan.skipped,
        })
    }

    /// Flip one module for the client. The usage counter is left as is.
    pub async fn toggle(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        module_code: &str,
        active: bool,
    ) -> Result<ClientEntitlement, DomainError> {
        if module_code.trim().is_empty() {
            return Err(DomainError::validation("moduleCode", "must not be empty"));
        }

        let tenant_id = ctx.tenant_id();
        let _guard = self.locks.acquire(client_id).await;

        let txn = begin(&self.db).await?;
        let result = self
            .toggle_in(&txn, tenant_id, client_id, module_code, active)
            .await;
        let entitlement = finish(txn, result).await?;

        info!(%tenant_id, %client_id, module_code, active, "Client module toggled");
        Ok(entitlement)
    }

    async fn toggle_in(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        client_id: Uuid,
        module_code: &str,
        active: bool,
    ) -> Result<ClientEntitlement, DomainError> {
        let module = self
            .catalog
            .find_by_code(txn, module_code)
            .await?
            .ok_or_else(|| DomainError::module_not_found(module_code))?;

        self.subscriptions
            .lock_client(txn, tenant_id, client_id)
            .await?
            .ok_or_else(|| DomainError::client_not_found(client_id))?;

        self.modules
            .set_active(txn, tenant_id, client_id, module.id, active, Utc::now())
            .await?;

        self.modules
            .find(txn, tenant_id, client_id, module.id)
            .await?
            .ok_or_else(|| DomainError::database("entitlement row missing after toggle"))
    }

    /// Effective entitlements for one client, read without caching.
    pub async fn get_entitlements(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
    ) -> Result<ClientEntitlements, DomainError> {
        let tenant_id = ctx.tenant_id();
        debug!(%tenant_id, %client_id, "Reading client entitlements");

        self.subscriptions
            .find_client(&self.db, client_id)
            .await?
            .filter(|c| c.tenant_id == tenant_id)
            .ok_or_else(|| DomainError::client_not_found(client_id))?;

        let modules = self
            .modules
            .list_for_client(&self.db, tenant_id, client_id)
            .await?;
        let subscription = self
            .subscriptions
            .current(&self.db, tenant_id, client_id)
            .await?;
        let active_module_codes = modules
            .iter()
            .filter(|m| m.active)
            .map(|m| m.module.code.clone())
            .collect();

        Ok(ClientEntitlements {
            client_id,
            modules,
            subscription,
            active_module_codes,
        })
    }
}
