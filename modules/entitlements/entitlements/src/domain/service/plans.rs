use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use entitlements_sdk::{
    ModuleAssignment, NewPlan, Plan, PlanDetails, PlanPatch, SecurityContext, SubscriptionStatus,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::{begin, finish};
use crate::domain::error::DomainError;
use crate::domain::repos::{CatalogRepository, PlansRepository};
use crate::domain::validation;

pub struct PlansService<PR: PlansRepository, CR: CatalogRepository> {
    db: DatabaseConnection,
    repo: Arc<PR>,
    catalog: Arc<CR>,
}

impl<PR: PlansRepository, CR: CatalogRepository> PlansService<PR, CR> {
    pub fn new(db: DatabaseConnection, repo: Arc<PR>, catalog: Arc<CR>) -> Self {
        Self { db, repo, catalog }
    }

    pub async fn list_plans(
        &self,
        ctx: &SecurityContext,
        include_inactive: bool,
    ) -> Result<Vec<PlanDetails>, DomainError> {
        debug!(include_inactive, "Listing plans");
        self.repo
            .list(&self.db, ctx.tenant_id(), include_inactive)
            .await
    }

    pub async fn get_plan(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
    ) -> Result<PlanDetails, DomainError> {
        let plan = self
            .repo
            .find(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::plan_not_found(id))?;
        self.repo.details(&self.db, ctx.tenant_id(), plan).await
    }

    pub async fn get_plan_by_code(
        &self,
        ctx: &SecurityContext,
        code: &str,
    ) -> Result<PlanDetails, DomainError> {
        let plan = self
            .repo
            .find_by_code(&self.db, code)
            .await?
            .ok_or_else(|| DomainError::plan_not_found(code))?;
        self.repo.details(&self.db, ctx.tenant_id(), plan).await
    }

    pub async fn create_plan(
        &self,
        ctx: &SecurityContext,
        new_plan: NewPlan,
    ) -> Result<PlanDetails, DomainError> {
        validation::validate_new_plan(&new_plan)?;

        let txn = begin(&self.db).await?;
        let result = self.create_plan_in(&txn, ctx.tenant_id(), new_plan).await;
        let details = finish(txn, result).await?;

        info!(
            plan_id = %details.plan.id,
            plan_code = %details.plan.code,
            modules = details.modules.len(),
            "Plan created"
        );
        Ok(details)
    }

    async fn create_plan_in(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        new_plan: NewPlan,
    ) -> Result<PlanDetails, DomainError> {
        if self.repo.find_by_code(txn, &new_plan.code).await?.is_some() {
            return Err(DomainError::plan_code_taken(new_plan.code));
        }
        let modules = self.resolve_strict(txn, &new_plan.modules).await?;
        let plan = self.repo.insert(txn, &new_plan).await?;
        self.repo.replace_modules(txn, plan.id, &modules).await?;
        self.repo.details(txn, tenant_id, plan).await
    }

    pub async fn update_plan(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: PlanPatch,
    ) -> Result<PlanDetails, DomainError> {
        validation::validate_plan_patch(&patch)?;

        let txn = begin(&self.db).await?;
        let result = self.update_plan_in(&txn, ctx.tenant_id(), id, patch).await;
        let details = finish(txn, result).await?;

        info!(plan_id = %id, "Plan updated");
        Ok(details)
    }

    async fn update_plan_in(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        id: Uuid,
        patch: PlanPatch,
    ) -> Result<PlanDetails, DomainError> {
        let mut plan = self
            .repo
            .find(txn, id)
            .await?
            .ok_or_else(|| DomainError::plan_not_found(id))?;

        if let Some(code) = &patch.code
            && *code != plan.code
            && self.repo.find_by_code(txn, code).await?.is_some()
        {
            return Err(DomainError::plan_code_taken(code.clone()));
        }

        apply_patch(&mut plan, patch);
        plan.updated_at = Utc::now();

        let plan = self.repo.update(txn, plan).await?;
        self.repo.details(txn, tenant_id, plan).await
    }

    /// Replace the plan's bundle. Any unknown module code rejects the whole call.
    pub async fn replace_plan_modules(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        modules: Vec<ModuleAssignment>,
    ) -> Result<PlanDetails, DomainError> {
        validation::validate_assignments("modules", &modules)?;

        let txn = begin(&self.db).await?;
        let result = self
            .replace_plan_modules_in(&txn, ctx.tenant_id(), id, &modules)
            .await;
        let details = finish(txn, result).await?;

        info!(plan_id = %id, modules = details.modules.len(), "Plan modules replaced");
        Ok(details)
    }

    async fn replace_plan_modules_in(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        id: Uuid,
        modules: &[ModuleAssignment],
    ) -> Result<PlanDetails, DomainError> {
        let mut plan = self
            .repo
            .find(txn, id)
            .await?
            .ok_or_else(|| DomainError::plan_not_found(id))?;
        let resolved = self.resolve_strict(txn, modules).await?;
        self.repo.replace_modules(txn, id, &resolved).await?;

        plan.updated_at = Utc::now();
        let plan = self.repo.update(txn, plan).await?;
        self.repo.details(txn, tenant_id, plan).await
    }

    /// Mark the plan inactive unless an `active` subscription still uses it.
    pub async fn deactivate_plan(&self, id: Uuid) -> Result<Plan, DomainError> {
        let txn = begin(&self.db).await?;
        let result = self.deactivate_plan_in(&txn, id).await;
        let plan = finish(txn, result).await?;

        info!(plan_id = %id, plan_code = %plan.code, "Plan deactivated");
        Ok(plan)
    }

    async fn deactivate_plan_in(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Plan, DomainError> {
        let mut plan = self
            .repo
            .find(txn, id)
            .await?
            .ok_or_else(|| DomainError::plan_not_found(id))?;

        let in_use = self
            .repo
            .count_subscriptions(txn, id, SubscriptionStatus::Active)
            .await?;
        if in_use > 0 {
            return Err(DomainError::plan_in_use(plan.code, in_use));
        }

        plan.active = false;
        plan.updated_at = Utc::now();
        self.repo.update(txn, plan).await
    }

    async fn resolve_strict<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        modules: &[ModuleAssignment],
    ) -> Result<Vec<(Uuid, ModuleAssignment)>, DomainError> {
        let codes: Vec<String> = modules.iter().map(|a| a.module_code.clone()).collect();
        let catalog = self.catalog.resolve_codes(conn, &codes).await?;

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(modules.len());
        for assignment in modules {
            let Some(&module_id) = catalog.get(&assignment.module_code) else {
                return Err(DomainError::module_not_found(assignment.module_code.clone()));
            };
            if !seen.insert(module_id) {
                return Err(DomainError::validation(
                    "modules",
                    format!("module '{}' is listed more than once", assignment.module_code),
                ));
            }
            resolved.push((module_id, assignment.clone()));
        }
        Ok(resolved)
    }
}

fn apply_patch(plan: &mut Plan, patch: PlanPatch) {
    let PlanPatch {
        code,
        name,
        description,
        price_monthly,
        price_annual,
        trial_days,
        display_order,
        active,
        color,
        product_id,
        monthly_price_id,
        annual_price_id,
    } = patch;

    if let Some(v) = code {
        plan.code = v;
    }
    if let Some(v) = name {
        plan.name = v;
    }
    if description.is_some() {
        plan.description = description;
    }
    if let Some(v) = price_monthly {
        plan.price_monthly = v;
    }
    if price_annual.is_some() {
        plan.price_annual = price_annual;
    }
    if let Some(v) = trial_days {
        plan.trial_days = v;
    }
    if let Some(v) = display_order {
        plan.display_order = v;
    }
    if let Some(v) = active {
        plan.active = v;
    }
    if color.is_some() {
        plan.color = color;
    }
    if product_id.is_some() {
        plan.billing.product_id = product_id;
    }
    if monthly_price_id.is_some() {
        plan.billing.monthly_price_id = monthly_price_id;
    }
    if annual_price_id.is_some() {
        plan.billing.annual_price_id = annual_price_id;
    }
}
