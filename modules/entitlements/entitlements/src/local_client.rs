//! Local implementation of `EntitlementsApi`.
//!
//! This client is used for inter-module communication within the same process.
//! It delegates to the domain services and converts errors to SDK error types.

use std::sync::Arc;

use async_trait::async_trait;
use entitlements_sdk::{
    ActivationOutcome, ActivationSource, Client, ClientEntitlement, ClientEntitlements,
    EntitlementsApi, EntitlementsError, Module, ModuleAssignment, ModuleUsage, NewModule, NewPlan,
    NewSubscription, Plan, PlanDetails, PlanPatch, SecurityContext, Subscription,
    SubscriptionStatus, TenantStats,
};
use uuid::Uuid;

use crate::module::ConcreteAppServices;

pub struct EntitlementsLocalClient {
    services: Arc<ConcreteAppServices>,
}

impl EntitlementsLocalClient {
    #[must_use]
    pub fn new(services: Arc<ConcreteAppServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl EntitlementsApi for EntitlementsLocalClient {
    async fn list_modules(&self, _ctx: &SecurityContext) -> Result<Vec<Module>, EntitlementsError> {
        self.services
            .catalog
            .list_modules()
            .await
            .map_err(Into::into)
    }

    async fn list_all_modules(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<ModuleUsage>, EntitlementsError> {
        self.services
            .catalog
            .list_all_modules(ctx)
            .await
            .map_err(Into::into)
    }

    async fn upsert_module(
        &self,
        _ctx: &SecurityContext,
        module: NewModule,
    ) -> Result<Module, EntitlementsError> {
        self.services
            .catalog
            .upsert_module(module)
            .await
            .map_err(Into::into)
    }

    async fn list_plans(
        &self,
        ctx: &SecurityContext,
        include_inactive: bool,
    ) -> Result<Vec<PlanDetails>, EntitlementsError> {
        self.services
            .plans
            .list_plans(ctx, include_inactive)
            .await
            .map_err(Into::into)
    }

    async fn get_plan(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
    ) -> Result<PlanDetails, EntitlementsError> {
        self.services
            .plans
            .get_plan(ctx, id)
            .await
            .map_err(Into::into)
    }

    async fn get_plan_by_code(
        &self,
        ctx: &SecurityContext,
        code: &str,
    ) -> Result<PlanDetails, EntitlementsError> {
        self.services
            .plans
            .get_plan_by_code(ctx, code)
            .await
            .map_err(Into::into)
    }

    async fn create_plan(
        &self,
        ctx: &SecurityContext,
        plan: NewPlan,
    ) -> Result<PlanDetails, EntitlementsError> {
        self.services
            .plans
            .create_plan(ctx, plan)
            .await
            .map_err(Into::into)
    }

    async fn update_plan(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: PlanPatch,
    ) -> Result<PlanDetails, EntitlementsError> {
        self.services
            .plans
            .update_plan(ctx, id, patch)
            .await
            .map_err(Into::into)
    }

    async fn replace_plan_modules(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        modules: Vec<ModuleAssignment>,
    ) -> Result<PlanDetails, EntitlementsError> {
        self.services
            .plans
            .replace_plan_modules(ctx, id, modules)
            .await
            .map_err(Into::into)
    }

    async fn deactivate_plan(
        &self,
        _ctx: &SecurityContext,
        id: Uuid,
    ) -> Result<Plan, EntitlementsError> {
        self.services
            .plans
            .deactivate_plan(id)
            .await
            .map_err(Into::into)
    }

    async fn register_client(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        display_name: String,
    ) -> Result<Client, EntitlementsError> {
        self.services
            .subscriptions
            .register_client(ctx, client_id, display_name)
            .await
            .map_err(Into::into)
    }

    async fn start_subscription(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        subscription: NewSubscription,
    ) -> Result<Subscription, EntitlementsError> {
        self.services
            .subscriptions
            .start_subscription(ctx, client_id, subscription)
            .await
            .map_err(Into::into)
    }

    async fn set_subscription_status(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Subscription, EntitlementsError> {
        self.services
            .subscriptions
            .set_subscription_status(ctx, client_id, status)
            .await
            .map_err(Into::into)
    }

    async fn activate(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        source: ActivationSource,
    ) -> Result<ActivationOutcome, EntitlementsError> {
        self.services
            .provisioning
            .activate(ctx, client_id, source)
            .await
            .map_err(Into::into)
    }

    async fn toggle(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        module_code: &str,
        active: bool,
    ) -> Result<ClientEntitlement, EntitlementsError> {
        self.services
            .provisioning
            .toggle(ctx, client_id, module_code, active)
            .await
            .map_err(Into::into)
    }

    async fn get_entitlements(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
    ) -> Result<ClientEntitlements, EntitlementsError> {
        self.services
            .provisioning
            .get_entitlements(ctx, client_id)
            .await
            .map_err(Into::into)
    }

    async fn stats(&self, ctx: &SecurityContext) -> Result<TenantStats, EntitlementsError> {
        self.services
            .stats
            .stats(ctx)
            .await
            .map_err(Into::into)
    }
}
