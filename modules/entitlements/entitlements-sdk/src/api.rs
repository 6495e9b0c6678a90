//! `EntitlementsApi` trait definition.
//!
//! This trait defines the public API for the `entitlements` module.
//! All methods require a `SecurityContext`; client-scoped data is always
//! filtered by the context's tenant.

use async_trait::async_trait;
use uuid::Uuid;

use crate::context::SecurityContext;
use crate::errors::EntitlementsError;
use crate::models::{
    ActivationOutcome, ActivationSource, Client, ClientEntitlement, ClientEntitlements, Module,
    ModuleAssignment, ModuleUsage, NewModule, NewPlan, NewSubscription, Plan, PlanDetails,
    PlanPatch, Subscription, SubscriptionStatus, TenantStats,
};

/// Public API trait for the `entitlements` module.
///
/// ```ignore
/// let api: Arc<dyn EntitlementsApi> = module.client();
/// let codes = api.active_module_codes(&ctx, client_id).await?;
/// ```
#[async_trait]
pub trait EntitlementsApi: Send + Sync {
    // -- Module catalog --

    /// List active catalog modules ordered by display order.
    async fn list_modules(&self, ctx: &SecurityContext) -> Result<Vec<Module>, EntitlementsError>;

    /// List every catalog module with its plan and client usage counts.
    async fn list_all_modules(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<ModuleUsage>, EntitlementsError>;

    /// Insert or refresh a catalog module by code.
    async fn upsert_module(
        &self,
        ctx: &SecurityContext,
        module: NewModule,
    ) -> Result<Module, EntitlementsError>;

    // -- Plan registry --

    async fn list_plans(
        &self,
        ctx: &SecurityContext,
        include_inactive: bool,
    ) -> Result<Vec<PlanDetails>, EntitlementsError>;

    async fn get_plan(&self, ctx: &SecurityContext, id: Uuid)
    -> Result<PlanDetails, EntitlementsError>;

    async fn get_plan_by_code(
        &self,
        ctx: &SecurityContext,
        code: &str,
    ) -> Result<PlanDetails, EntitlementsError>;

    async fn create_plan(
        &self,
        ctx: &SecurityContext,
        plan: NewPlan,
    ) -> Result<PlanDetails, EntitlementsError>;

    async fn update_plan(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: PlanPatch,
    ) -> Result<PlanDetails, EntitlementsError>;

    /// Atomically replace the plan's module set.
    async fn replace_plan_modules(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        modules: Vec<ModuleAssignment>,
    ) -> Result<PlanDetails, EntitlementsError>;

    /// Mark a plan inactive. Fails with `Conflict` while active subscriptions use it.
    async fn deactivate_plan(&self, ctx: &SecurityContext, id: Uuid)
    -> Result<Plan, EntitlementsError>;

    // -- Clients & subscriptions --

    async fn register_client(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        display_name: String,
    ) -> Result<Client, EntitlementsError>;

    async fn start_subscription(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        subscription: NewSubscription,
    ) -> Result<Subscription, EntitlementsError>;

    async fn set_subscription_status(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Subscription, EntitlementsError>;

    // -- Provisioning --

    /// Replace the client's active module set from a plan or an explicit list.
    async fn activate(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        source: ActivationSource,
    ) -> Result<ActivationOutcome, EntitlementsError>;

    /// Flip a single module for a client without touching its usage counter.
    async fn toggle(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        module_code: &str,
        active: bool,
    ) -> Result<ClientEntitlement, EntitlementsError>;

    async fn get_entitlements(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
    ) -> Result<ClientEntitlements, EntitlementsError>;

    /// Codes of the modules the client can currently use.
    async fn active_module_codes(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
    ) -> Result<Vec<String>, EntitlementsError> {
        Ok(self
            .get_entitlements(ctx, client_id)
            .await?
            .active_module_codes)
    }

    async fn is_module_active(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        module_code: &str,
    ) -> Result<bool, EntitlementsError> {
        Ok(self
            .get_entitlements(ctx, client_id)
            .await?
            .is_active(module_code))
    }

    // -- Reporting --

    async fn stats(&self, ctx: &SecurityContext) -> Result<TenantStats, EntitlementsError>;
}
