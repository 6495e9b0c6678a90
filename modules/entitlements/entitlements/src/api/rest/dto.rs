use axum::Json;
use chrono::{DateTime, Utc};
use entitlements_sdk::{
    ActivationOutcome, ActivationSource, BillingProviderIds, Client, ClientEntitlement,
    ClientEntitlements, Module, ModuleAssignment, ModulePopularity, ModuleUsage, NewPlan,
    NewSubscription, PlanDetails, PlanDistribution, PlanModule, PlanPatch, PlanSnapshot,
    Subscription, SubscriptionSnapshot, SubscriptionStatus, TenantStats,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::ApiError;

/// Success envelope: `{success: true, data, message?}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn ok<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
        message: None,
    })
}

pub fn ok_with_message<T>(data: T, message: impl Into<String>) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
        message: Some(message.into()),
    })
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDto {
    pub id: Uuid,
    pub code: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    #[schema(value_type = String)]
    pub price_per_month: Decimal,
    pub display_order: i32,
    pub active: bool,
}

impl From<Module> for ModuleDto {
    fn from(m: Module) -> Self {
        Self {
            id: m.id,
            code: m.code,
            display_name: m.display_name,
            description: m.description,
            category: m.category,
            icon: m.icon,
            price_per_month: m.price_per_month,
            display_order: m.display_order,
            active: m.active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleUsageDto {
    #[serde(flatten)]
    pub module: ModuleDto,
    pub plan_count: u64,
    pub client_count: u64,
}

impl From<ModuleUsage> for ModuleUsageDto {
    fn from(u: ModuleUsage) -> Self {
        Self {
            module: u.module.into(),
            plan_count: u.plan_count,
            client_count: u.client_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanModuleDto {
    pub module_id: Uuid,
    pub module_code: String,
    pub module_name: String,
    pub usage_limit: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub config: Option<serde_json::Value>,
}

impl From<PlanModule> for PlanModuleDto {
    fn from(pm: PlanModule) -> Self {
        Self {
            module_id: pm.module_id,
            module_code: pm.module_code,
            module_name: pm.module_name,
            usage_limit: pm.usage_limit,
            config: pm.config,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price_monthly: Decimal,
    #[schema(value_type = Option<String>)]
    pub price_annual: Option<Decimal>,
    pub trial_days: i32,
    pub display_order: i32,
    pub active: bool,
    pub color: Option<String>,
    pub product_id: Option<String>,
    pub monthly_price_id: Option<String>,
    pub annual_price_id: Option<String>,
    pub modules: Vec<PlanModuleDto>,
    pub subscription_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanDetails> for PlanDto {
    fn from(d: PlanDetails) -> Self {
        let plan = d.plan;
        Self {
            id: plan.id,
            code: plan.code,
            name: plan.name,
            description: plan.description,
            price_monthly: plan.price_monthly,
            price_annual: plan.price_annual,
            trial_days: plan.trial_days,
            display_order: plan.display_order,
            active: plan.active,
            color: plan.color,
            product_id: plan.billing.product_id,
            monthly_price_id: plan.billing.monthly_price_id,
            annual_price_id: plan.billing.annual_price_id,
            modules: d.modules.into_iter().map(Into::into).collect(),
            subscription_count: d.subscription_count,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

/// Result of `DELETE /plans/{id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeactivatedPlanDto {
    pub id: Uuid,
    pub code: String,
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAssignmentDto {
    pub module_code: String,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub config: Option<serde_json::Value>,
}

impl From<ModuleAssignmentDto> for ModuleAssignment {
    fn from(dto: ModuleAssignmentDto) -> Self {
        Self {
            module_code: dto.module_code,
            usage_limit: dto.usage_limit,
            config: dto.config,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price_monthly: Decimal,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price_annual: Option<Decimal>,
    #[serde(default)]
    pub trial_days: i32,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub monthly_price_id: Option<String>,
    #[serde(default)]
    pub annual_price_id: Option<String>,
    #[serde(default)]
    pub modules: Vec<ModuleAssignmentDto>,
}

impl From<CreatePlanRequest> for NewPlan {
    fn from(req: CreatePlanRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            description: req.description,
            price_monthly: req.price_monthly,
            price_annual: req.price_annual,
            trial_days: req.trial_days,
            display_order: req.display_order,
            active: req.active,
            color: req.color,
            billing: BillingProviderIds {
                product_id: req.product_id,
                monthly_price_id: req.monthly_price_id,
                annual_price_id: req.annual_price_id,
            },
            modules: req.modules.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price_monthly: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price_annual: Option<Decimal>,
    #[serde(default)]
    pub trial_days: Option<i32>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub monthly_price_id: Option<String>,
    #[serde(default)]
    pub annual_price_id: Option<String>,
}

impl From<UpdatePlanRequest> for PlanPatch {
    fn from(req: UpdatePlanRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            description: req.description,
            price_monthly: req.price_monthly,
            price_annual: req.price_annual,
            trial_days: req.trial_days,
            display_order: req.display_order,
            active: req.active,
            color: req.color,
            product_id: req.product_id,
            monthly_price_id: req.monthly_price_id,
            annual_price_id: req.annual_price_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplacePlanModulesRequest {
    pub modules: Vec<ModuleAssignmentDto>,
}

// ---------------------------------------------------------------------------
// Client modules
// ---------------------------------------------------------------------------

/// Exactly one of `planCode` or `modules` must be given.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[serde(default)]
    pub plan_code: Option<String>,
    #[serde(default)]
    pub modules: Option<Vec<ModuleAssignmentDto>>,
}

impl TryFrom<ActivateRequest> for ActivationSource {
    type Error = ApiError;

    fn try_from(req: ActivateRequest) -> Result<Self, Self::Error> {
        match (req.plan_code, req.modules) {
            (Some(plan_code), None) => Ok(Self::Plan { plan_code }),
            (None, Some(modules)) => Ok(Self::Modules(
                modules.into_iter().map(Into::into).collect(),
            )),
            (Some(_), Some(_)) => Err(ApiError::bad_request(
                "Provide either planCode or modules, not both",
            )),
            (None, None) => Err(ApiError::bad_request("Provide planCode or modules")),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResultDto {
    pub count: usize,
    pub activated_codes: Vec<String>,
    pub skipped_codes: Vec<String>,
    pub deactivated_codes: Vec<String>,
}

impl From<ActivationOutcome> for ActivationResultDto {
    fn from(o: ActivationOutcome) -> Self {
        Self {
            count: o.count(),
            activated_codes: o.activated_codes,
            skipped_codes: o.skipped_codes,
            deactivated_codes: o.deactivated_codes,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub module_code: String,
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientModuleDto {
    pub module_id: Uuid,
    pub module_code: String,
    pub module_name: String,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub active: bool,
    pub usage_limit: Option<i32>,
    pub usage_current: i32,
    #[schema(value_type = Option<Object>)]
    pub config: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientEntitlement> for ClientModuleDto {
    fn from(e: ClientEntitlement) -> Self {
        Self {
            module_id: e.module.id,
            module_code: e.module.code,
            module_name: e.module.display_name,
            category: e.module.category,
            icon: e.module.icon,
            active: e.active,
            usage_limit: e.usage_limit,
            usage_current: e.usage_current,
            config: e.config,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshotDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[schema(value_type = String)]
    pub price_monthly: Decimal,
}

impl From<PlanSnapshot> for PlanSnapshotDto {
    fn from(p: PlanSnapshot) -> Self {
        Self {
            id: p.id,
            code: p.code,
            name: p.name,
            price_monthly: p.price_monthly,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSnapshotDto {
    pub id: Uuid,
    pub status: String,
    pub plan: Option<PlanSnapshotDto>,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionSnapshot> for SubscriptionSnapshotDto {
    fn from(s: SubscriptionSnapshot) -> Self {
        Self {
            id: s.id,
            status: s.status.as_str().to_owned(),
            plan: s.plan.map(Into::into),
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientEntitlementsDto {
    pub client_id: Uuid,
    pub modules: Vec<ClientModuleDto>,
    pub subscription: Option<SubscriptionSnapshotDto>,
    pub active_module_codes: Vec<String>,
}

impl From<ClientEntitlements> for ClientEntitlementsDto {
    fn from(e: ClientEntitlements) -> Self {
        Self {
            client_id: e.client_id,
            modules: e.modules.into_iter().map(Into::into).collect(),
            subscription: e.subscription.map(Into::into),
            active_module_codes: e.active_module_codes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanDistributionDto {
    pub plan_code: String,
    pub plan_name: String,
    pub count: u64,
}

impl From<PlanDistribution> for PlanDistributionDto {
    fn from(p: PlanDistribution) -> Self {
        Self {
            plan_code: p.plan_code,
            plan_name: p.plan_name,
            count: p.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModulePopularityDto {
    pub module_code: String,
    pub module_name: String,
    pub count: u64,
}

impl From<ModulePopularity> for ModulePopularityDto {
    fn from(m: ModulePopularity) -> Self {
        Self {
            module_code: m.module_code,
            module_name: m.module_name,
            count: m.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub plan_distribution: Vec<PlanDistributionDto>,
    pub module_popularity: Vec<ModulePopularityDto>,
}

impl From<TenantStats> for StatsDto {
    fn from(s: TenantStats) -> Self {
        Self {
            plan_distribution: s.plan_distribution.into_iter().map(Into::into).collect(),
            module_popularity: s.module_popularity.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Clients and subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterClientRequest {
    pub display_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientDto {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            tenant_id: c.tenant_id,
            display_name: c.display_name,
            created_at: c.created_at,
        }
    }
}

fn parse_status(raw: &str) -> Result<SubscriptionStatus, ApiError> {
    raw.parse().map_err(|_| {
        let allowed = SubscriptionStatus::ALL.map(SubscriptionStatus::as_str).join(", ");
        ApiError::invalid_field("status", format!("must be one of: {allowed}"))
    })
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSubscriptionRequest {
    pub plan_code: String,
    /// `active` (default) or `trial`.
    #[serde(default)]
    pub status: Option<String>,
}

impl TryFrom<StartSubscriptionRequest> for NewSubscription {
    type Error = ApiError;

    fn try_from(req: StartSubscriptionRequest) -> Result<Self, Self::Error> {
        let status = match req.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => SubscriptionStatus::Active,
        };
        Ok(Self {
            plan_code: req.plan_code,
            status,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
}

impl UpdateStatusRequest {
    pub fn status(&self) -> Result<SubscriptionStatus, ApiError> {
        parse_status(&self.status)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub client_id: Uuid,
    pub plan_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionDto {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            client_id: s.client_id,
            plan_id: s.plan_id,
            status: s.status.as_str().to_owned(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthDto {
    pub status: &'static str,
}
