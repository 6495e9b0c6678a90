//! Public models for the `entitlements` module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the `entitlements` module and its consumers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A business capability that can be enabled per client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: Uuid,
    pub code: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub price_per_month: Decimal,
    pub display_order: i32,
    pub active: bool,
}

/// Data for creating or refreshing a catalog module, keyed by `code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewModule {
    pub code: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub price_per_month: Decimal,
    pub display_order: i32,
    pub active: bool,
}

/// A catalog module with the number of plans and client rows referencing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleUsage {
    pub module: Module,
    pub plan_count: u64,
    pub client_count: u64,
}

/// External billing identifiers attached to a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BillingProviderIds {
    pub product_id: Option<String>,
    pub monthly_price_id: Option<String>,
    pub annual_price_id: Option<String>,
}

/// A named, priced bundle of modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_monthly: Decimal,
    pub price_annual: Option<Decimal>,
    pub trial_days: i32,
    pub display_order: i32,
    pub active: bool,
    pub color: Option<String>,
    pub billing: BillingProviderIds,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A module included in a plan, with the plan's overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanModule {
    pub module_id: Uuid,
    pub module_code: String,
    pub module_name: String,
    pub usage_limit: Option<i32>,
    pub config: Option<serde_json::Value>,
}

/// A plan with its module set and the number of subscriptions pointing at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDetails {
    pub plan: Plan,
    pub modules: Vec<PlanModule>,
    pub subscription_count: u64,
}

/// One requested module, referenced by code, with optional overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAssignment {
    pub module_code: String,
    pub usage_limit: Option<i32>,
    pub config: Option<serde_json::Value>,
}

impl ModuleAssignment {
    pub fn new(module_code: impl Into<String>) -> Self {
        Self {
            module_code: module_code.into(),
            usage_limit: None,
            config: None,
        }
    }

    #[must_use]
    pub fn with_usage_limit(mut self, limit: i32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// Data for creating a new plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlan {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_monthly: Decimal,
    pub price_annual: Option<Decimal>,
    pub trial_days: i32,
    pub display_order: i32,
    pub active: bool,
    pub color: Option<String>,
    pub billing: BillingProviderIds,
    pub modules: Vec<ModuleAssignment>,
}

/// Partial update data for a plan. `None` leaves the field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_monthly: Option<Decimal>,
    pub price_annual: Option<Decimal>,
    pub trial_days: Option<i32>,
    pub display_order: Option<i32>,
    pub active: Option<bool>,
    pub color: Option<String>,
    pub product_id: Option<String>,
    pub monthly_price_id: Option<String>,
    pub annual_price_id: Option<String>,
}

impl PlanPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// End-client reference row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle status of a client subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionStatus {
    Trial,
    Active,
    PastDue,
    Canceled,
    Suspended,
}

impl SubscriptionStatus {
    pub const ALL: [Self; 5] = [
        Self::Trial,
        Self::Active,
        Self::PastDue,
        Self::Canceled,
        Self::Suspended,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Suspended => "suspended",
        }
    }

    /// A current subscription is the one a client is billed and provisioned against.
    #[must_use]
    pub fn is_current(self) -> bool {
        matches!(self, Self::Trial | Self::Active)
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use SubscriptionStatus::{Active, Canceled, PastDue, Suspended, Trial};
        matches!(
            (self, next),
            (Trial, Active | Canceled | PastDue)
                | (Active, PastDue | Canceled | Suspended)
                | (PastDue, Active | Canceled | Suspended)
                | (Suspended, Active | Canceled)
        )
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known subscription status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown subscription status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for SubscriptionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

/// A client's subscription to a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub client_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to start a new subscription for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub plan_code: String,
    pub status: SubscriptionStatus,
}

/// Where a provisioning pass takes its module set from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationSource {
    /// The modules bundled in the plan with this code.
    Plan { plan_code: String },
    /// An explicit module list.
    Modules(Vec<ModuleAssignment>),
}

/// Result of a provisioning pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationOutcome {
    /// Codes that are active after the pass, in request order.
    pub activated_codes: Vec<String>,
    /// Requested codes that are not in the catalog.
    pub skipped_codes: Vec<String>,
    /// Codes that were active before the pass and no longer are.
    pub deactivated_codes: Vec<String>,
}

impl ActivationOutcome {
    #[must_use]
    pub fn count(&self) -> usize {
        self.activated_codes.len()
    }
}

/// One entitlement row joined with its module metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntitlement {
    pub module: Module,
    pub active: bool,
    pub usage_limit: Option<i32>,
    pub usage_current: i32,
    pub config: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSnapshot {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub price_monthly: Decimal,
}

/// The client's current subscription as seen by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub id: Uuid,
    pub status: SubscriptionStatus,
    pub plan: Option<PlanSnapshot>,
    pub created_at: DateTime<Utc>,
}

/// Everything a consumer needs to gate features for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntitlements {
    pub client_id: Uuid,
    pub modules: Vec<ClientEntitlement>,
    pub subscription: Option<SubscriptionSnapshot>,
    pub active_module_codes: Vec<String>,
}

impl ClientEntitlements {
    #[must_use]
    pub fn is_active(&self, module_code: &str) -> bool {
        self.active_module_codes.iter().any(|c| c == module_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDistribution {
    pub plan_code: String,
    pub plan_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePopularity {
    pub module_code: String,
    pub module_name: String,
    pub count: u64,
}

/// Tenant-scoped reporting snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TenantStats {
    pub plan_distribution: Vec<PlanDistribution>,
    pub module_popularity: Vec<ModulePopularity>,
}
