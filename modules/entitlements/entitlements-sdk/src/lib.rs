//! Entitlements SDK
//!
//! This crate provides the public API for the `entitlements` module:
//! - `EntitlementsApi` trait
//! - Model types for the module catalog, plans, subscriptions and client entitlements
//! - Error type (`EntitlementsError`)
//! - `SecurityContext` carried by every call
//!
//! ## Usage
//!
//! Feature-gating code in other parts of the platform holds an
//! `Arc<dyn EntitlementsApi>` and asks it what a client may use:
//! ```ignore
//! use entitlements_sdk::EntitlementsApi;
//!
//! if api.is_module_active(&ctx, client_id, "facturation").await? {
//!     // expose invoicing screens
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod context;
pub mod errors;
pub mod models;

pub use api::EntitlementsApi;
pub use context::{SecurityContext, Subject};
pub use errors::{EntitlementsError, FieldViolation};
pub use models::{
    ActivationOutcome, ActivationSource, BillingProviderIds, Client, ClientEntitlement,
    ClientEntitlements, Module, ModuleAssignment, ModulePopularity, ModuleUsage, NewModule,
    NewPlan, NewSubscription, Plan, PlanDetails, PlanDistribution, PlanModule, PlanPatch,
    PlanSnapshot, Subscription, SubscriptionSnapshot, SubscriptionStatus, TenantStats,
    UnknownStatus,
};
