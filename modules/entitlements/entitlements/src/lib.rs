//! Entitlements Module
//!
//! Decides, per end-client, which business modules are enabled, keeps that
//! decision in sync with the client's plan, and stores usage ceilings.
//!
//! ## Public API
//!
//! The public API is defined in the `entitlements-sdk` crate and re-exported here:
//! - `EntitlementsApi` - trait for in-process consumers
//! - catalog, plan, subscription and entitlement models
//! - `EntitlementsError` - error types
//!
//! Other modules obtain a client with [`EntitlementsModule::client`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// === PUBLIC API (from SDK) ===
pub use entitlements_sdk::{
    ActivationOutcome, ActivationSource, ClientEntitlements, EntitlementsApi, EntitlementsError,
    ModuleAssignment, SecurityContext,
};

// === MODULE DEFINITION ===
pub mod module;
pub use module::EntitlementsModule;

// === LOCAL CLIENT ===
pub mod local_client;

// === INTERNAL MODULES ===
// WARNING: These modules are internal implementation details!
// They are exposed only for comprehensive testing and should NOT be used by external consumers.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
