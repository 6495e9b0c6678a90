//! Domain layer - business rules of the entitlement engine.
//!
//! The domain layer:
//! - **MAY** import: `entitlements_sdk` (contract types), `sea_orm` connection traits
//! - **MUST NOT** import: `api::*` or `infra::*`
//! - **Uses**: SDK contract types as its models

pub mod diff;
pub mod error;
pub mod locks;
pub mod repos;
pub mod service;
pub mod validation;
