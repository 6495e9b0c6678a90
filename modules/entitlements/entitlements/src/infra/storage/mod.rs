//! Infrastructure storage layer - database persistence.
//!
//! - `entity/` - SeaORM entity definitions
//! - `mapper.rs` - Conversions between SeaORM models and SDK contract types
//! - `migrations/` - Database schema migrations
//! - `*_sea_repo.rs` - Repository implementations
//! - `seed.rs` - Default module catalog

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod seed;

mod catalog_sea_repo;
mod client_modules_sea_repo;
mod plans_sea_repo;
mod subscriptions_sea_repo;

pub use catalog_sea_repo::OrmCatalogRepository;
pub use client_modules_sea_repo::OrmClientModulesRepository;
pub use plans_sea_repo::OrmPlansRepository;
pub use subscriptions_sea_repo::OrmSubscriptionsRepository;
