mod catalog_repo;
mod client_modules_repo;
mod plans_repo;
mod subscriptions_repo;

pub use catalog_repo::CatalogRepository;
pub use client_modules_repo::ClientModulesRepository;
pub use plans_repo::PlansRepository;
pub use subscriptions_repo::SubscriptionsRepository;
