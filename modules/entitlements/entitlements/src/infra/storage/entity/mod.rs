pub mod client;
pub mod client_module;
pub mod client_subscription;
pub mod module;
pub mod plan;
pub mod plan_module;
