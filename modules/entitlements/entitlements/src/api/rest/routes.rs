use std::sync::Arc;

use axum::Router;
use axum::extract::Extension;
use axum::routing::{get, patch, post, put};

use super::auth::Authenticator;
use super::{handlers, openapi};
use crate::module::ConcreteAppServices;

/// All entitlement routes. Static segments (`/plans/all`, `/client-modules/stats`)
/// take precedence over the `{id}` captures next to them.
pub fn router(services: Arc<ConcreteAppServices>, auth: Arc<Authenticator>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(openapi::serve))
        .route("/modules", get(handlers::list_modules))
        .route("/modules/all", get(handlers::list_all_modules))
        .route(
            "/plans",
            get(handlers::list_plans).post(handlers::create_plan),
        )
        .route("/plans/all", get(handlers::list_all_plans))
        .route("/plans/by-code/{code}", get(handlers::get_plan_by_code))
        .route(
            "/plans/{id}",
            get(handlers::get_plan)
                .put(handlers::update_plan)
                .delete(handlers::delete_plan),
        )
        .route("/plans/{id}/modules", put(handlers::replace_plan_modules))
        .route("/client-modules/stats", get(handlers::stats))
        .route("/client-modules/{clientId}", get(handlers::get_client_modules))
        .route(
            "/client-modules/{clientId}/activate",
            post(handlers::activate),
        )
        .route("/client-modules/{clientId}/toggle", patch(handlers::toggle))
        .route("/clients/{clientId}", put(handlers::register_client))
        .route(
            "/subscriptions/{clientId}",
            post(handlers::start_subscription),
        )
        .route(
            "/subscriptions/{clientId}/status",
            patch(handlers::update_subscription_status),
        )
        .layer(Extension(auth))
        .layer(Extension(services))
}
