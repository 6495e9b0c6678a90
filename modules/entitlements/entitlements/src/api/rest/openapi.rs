use axum::Json;
use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};

use super::auth::SERVICE_SECRET_HEADER;
use super::{dto, error, handlers};

#[derive(OpenApi)]
#[openapi(
    info(title = "Entitlements API", description = "Module catalog, plans and client entitlements"),
    paths(
        handlers::health,
        handlers::list_modules,
        handlers::list_all_modules,
        handlers::list_plans,
        handlers::list_all_plans,
        handlers::get_plan,
        handlers::get_plan_by_code,
        handlers::create_plan,
        handlers::update_plan,
        handlers::replace_plan_modules,
        handlers::delete_plan,
        handlers::get_client_modules,
        handlers::activate,
        handlers::toggle,
        handlers::stats,
        handlers::register_client,
        handlers::start_subscription,
        handlers::update_subscription_status,
    ),
    components(schemas(
        dto::ModuleAssignmentDto,
        dto::ActivateRequest,
        dto::ToggleRequest,
        error::ErrorBody,
        error::FieldErrorDto,
    )),
    modifiers(&SecurityAddon),
    security(("bearer" = []), ("service_secret" = []))
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        components.add_security_scheme(
            "service_secret",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(SERVICE_SECRET_HEADER))),
        );
    }
}

pub async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
