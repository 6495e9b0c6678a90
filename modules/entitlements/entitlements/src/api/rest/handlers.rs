use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use entitlements_sdk::{ActivationSource, NewSubscription};
use uuid::Uuid;

use super::auth::{AdminCaller, Caller};
use super::dto::{
    ActivateRequest, ActivationResultDto, ClientDto, ClientEntitlementsDto, ClientModuleDto,
    CreatePlanRequest, DeactivatedPlanDto, Envelope, HealthDto, ModuleDto, ModuleUsageDto,
    PlanDto, RegisterClientRequest, ReplacePlanModulesRequest, StartSubscriptionRequest,
    StatsDto, SubscriptionDto, ToggleRequest, UpdatePlanRequest, UpdateStatusRequest, ok,
    ok_with_message,
};
use super::error::{ApiResult, ErrorBody};
use super::extract::{ApiJson, ApiPath};
use crate::module::ConcreteAppServices;

type Services = Extension<Arc<ConcreteAppServices>>;
type JsonEnvelope<T> = Json<Envelope<T>>;

#[utoipa::path(
    get, path = "/health", tag = "System",
    responses((status = 200, body = HealthDto))
)]
pub async fn health() -> Json<HealthDto> {
    Json(HealthDto { status: "ok" })
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// Active catalog modules in display order.
#[utoipa::path(
    get, path = "/modules", tag = "Modules",
    responses(
        (status = 200, body = Envelope<Vec<ModuleDto>>),
        (status = 401, body = ErrorBody),
    )
)]
pub async fn list_modules(
    Extension(svc): Services,
    Caller(_ctx): Caller,
) -> ApiResult<JsonEnvelope<Vec<ModuleDto>>> {
    let modules = svc.catalog.list_modules().await?;
    Ok(ok(modules.into_iter().map(Into::into).collect()))
}

/// Every catalog module with plan and client counts.
#[utoipa::path(
    get, path = "/modules/all", tag = "Modules",
    responses(
        (status = 200, body = Envelope<Vec<ModuleUsageDto>>),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
    )
)]
pub async fn list_all_modules(
    Extension(svc): Services,
    AdminCaller(ctx): AdminCaller,
) -> ApiResult<JsonEnvelope<Vec<ModuleUsageDto>>> {
    let modules = svc.catalog.list_all_modules(&ctx).await?;
    Ok(ok(modules.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[utoipa::path(
    get, path = "/plans", tag = "Plans",
    responses(
        (status = 200, body = Envelope<Vec<PlanDto>>),
        (status = 401, body = ErrorBody),
    )
)]
pub async fn list_plans(
    Extension(svc): Services,
    Caller(ctx): Caller,
) -> ApiResult<JsonEnvelope<Vec<PlanDto>>> {
    let plans = svc.plans.list_plans(&ctx, false).await?;
    Ok(ok(plans.into_iter().map(Into::into).collect()))
}

/// Active and inactive plans.
#[utoipa::path(
    get, path = "/plans/all", tag = "Plans",
    responses(
        (status = 200, body = Envelope<Vec<PlanDto>>),
        (status = 401, body = ErrorBody),
    )
)]
pub async fn list_all_plans(
    Extension(svc): Services,
    Caller(ctx): Caller,
) -> ApiResult<JsonEnvelope<Vec<PlanDto>>> {
    let plans = svc.plans.list_plans(&ctx, true).await?;
    Ok(ok(plans.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get, path = "/plans/{id}", tag = "Plans",
    params(("id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, body = Envelope<PlanDto>),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn get_plan(
    Extension(svc): Services,
    Caller(ctx): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<JsonEnvelope<PlanDto>> {
    let plan = svc.plans.get_plan(&ctx, id).await?;
    Ok(ok(plan.into()))
}

#[utoipa::path(
    get, path = "/plans/by-code/{code}", tag = "Plans",
    params(("code" = String, Path, description = "Plan code")),
    responses(
        (status = 200, body = Envelope<PlanDto>),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn get_plan_by_code(
    Extension(svc): Services,
    Caller(ctx): Caller,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<JsonEnvelope<PlanDto>> {
    let plan = svc.plans.get_plan_by_code(&ctx, &code).await?;
    Ok(ok(plan.into()))
}

#[utoipa::path(
    post, path = "/plans", tag = "Plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, body = Envelope<PlanDto>),
        (status = 400, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody, description = "Unknown module code"),
        (status = 409, body = ErrorBody, description = "Plan code already exists"),
    )
)]
pub async fn create_plan(
    Extension(svc): Services,
    AdminCaller(ctx): AdminCaller,
    ApiJson(req): ApiJson<CreatePlanRequest>,
) -> ApiResult<(StatusCode, JsonEnvelope<PlanDto>)> {
    let plan = svc.plans.create_plan(&ctx, req.into()).await?;
    Ok((StatusCode::CREATED, ok(plan.into())))
}

#[utoipa::path(
    put, path = "/plans/{id}", tag = "Plans",
    params(("id" = Uuid, Path, description = "Plan id")),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, body = Envelope<PlanDto>),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody),
    )
)]
pub async fn update_plan(
    Extension(svc): Services,
    AdminCaller(ctx): AdminCaller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdatePlanRequest>,
) -> ApiResult<JsonEnvelope<PlanDto>> {
    let plan = svc.plans.update_plan(&ctx, id, req.into()).await?;
    Ok(ok(plan.into()))
}

/// Replace the plan's module list. Unknown module codes reject the whole request.
#[utoipa::path(
    put, path = "/plans/{id}/modules", tag = "Plans",
    params(("id" = Uuid, Path, description = "Plan id")),
    request_body = ReplacePlanModulesRequest,
    responses(
        (status = 200, body = Envelope<PlanDto>),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn replace_plan_modules(
    Extension(svc): Services,
    AdminCaller(ctx): AdminCaller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ReplacePlanModulesRequest>,
) -> ApiResult<JsonEnvelope<PlanDto>> {
    let modules = req.modules.into_iter().map(Into::into).collect();
    let plan = svc.plans.replace_plan_modules(&ctx, id, modules).await?;
    Ok(ok(plan.into()))
}

/// Soft delete: marks the plan inactive.
#[utoipa::path(
    delete, path = "/plans/{id}", tag = "Plans",
    params(("id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, body = Envelope<DeactivatedPlanDto>),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody, description = "Active subscriptions reference the plan"),
    )
)]
pub async fn delete_plan(
    Extension(svc): Services,
    AdminCaller(_ctx): AdminCaller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<JsonEnvelope<DeactivatedPlanDto>> {
    let plan = svc.plans.deactivate_plan(id).await?;
    let dto = DeactivatedPlanDto {
        id: plan.id,
        code: plan.code,
        active: plan.active,
    };
    Ok(ok_with_message(dto, "Plan deactivated"))
}

// ---------------------------------------------------------------------------
// Client modules
// ---------------------------------------------------------------------------

#[utoipa::path(
    get, path = "/client-modules/{clientId}", tag = "Client modules",
    params(("clientId" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, body = Envelope<ClientEntitlementsDto>),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn get_client_modules(
    Extension(svc): Services,
    Caller(ctx): Caller,
    ApiPath(client_id): ApiPath<Uuid>,
) -> ApiResult<JsonEnvelope<ClientEntitlementsDto>> {
    let entitlements = svc.provisioning.get_entitlements(&ctx, client_id).await?;
    Ok(ok(entitlements.into()))
}

/// Make a plan's modules, or an explicit list, the client's exact active set.
#[utoipa::path(
    post, path = "/client-modules/{clientId}/activate", tag = "Client modules",
    params(("clientId" = Uuid, Path, description = "Client id")),
    request_body = ActivateRequest,
    responses(
        (status = 200, body = Envelope<ActivationResultDto>),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody, description = "Unknown client or plan"),
    )
)]
pub async fn activate(
    Extension(svc): Services,
    Caller(ctx): Caller,
    ApiPath(client_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ActivateRequest>,
) -> ApiResult<JsonEnvelope<ActivationResultDto>> {
    let source = ActivationSource::try_from(req)?;
    let outcome = svc.provisioning.activate(&ctx, client_id, source).await?;
    let message = format!("{} module(s) activated", outcome.count());
    Ok(ok_with_message(outcome.into(), message))
}

#[utoipa::path(
    patch, path = "/client-modules/{clientId}/toggle", tag = "Client modules",
    params(("clientId" = Uuid, Path, description = "Client id")),
    request_body = ToggleRequest,
    responses(
        (status = 200, body = Envelope<ClientModuleDto>),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn toggle(
    Extension(svc): Services,
    AdminCaller(ctx): AdminCaller,
    ApiPath(client_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ToggleRequest>,
) -> ApiResult<JsonEnvelope<ClientModuleDto>> {
    let entitlement = svc
        .provisioning
        .toggle(&ctx, client_id, &req.module_code, req.active)
        .await?;
    Ok(ok(entitlement.into()))
}

/// Plan distribution and module popularity for the caller's tenant.
#[utoipa::path(
    get, path = "/client-modules/stats", tag = "Client modules",
    responses(
        (status = 200, body = Envelope<StatsDto>),
        (status = 403, body = ErrorBody),
    )
)]
pub async fn stats(
    Extension(svc): Services,
    AdminCaller(ctx): AdminCaller,
) -> ApiResult<JsonEnvelope<StatsDto>> {
    let stats = svc.stats.stats(&ctx).await?;
    Ok(ok(stats.into()))
}

// ---------------------------------------------------------------------------
// Clients and subscriptions
// ---------------------------------------------------------------------------

/// Create or rename the client reference row in the caller's tenant.
#[utoipa::path(
    put, path = "/clients/{clientId}", tag = "Subscriptions",
    params(("clientId" = Uuid, Path, description = "Client id")),
    request_body = RegisterClientRequest,
    responses(
        (status = 200, body = Envelope<ClientDto>),
        (status = 400, body = ErrorBody),
        (status = 409, body = ErrorBody, description = "Client belongs to another tenant"),
    )
)]
pub async fn register_client(
    Extension(svc): Services,
    Caller(ctx): Caller,
    ApiPath(client_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<RegisterClientRequest>,
) -> ApiResult<JsonEnvelope<ClientDto>> {
    let client = svc
        .subscriptions
        .register_client(&ctx, client_id, req.display_name)
        .await?;
    Ok(ok(client.into()))
}

/// Start a subscription on a plan, canceling any open one.
#[utoipa::path(
    post, path = "/subscriptions/{clientId}", tag = "Subscriptions",
    params(("clientId" = Uuid, Path, description = "Client id")),
    request_body = StartSubscriptionRequest,
    responses(
        (status = 201, body = Envelope<SubscriptionDto>),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn start_subscription(
    Extension(svc): Services,
    Caller(ctx): Caller,
    ApiPath(client_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StartSubscriptionRequest>,
) -> ApiResult<(StatusCode, JsonEnvelope<SubscriptionDto>)> {
    let request = NewSubscription::try_from(req)?;
    let subscription = svc
        .subscriptions
        .start_subscription(&ctx, client_id, request)
        .await?;
    Ok((StatusCode::CREATED, ok(subscription.into())))
}

#[utoipa::path(
    patch, path = "/subscriptions/{clientId}/status", tag = "Subscriptions",
    params(("clientId" = Uuid, Path, description = "Client id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, body = Envelope<SubscriptionDto>),
        (status = 400, body = ErrorBody, description = "Unknown status or forbidden transition"),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_subscription_status(
    Extension(svc): Services,
    AdminCaller(ctx): AdminCaller,
    ApiPath(client_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> ApiResult<JsonEnvelope<SubscriptionDto>> {
    let status = req.status()?;
    let subscription = svc
        .subscriptions
        .set_subscription_status(&ctx, client_id, status)
        .await?;
    Ok(ok(subscription.into()))
}
