#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the REST surface: routing, auth, envelope and status codes.

mod support;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use entitlements::config::AuthConfig;
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Value, json};
use support::TestContext;
use tower::ServiceExt;
use uuid::Uuid;

const JWT_SECRET: &str = "rest-test-jwt";
const SERVICE_SECRET: &str = "rest-test-service";

#[derive(Serialize)]
struct Claims {
    sub: Uuid,
    tenant_id: Uuid,
    exp: i64,
    role: &'static str,
}

struct Api {
    t: TestContext,
    router: Router,
    token: String,
}

impl Api {
    async fn new() -> Self {
        let t = TestContext::new().await;
        let router = t.module.router(&AuthConfig {
            jwt_secret: SecretString::from(JWT_SECRET),
            service_secret: Some(SecretString::from(SERVICE_SECRET)),
        });
        let claims = Claims {
            sub: Uuid::new_v4(),
            tenant_id: t.tenant_id,
            exp: chrono::Utc::now().timestamp() + 3600,
            role: "admin",
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .unwrap();
        Self { t, router, token }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn user(&self, method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.token));
        with_body(builder, body)
    }

    fn service(&self, method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let sep = if uri.contains('?') { '&' } else { '?' };
        let builder = Request::builder()
            .method(method)
            .uri(format!("{uri}{sep}tenantId={}", self.t.tenant_id))
            .header("x-service-secret", SERVICE_SECRET);
        with_body(builder, body)
    }
}

fn with_body(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let api = Api::new().await;

    let (status, body) = api
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = api
        .send(Request::get("/openapi.json").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/client-modules/{clientId}/activate"].is_object());
}

#[tokio::test]
async fn requests_without_credentials_are_unauthorized() {
    let api = Api::new().await;

    let (status, body) = api
        .send(Request::get("/modules").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn bad_tokens_and_secrets_are_unauthorized() {
    let api = Api::new().await;

    let forged = Request::get("/modules")
        .header("authorization", "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    assert_eq!(api.send(forged).await.0, StatusCode::UNAUTHORIZED);

    let wrong_secret = Request::get(format!("/modules?tenantId={}", Uuid::new_v4()))
        .header("x-service-secret", "guess")
        .body(Body::empty())
        .unwrap();
    assert_eq!(api.send(wrong_secret).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn service_calls_need_a_valid_tenant_id() {
    let api = Api::new().await;

    let request = Request::get("/modules?tenantId=123")
        .header("x-service-secret", SERVICE_SECRET)
        .body(Body::empty())
        .unwrap();
    let (status, body) = api.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "tenantId");
}

#[tokio::test]
async fn admin_routes_reject_service_callers() {
    let api = Api::new().await;

    for (method, uri) in [
        ("GET", "/modules/all"),
        ("GET", "/client-modules/stats"),
    ] {
        let (status, body) = api.send(api.service(method, uri, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"], "FORBIDDEN");
    }
    let (status, _) = api
        .send(api.service("POST", "/plans", Some(json!({"code": "x"}))))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn modules_are_listed_in_the_envelope() {
    let api = Api::new().await;

    let (status, body) = api.send(api.user("GET", "/modules", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 12);
    assert_eq!(body["data"][0]["code"], "facturation");
    assert_eq!(body["data"][0]["displayName"], "Facturation");
}

#[tokio::test]
async fn plan_lifecycle_over_http() {
    let api = Api::new().await;

    let (status, created) = api
        .send(api.user(
            "POST",
            "/plans",
            Some(json!({
                "code": "pro",
                "name": "Pro",
                "priceMonthly": "49.00",
                "modules": [{"moduleCode": "facturation", "usageLimit": 100}, {"moduleCode": "devis"}]
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_owned();
    assert_eq!(created["data"]["modules"].as_array().unwrap().len(), 2);
    let price: Decimal = created["data"]["priceMonthly"].as_str().unwrap().parse().unwrap();
    assert_eq!(price, Decimal::new(49, 0));

    let (status, _) = api
        .send(api.user("POST", "/plans", Some(json!({"code": "pro", "name": "Pro", "priceMonthly": 1}))))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = api
        .send(api.user("PUT", &format!("/plans/{id}"), Some(json!({"name": "Professional"}))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["name"], "Professional");

    let (status, _) = api
        .send(api.user(
            "PUT",
            &format!("/plans/{id}/modules"),
            Some(json!({"modules": [{"moduleCode": "ghost"}]})),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, by_code) = api.send(api.user("GET", "/plans/by-code/pro", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_code["data"]["modules"].as_array().unwrap().len(), 2);

    let (status, deleted) = api
        .send(api.user("DELETE", &format!("/plans/{id}"), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"]["active"], false);
    assert_eq!(deleted["message"], "Plan deactivated");

    let (_, listed) = api.send(api.user("GET", "/plans", None)).await;
    assert!(listed["data"].as_array().unwrap().is_empty());
    let (_, all) = api.send(api.user("GET", "/plans/all", None)).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn validation_errors_list_fields() {
    let api = Api::new().await;

    let (status, body) = api
        .send(api.user(
            "POST",
            "/plans",
            Some(json!({"code": "Bad Code", "name": "P", "priceMonthly": "-1"})),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    let fields: Vec<_> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(fields, vec!["code", "name", "priceMonthly"]);
}

#[tokio::test]
async fn malformed_json_and_ids_are_bad_requests() {
    let api = Api::new().await;

    let broken = Request::post("/plans")
        .header("authorization", format!("Bearer {}", api.token))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = api.send(broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = api
        .send(api.user("GET", "/client-modules/not-a-uuid", None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn workflow_provisions_a_client_with_the_service_secret() {
    let api = Api::new().await;
    api.t.plan("pro", &["facturation", "devis"]).await;
    let client = Uuid::new_v4();

    let (status, _) = api
        .send(api.service("PUT", &format!("/clients/{client}"), Some(json!({"displayName": "ACME"}))))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, sub) = api
        .send(api.service(
            "POST",
            &format!("/subscriptions/{client}"),
            Some(json!({"planCode": "pro", "status": "trial"})),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub["data"]["status"], "trial");

    let (status, activated) = api
        .send(api.service(
            "POST",
            &format!("/client-modules/{client}/activate"),
            Some(json!({"planCode": "pro"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activated["data"]["count"], 2);
    assert_eq!(activated["message"], "2 module(s) activated");

    let (status, read) = api
        .send(api.service("GET", &format!("/client-modules/{client}"), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut codes: Vec<_> = read["data"]["activeModuleCodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_owned())
        .collect();
    codes.sort();
    assert_eq!(codes, vec!["devis", "facturation"]);
    assert_eq!(read["data"]["subscription"]["plan"]["code"], "pro");
}

#[tokio::test]
async fn activation_errors_map_to_status_codes() {
    let api = Api::new().await;
    let client = api.t.client("ACME").await;
    let uri = format!("/client-modules/{client}/activate");

    let (status, _) = api
        .send(api.user("POST", &uri, Some(json!({"planCode": "nope"}))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = api
        .send(api.user("POST", &uri, Some(json!({"planCode": "pro", "modules": []}))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = api
        .send(api.user(
            "POST",
            &format!("/client-modules/{}/activate", Uuid::new_v4()),
            Some(json!({"modules": []})),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn toggle_and_stats_for_dashboard_users() {
    let api = Api::new().await;
    let client = api.t.client("ACME").await;

    let (status, toggled) = api
        .send(api.user(
            "PATCH",
            &format!("/client-modules/{client}/toggle"),
            Some(json!({"moduleCode": "leads", "active": true})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["data"]["moduleCode"], "leads");
    assert_eq!(toggled["data"]["active"], true);

    let (status, stats) = api.send(api.user("GET", "/client-modules/stats", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["modulePopularity"][0]["moduleCode"], "leads");
    assert_eq!(stats["data"]["modulePopularity"][0]["count"], 1);
}

#[tokio::test]
async fn subscription_status_changes_are_checked() {
    let api = Api::new().await;
    api.t.plan("pro", &[]).await;
    let client = api.t.client("ACME").await;
    api.send(api.user(
        "POST",
        &format!("/subscriptions/{client}"),
        Some(json!({"planCode": "pro"})),
    ))
    .await;
    let uri = format!("/subscriptions/{client}/status");

    let (status, body) = api
        .send(api.user("PATCH", &uri, Some(json!({"status": "trial"}))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");

    let (status, body) = api
        .send(api.user("PATCH", &uri, Some(json!({"status": "gone"}))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");

    let (status, body) = api
        .send(api.user("PATCH", &uri, Some(json!({"status": "past_due"}))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "past_due");
}
