//! Request authentication.
//!
//! Two credentials are accepted:
//! - `Authorization: Bearer <jwt>`: an HS256 user token carrying `sub` and `tenant_id`.
//! - `X-Service-Secret: <secret>`: internal services; the tenant comes from `?tenantId=`.
//!
//! A valid service secret wins over a bearer token when both are sent.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use entitlements_sdk::SecurityContext;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::error::ApiError;
use crate::config::AuthConfig;

pub const SERVICE_SECRET_HEADER: &str = "x-service-secret";

#[derive(Debug, Deserialize)]
struct UserClaims {
    sub: Uuid,
    tenant_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenantQuery {
    tenant_id: Option<String>,
}

/// Validates credentials and builds the caller's [`SecurityContext`].
pub struct Authenticator {
    jwt_key: Option<DecodingKey>,
    validation: Validation,
    service_secret: Option<[u8; 32]>,
}

impl Authenticator {
    pub fn new(cfg: &AuthConfig) -> Self {
        let jwt_key = cfg
            .is_jwt_configured()
            .then(|| DecodingKey::from_secret(cfg.jwt_secret.expose_secret().as_bytes()));
        let service_secret = cfg
            .service_secret
            .as_ref()
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty())
            .map(digest);

        Self {
            jwt_key,
            validation: Validation::new(Algorithm::HS256),
            service_secret,
        }
    }

    /// Resolve the caller of a request.
    pub fn authenticate(&self, parts: &Parts) -> Result<SecurityContext, ApiError> {
        if self.is_service_request(&parts.headers) {
            let tenant_id = service_tenant(parts)?;
            tracing::debug!(%tenant_id, "Authenticated service request");
            return Ok(SecurityContext::service(tenant_id));
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::unauthorized("Missing token. Use: Authorization: Bearer <token>")
        })?;
        let key = self
            .jwt_key
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized("Token authentication is not configured"))?;

        let claims = decode::<UserClaims>(token, key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                ApiError::unauthorized("Invalid or expired token")
            })?
            .claims;

        Ok(SecurityContext::user(claims.tenant_id, claims.sub))
    }

    fn is_service_request(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.service_secret else {
            return false;
        };
        headers
            .get(SERVICE_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .is_some_and(|provided| {
                bool::from(digest(provided).as_slice().ct_eq(expected.as_slice()))
            })
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn service_tenant(parts: &Parts) -> Result<Uuid, ApiError> {
    let Query(query) = Query::<TenantQuery>::try_from_uri(&parts.uri)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let raw = query
        .tenant_id
        .ok_or_else(|| ApiError::invalid_field("tenantId", "is required for service requests"))?;
    Uuid::parse_str(&raw).map_err(|_| ApiError::invalid_field("tenantId", "must be a valid UUID"))
}

fn authenticator(parts: &Parts) -> Result<Arc<Authenticator>, ApiError> {
    parts.extensions.get::<Arc<Authenticator>>().cloned().ok_or_else(|| {
        tracing::error!("Authenticator extension missing from router");
        ApiError::internal()
    })
}

/// Any authenticated caller: a user token or an internal service.
#[derive(Debug, Clone)]
pub struct Caller(pub SecurityContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticator(parts)?.authenticate(parts).map(Caller)
    }
}

/// An authenticated dashboard user. Service callers get 403.
#[derive(Debug, Clone)]
pub struct AdminCaller(pub SecurityContext);

impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Caller(ctx) = Caller::from_request_parts(parts, state).await?;
        if !ctx.is_user() {
            return Err(ApiError::forbidden("This route requires a user token"));
        }
        Ok(AdminCaller(ctx))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use secrecy::SecretString;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: Uuid,
        tenant_id: Uuid,
        exp: usize,
    }

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::from("jwt-test-secret"),
            service_secret: Some(SecretString::from("svc-secret")),
        }
    }

    fn token(secret: &str, exp_offset: i64) -> String {
        let exp = usize::try_from(chrono::Utc::now().timestamp() + exp_offset).unwrap();
        let claims = Claims {
            sub: Uuid::nil(),
            tenant_id: Uuid::from_u128(7),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn valid_bearer_token_yields_user_context() {
        let auth = Authenticator::new(&config());
        let bearer = format!("Bearer {}", token("jwt-test-secret", 600));

        let ctx = auth
            .authenticate(&parts("/plans", &[("authorization", &bearer)]))
            .unwrap();

        assert!(ctx.is_user());
        assert_eq!(ctx.tenant_id(), Uuid::from_u128(7));
    }

    #[test]
    fn wrong_key_and_expired_tokens_are_rejected() {
        let auth = Authenticator::new(&config());
        for t in [token("other-secret", 600), token("jwt-test-secret", -600)] {
            let bearer = format!("Bearer {t}");
            let err = auth
                .authenticate(&parts("/plans", &[("authorization", &bearer)]))
                .unwrap_err();
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn missing_credentials_are_unauthorized() {
        let auth = Authenticator::new(&config());
        let err = auth.authenticate(&parts("/plans", &[])).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn service_secret_takes_tenant_from_query() {
        let auth = Authenticator::new(&config());
        let tenant = Uuid::new_v4();

        let ctx = auth
            .authenticate(&parts(
                &format!("/client-modules/x?tenantId={tenant}"),
                &[(SERVICE_SECRET_HEADER, "svc-secret")],
            ))
            .unwrap();

        assert!(!ctx.is_user());
        assert_eq!(ctx.tenant_id(), tenant);
    }

    #[test]
    fn service_request_needs_a_uuid_tenant() {
        let auth = Authenticator::new(&config());
        for uri in ["/plans", "/plans?tenantId=not-a-uuid"] {
            let err = auth
                .authenticate(&parts(uri, &[(SERVICE_SECRET_HEADER, "svc-secret")]))
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.details[0].field, "tenantId");
        }
    }

    #[test]
    fn wrong_service_secret_falls_through_to_bearer_check() {
        let auth = Authenticator::new(&config());
        let err = auth
            .authenticate(&parts(
                &format!("/plans?tenantId={}", Uuid::new_v4()),
                &[(SERVICE_SECRET_HEADER, "guess")],
            ))
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unset_service_secret_disables_service_auth() {
        let auth = Authenticator::new(&AuthConfig {
            service_secret: None,
            ..config()
        });
        let err = auth
            .authenticate(&parts(
                &format!("/plans?tenantId={}", Uuid::new_v4()),
                &[(SERVICE_SECRET_HEADER, "")],
            ))
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
