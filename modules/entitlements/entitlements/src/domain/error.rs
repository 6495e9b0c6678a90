use entitlements_sdk::{EntitlementsError, FieldViolation, SubscriptionStatus};
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Client not found: {id}")]
    ClientNotFound { id: Uuid },

    #[error("Client {id} belongs to another tenant")]
    ClientTenantMismatch { id: Uuid },

    #[error("Plan not found: {key}")]
    PlanNotFound { key: String },

    #[error("Module not found: {code}")]
    ModuleNotFound { code: String },

    #[error("Client {client_id} has no subscription")]
    SubscriptionNotFound { client_id: Uuid },

    #[error("Plan with code '{code}' already exists")]
    PlanCodeTaken { code: String },

    #[error("Cannot deactivate plan '{code}': {active_subscriptions} active subscription(s) still use it")]
    PlanInUse {
        code: String,
        active_subscriptions: u64,
    },

    #[error("Invalid subscription status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },

    #[error("Validation failed: {}", summarize(.violations))]
    Validation { violations: Vec<FieldViolation> },

    #[error("Database error: {message}")]
    Database { message: String },
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    pub fn client_not_found(id: Uuid) -> Self {
        Self::ClientNotFound { id }
    }

    pub fn client_tenant_mismatch(id: Uuid) -> Self {
        Self::ClientTenantMismatch { id }
    }

    pub fn plan_not_found(key: impl ToString) -> Self {
        Self::PlanNotFound {
            key: key.to_string(),
        }
    }

    pub fn module_not_found(code: impl Into<String>) -> Self {
        Self::ModuleNotFound { code: code.into() }
    }

    pub fn subscription_not_found(client_id: Uuid) -> Self {
        Self::SubscriptionNotFound { client_id }
    }

    pub fn plan_code_taken(code: impl Into<String>) -> Self {
        Self::PlanCodeTaken { code: code.into() }
    }

    pub fn plan_in_use(code: impl Into<String>, active_subscriptions: u64) -> Self {
        Self::PlanInUse {
            code: code.into(),
            active_subscriptions,
        }
    }

    pub fn invalid_transition(from: SubscriptionStatus, to: SubscriptionStatus) -> Self {
        Self::InvalidStatusTransition { from, to }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            violations: vec![FieldViolation::new(field, message)],
        }
    }

    pub fn violations(violations: Vec<FieldViolation>) -> Self {
        Self::Validation { violations }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

/// Map any infrastructure error into `DomainError::Database`.
#[allow(clippy::needless_pass_by_value)]
pub fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::database(e.to_string())
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for EntitlementsError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::ClientNotFound { id } => Self::not_found("Client", id.to_string()),
            DomainError::PlanNotFound { key } => Self::not_found("Plan", key),
            DomainError::ModuleNotFound { code } => Self::not_found("Module", code),
            DomainError::SubscriptionNotFound { client_id } => {
                Self::not_found("Subscription", client_id.to_string())
            }
            e @ (DomainError::ClientTenantMismatch { .. }
            | DomainError::PlanCodeTaken { .. }
            | DomainError::PlanInUse { .. }) => Self::conflict(e.to_string()),
            DomainError::InvalidStatusTransition { from, to } => Self::validation(
                format!("Cannot move subscription from '{from}' to '{to}'"),
                vec![FieldViolation::new(
                    "status",
                    format!("transition from '{from}' is not allowed"),
                )],
            ),
            DomainError::Validation { violations } => {
                Self::validation(summarize(&violations), violations)
            }
            DomainError::Database { .. } => Self::internal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_do_not_leak_details() {
        let sdk: EntitlementsError = DomainError::database("connection refused").into();
        assert!(matches!(sdk, EntitlementsError::Internal));
        assert!(!sdk.to_string().contains("connection"));
    }

    #[test]
    fn plan_in_use_maps_to_conflict() {
        let sdk: EntitlementsError = DomainError::plan_in_use("pro", 3).into();
        match sdk {
            EntitlementsError::Conflict { message } => assert!(message.contains("3 active")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn validation_keeps_field_details() {
        let sdk: EntitlementsError = DomainError::validation("code", "too short").into();
        match sdk {
            EntitlementsError::Validation { violations, .. } => {
                assert_eq!(violations, vec![FieldViolation::new("code", "too short")]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
