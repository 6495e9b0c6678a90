//! Caller identity passed to every `EntitlementsApi` call.

use uuid::Uuid;

/// Who is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// An authenticated platform user (dashboard administrator).
    User(Uuid),
    /// An internal service such as the workflow engine, authenticated by shared secret.
    Service,
}

/// `SecurityContext` scopes every operation to one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    tenant_id: Uuid,
    subject: Subject,
}

impl SecurityContext {
    #[must_use]
    pub fn user(tenant_id: Uuid, user_id: Uuid) -> Self {
        Self {
            tenant_id,
            subject: Subject::User(user_id),
        }
    }

    #[must_use]
    pub fn service(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            subject: Subject::Service,
        }
    }

    /// Tenant every read and write is scoped to.
    #[must_use]
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// `true` when the caller is a platform user rather than an internal service.
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self.subject, Subject::User(_))
    }
}
