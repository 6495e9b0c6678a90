use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entitlements_sdk::{
    Client, PlanDistribution, Subscription, SubscriptionSnapshot, SubscriptionStatus,
};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Repository trait for client reference rows and their subscriptions.
#[async_trait]
pub trait SubscriptionsRepository: Send + Sync {
    /// Find a client by id regardless of tenant.
    async fn find_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Client>, DomainError>;

    /// Find the tenant's client and lock its row until the transaction ends.
    async fn lock_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Client>, DomainError>;

    async fn insert_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        client: Client,
    ) -> Result<Client, DomainError>;

    async fn rename_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
        display_name: String,
        now: DateTime<Utc>,
    ) -> Result<Client, DomainError>;

    /// Newest subscription with status trial or active, with its plan.
    async fn current<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<SubscriptionSnapshot>, DomainError>;

    /// Newest subscription of any status.
    async fn latest<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Point every current subscription of the client at `plan_id`.
    async fn repoint_current<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        plan_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Cancel every subscription of the client that is not already canceled.
    async fn cancel_open<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    async fn insert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        subscription: Subscription,
    ) -> Result<Subscription, DomainError>;

    async fn set_status<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        subscription: Subscription,
        status: SubscriptionStatus,
        now: DateTime<Utc>,
    ) -> Result<Subscription, DomainError>;

    /// Current subscriptions of the tenant counted per plan, every plan included.
    async fn plan_distribution<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
    ) -> Result<Vec<PlanDistribution>, DomainError>;
}
