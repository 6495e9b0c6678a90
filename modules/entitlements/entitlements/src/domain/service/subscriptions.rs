use std::sync::Arc;

use chrono::Utc;
use entitlements_sdk::{
    Client, NewSubscription, SecurityContext, Subscription, SubscriptionStatus,
};
use sea_orm::{DatabaseConnection, DatabaseTransaction};
use tracing::info;
use uuid::Uuid;

use super::{begin, finish};
use crate::domain::error::DomainError;
use crate::domain::locks::ClientLocks;
use crate::domain::repos::{PlansRepository, SubscriptionsRepository};
use crate::domain::validation;

/// Client registration and the subscription lifecycle.
pub struct SubscriptionsService<SR: SubscriptionsRepository, PR: PlansRepository> {
    db: DatabaseConnection,
    repo: Arc<SR>,
    plans: Arc<PR>,
    locks: Arc<ClientLocks>,
}

impl<SR: SubscriptionsRepository, PR: PlansRepository> SubscriptionsService<SR, PR> {
    pub fn new(
        db: DatabaseConnection,
        repo: Arc<SR>,
        plans: Arc<PR>,
        locks: Arc<ClientLocks>,
    ) -> Self {
        Self {
            db,
            repo,
            plans,
            locks,
        }
    }

    /// Create the client reference row, or rename it if it already exists for this tenant.
    pub async fn register_client(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        display_name: String,
    ) -> Result<Client, DomainError> {
        validation::validate_client_name(&display_name)?;
        let display_name = display_name.trim().to_owned();

        let txn = begin(&self.db).await?;
        let result = self
            .register_client_in(&txn, ctx.tenant_id(), client_id, display_name)
            .await;
        let client = finish(txn, result).await?;

        info!(tenant_id = %client.tenant_id, %client_id, "Client registered");
        Ok(client)
    }

    async fn register_client_in(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        client_id: Uuid,
        display_name: String,
    ) -> Result<Client, DomainError> {
        let now = Utc::now();
        match self.repo.find_client(txn, client_id).await? {
            Some(existing) if existing.tenant_id != tenant_id => {
                Err(DomainError::client_tenant_mismatch(client_id))
            }
            Some(_) => {
                self.repo
                    .rename_client(txn, client_id, display_name, now)
                    .await
            }
            None => {
                self.repo
                    .insert_client(
                        txn,
                        Client {
                            id: client_id,
                            tenant_id,
                            display_name,
                            created_at: now,
                        },
                    )
                    .await
            }
        }
    }

    /// Supersede the client's open subscriptions with a new one on `plan_code`.
    ///
    /// Modules are not provisioned here; callers follow up with an activation.
    pub async fn start_subscription(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        request: NewSubscription,
    ) -> Result<Subscription, DomainError> {
        validation::validate_plan_code("planCode", &request.plan_code)?;
        if !request.status.is_current() {
            return Err(DomainError::validation(
                "status",
                "a new subscription must start as 'trial' or 'active'",
            ));
        }

        let _guard = self.locks.acquire(client_id).await;
        let txn = begin(&self.db).await?;
        let result = self
            .start_subscription_in(&txn, ctx.tenant_id(), client_id, request)
            .await;
        let subscription = finish(txn, result).await?;

        info!(
            %client_id,
            subscription_id = %subscription.id,
            status = %subscription.status,
            "Subscription started"
        );
        Ok(subscription)
    }

    async fn start_subscription_in(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        client_id: Uuid,
        request: NewSubscription,
    ) -> Result<Subscription, DomainError> {
        self.repo
            .lock_client(txn, tenant_id, client_id)
            .await?
            .ok_or_else(|| DomainError::client_not_found(client_id))?;

        let plan = self
            .plans
            .find_by_code(txn, &request.plan_code)
            .await?
            .ok_or_else(|| DomainError::plan_not_found(&request.plan_code))?;
        if !plan.active {
            return Err(DomainError::validation("planCode", "plan is not active"));
        }

        let now = Utc::now();
        self.repo.cancel_open(txn, tenant_id, client_id, now).await?;
        self.repo
            .insert(
                txn,
                Subscription {
                    id: Uuid::new_v4(),
                    tenant_id,
                    client_id,
                    plan_id: plan.id,
                    status: request.status,
                    created_at: now,
                    updated_at: now,
                },
            )
            .await
    }

    /// Move the client's latest subscription to `status` along the allowed transitions.
    pub async fn set_subscription_status(
        &self,
        ctx: &SecurityContext,
        client_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Subscription, DomainError> {
        let _guard = self.locks.acquire(client_id).await;
        let txn = begin(&self.db).await?;
        let result = self
            .set_status_in(&txn, ctx.tenant_id(), client_id, status)
            .await;
        let subscription = finish(txn, result).await?;

        info!(
            %client_id,
            subscription_id = %subscription.id,
            status = %subscription.status,
            "Subscription status set"
        );
        Ok(subscription)
    }

    async fn set_status_in(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        client_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Subscription, DomainError> {
        self.repo
            .lock_client(txn, tenant_id, client_id)
            .await?
            .ok_or_else(|| DomainError::client_not_found(client_id))?;

        let latest = self
            .repo
            .latest(txn, tenant_id, client_id)
            .await?
            .ok_or_else(|| DomainError::subscription_not_found(client_id))?;

        if latest.status == status {
            return Ok(latest);
        }
        if !latest.status.can_transition_to(status) {
            return Err(DomainError::invalid_transition(latest.status, status));
        }

        self.repo.set_status(txn, latest, status, Utc::now()).await
    }
}
