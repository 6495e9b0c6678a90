use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entitlements_sdk::{
    Client, PlanDistribution, Subscription, SubscriptionSnapshot, SubscriptionStatus,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::error::{DomainError, db_err};
use crate::domain::repos::SubscriptionsRepository;
use crate::infra::storage::entity::client_subscription::{self, Status};
use crate::infra::storage::entity::{client, plan};
use crate::infra::storage::mapper;

/// ORM-based implementation of the `SubscriptionsRepository` trait.
#[derive(Clone, Default)]
pub struct OrmSubscriptionsRepository;

impl OrmSubscriptionsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, FromQueryResult)]
struct PlanCount {
    plan_id: Uuid,
    count: i64,
}

#[async_trait]
impl SubscriptionsRepository for OrmSubscriptionsRepository {
    async fn find_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Client>, DomainError> {
        let found = client::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn lock_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Client>, DomainError> {
        // FOR UPDATE on Postgres; SQLite serializes writers on its own.
        let found = client::Entity::find()
            .filter(client::Column::Id.eq(id))
            .filter(client::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn insert_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        c: Client,
    ) -> Result<Client, DomainError> {
        let m = client::ActiveModel {
            id: Set(c.id),
            tenant_id: Set(c.tenant_id),
            display_name: Set(c.display_name),
            created_at: Set(c.created_at),
            updated_at: Set(c.created_at),
        };
        let saved = m.insert(conn).await.map_err(db_err)?;
        Ok(saved.into())
    }

    async fn rename_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
        display_name: String,
        now: DateTime<Utc>,
    ) -> Result<Client, DomainError> {
        let existing = client::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::client_not_found(id))?;

        let mut m = existing.into_active_model();
        m.display_name = Set(display_name);
        m.updated_at = Set(now);
        let saved = m.update(conn).await.map_err(db_err)?;
        Ok(saved.into())
    }

    async fn current<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<SubscriptionSnapshot>, DomainError> {
        let found = client_subscription::Entity::find()
            .find_also_related(plan::Entity)
            .filter(client_subscription::Column::TenantId.eq(tenant_id))
            .filter(client_subscription::Column::ClientId.eq(client_id))
            .filter(client_subscription::Column::Status.is_in(Status::CURRENT))
            .order_by_desc(client_subscription::Column::CreatedAt)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(|(s, p)| mapper::subscription_snapshot(s, p)))
    }

    async fn latest<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Subscription>, DomainError> {
        let found = client_subscription::Entity::find()
            .filter(client_subscription::Column::TenantId.eq(tenant_id))
            .filter(client_subscription::Column::ClientId.eq(client_id))
            .order_by_desc(client_subscription::Column::CreatedAt)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn repoint_current<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        plan_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let res = client_subscription::Entity::update_many()
            .col_expr(client_subscription::Column::PlanId, Expr::value(plan_id))
            .col_expr(client_subscription::Column::UpdatedAt, Expr::value(now))
            .filter(client_subscription::Column::TenantId.eq(tenant_id))
            .filter(client_subscription::Column::ClientId.eq(client_id))
            .filter(client_subscription::Column::Status.is_in(Status::CURRENT))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected)
    }

    async fn cancel_open<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let res = client_subscription::Entity::update_many()
            .col_expr(
                client_subscription::Column::Status,
                Expr::value(Status::Canceled.to_value()),
            )
            .col_expr(client_subscription::Column::UpdatedAt, Expr::value(now))
            .filter(client_subscription::Column::TenantId.eq(tenant_id))
            .filter(client_subscription::Column::ClientId.eq(client_id))
            .filter(client_subscription::Column::Status.ne(Status::Canceled))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected)
    }

    async fn insert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        s: Subscription,
    ) -> Result<Subscription, DomainError> {
        let m = client_subscription::ActiveModel {
            id: Set(s.id),
            tenant_id: Set(s.tenant_id),
            client_id: Set(s.client_id),
            plan_id: Set(s.plan_id),
            status: Set(s.status.into()),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
        };
        let saved = m.insert(conn).await.map_err(db_err)?;
        Ok(saved.into())
    }

    async fn set_status<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        s: Subscription,
        status: SubscriptionStatus,
        now: DateTime<Utc>,
    ) -> Result<Subscription, DomainError> {
        let m = client_subscription::ActiveModel {
            id: Set(s.id),
            tenant_id: Set(s.tenant_id),
            client_id: Set(s.client_id),
            plan_id: Set(s.plan_id),
            status: Set(status.into()),
            created_at: Set(s.created_at),
            updated_at: Set(now),
        };
        let saved = m.update(conn).await.map_err(db_err)?;
        Ok(saved.into())
    }

    async fn plan_distribution<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
    ) -> Result<Vec<PlanDistribution>, DomainError> {
        let counts: HashMap<Uuid, u64> = client_subscription::Entity::find()
            .select_only()
            .column_as(client_subscription::Column::PlanId, "plan_id")
            .column_as(Expr::col(client_subscription::Column::Id).count(), "count")
            .filter(client_subscription::Column::TenantId.eq(tenant_id))
            .filter(client_subscription::Column::Status.is_in(Status::CURRENT))
            .group_by(client_subscription::Column::PlanId)
            .into_model::<PlanCount>()
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|r| (r.plan_id, u64::try_from(r.count).unwrap_or_default()))
            .collect();

        let mut rows: Vec<PlanDistribution> = plan::Entity::find()
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|p| PlanDistribution {
                count: counts.get(&p.id).copied().unwrap_or_default(),
                plan_code: p.code,
                plan_name: p.name,
            })
            .collect();

        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.plan_code.cmp(&b.plan_code)));
        Ok(rows)
    }
}
