use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use entitlements_sdk::{
    ModuleAssignment, NewPlan, Plan, PlanDetails, PlanModule, SubscriptionStatus,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::error::{DomainError, db_err};
use crate::domain::repos::PlansRepository;
use crate::infra::storage::entity::client_subscription::Status;
use crate::infra::storage::entity::{client_subscription, module, plan, plan_module};
use crate::infra::storage::mapper;

/// ORM-based implementation of the `PlansRepository` trait.
#[derive(Clone, Default)]
pub struct OrmPlansRepository;

impl OrmPlansRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn details_many<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        plans: Vec<Plan>,
    ) -> Result<Vec<PlanDetails>, DomainError> {
        if plans.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();

        let rows = plan_module::Entity::find()
            .find_also_related(module::Entity)
            .filter(plan_module::Column::PlanId.is_in(ids.clone()))
            .order_by_asc(module::Column::DisplayOrder)
            .order_by_asc(module::Column::Code)
            .all(conn)
            .await
            .map_err(db_err)?;

        let mut modules: HashMap<Uuid, Vec<PlanModule>> = HashMap::new();
        for (pm, m) in rows {
            if let Some(m) = m {
                modules
                    .entry(pm.plan_id)
                    .or_default()
                    .push(mapper::to_plan_module(pm, m));
            }
        }

        let counts: HashMap<Uuid, u64> = client_subscription::Entity::find()
            .select_only()
            .column_as(client_subscription::Column::PlanId, "plan_id")
            .column_as(Expr::col(client_subscription::Column::Id).count(), "count")
            .filter(client_subscription::Column::TenantId.eq(tenant_id))
            .filter(client_subscription::Column::PlanId.is_in(ids))
            .filter(client_subscription::Column::Status.is_in(Status::CURRENT))
            .group_by(client_subscription::Column::PlanId)
            .into_model::<PlanCount>()
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|r| (r.plan_id, u64::try_from(r.count).unwrap_or_default()))
            .collect();

        Ok(plans
            .into_iter()
            .map(|plan| PlanDetails {
                modules: modules.remove(&plan.id).unwrap_or_default(),
                subscription_count: counts.get(&plan.id).copied().unwrap_or_default(),
                plan,
            })
            .collect())
    }
}

#[derive(Debug, FromQueryResult)]
struct PlanCount {
    plan_id: Uuid,
    count: i64,
}

fn active_model(p: &Plan) -> plan::ActiveModel {
    plan::ActiveModel {
        id: Set(p.id),
        code: Set(p.code.clone()),
        name: Set(p.name.clone()),
        description: Set(p.description.clone()),
        price_monthly: Set(p.price_monthly),
        price_annual: Set(p.price_annual),
        trial_days: Set(p.trial_days),
        display_order: Set(p.display_order),
        active: Set(p.active),
        color: Set(p.color.clone()),
        billing_product_id: Set(p.billing.product_id.clone()),
        billing_monthly_price_id: Set(p.billing.monthly_price_id.clone()),
        billing_annual_price_id: Set(p.billing.annual_price_id.clone()),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

#[async_trait]
impl PlansRepository for OrmPlansRepository {
    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<PlanDetails>, DomainError> {
        let mut query = plan::Entity::find();
        if !include_inactive {
            query = query.filter(plan::Column::Active.eq(true));
        }
        let plans = query
            .order_by_asc(plan::Column::DisplayOrder)
            .order_by_asc(plan::Column::Code)
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Into::into)
            .collect();
        self.details_many(conn, tenant_id, plans).await
    }

    async fn details<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        plan: Plan,
    ) -> Result<PlanDetails, DomainError> {
        let id = plan.id;
        self.details_many(conn, tenant_id, vec![plan])
            .await?
            .pop()
            .ok_or_else(|| DomainError::plan_not_found(id))
    }

    async fn find<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Plan>, DomainError> {
        let found = plan::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_by_code<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<Option<Plan>, DomainError> {
        let found = plan::Entity::find()
            .filter(plan::Column::Code.eq(code))
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn insert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        new_plan: &NewPlan,
    ) -> Result<Plan, DomainError> {
        let now = Utc::now();
        let plan = Plan {
            id: Uuid::new_v4(),
            code: new_plan.code.clone(),
            name: new_plan.name.clone(),
            description: new_plan.description.clone(),
            price_monthly: new_plan.price_monthly,
            price_annual: new_plan.price_annual,
            trial_days: new_plan.trial_days,
            display_order: new_plan.display_order,
            active: new_plan.active,
            color: new_plan.color.clone(),
            billing: new_plan.billing.clone(),
            created_at: now,
            updated_at: now,
        };
        let saved = active_model(&plan).insert(conn).await.map_err(db_err)?;
        Ok(saved.into())
    }

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan: Plan,
    ) -> Result<Plan, DomainError> {
        let saved = active_model(&plan).update(conn).await.map_err(db_err)?;
        Ok(saved.into())
    }

    async fn replace_modules<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan_id: Uuid,
        modules: &[(Uuid, ModuleAssignment)],
    ) -> Result<(), DomainError> {
        plan_module::Entity::delete_many()
            .filter(plan_module::Column::PlanId.eq(plan_id))
            .exec(conn)
            .await
            .map_err(db_err)?;

        if modules.is_empty() {
            return Ok(());
        }

        let rows = modules
            .iter()
            .map(|(module_id, a)| plan_module::ActiveModel {
                id: Set(Uuid::new_v4()),
                plan_id: Set(plan_id),
                module_id: Set(*module_id),
                usage_limit: Set(a.usage_limit),
                config: Set(a.config.clone()),
            });
        plan_module::Entity::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn assignments<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan_id: Uuid,
    ) -> Result<Vec<ModuleAssignment>, DomainError> {
        let rows = plan_module::Entity::find()
            .find_also_related(module::Entity)
            .filter(plan_module::Column::PlanId.eq(plan_id))
            .order_by_asc(module::Column::DisplayOrder)
            .order_by_asc(module::Column::Code)
            .all(conn)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(pm, m)| {
                m.map(|m| ModuleAssignment {
                    module_code: m.code,
                    usage_limit: pm.usage_limit,
                    config: pm.config,
                })
            })
            .collect())
    }

    async fn count_subscriptions<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<u64, DomainError> {
        client_subscription::Entity::find()
            .filter(client_subscription::Column::PlanId.eq(plan_id))
            .filter(client_subscription::Column::Status.eq(Status::from(status)))
            .count(conn)
            .await
            .map_err(db_err)
    }
}
