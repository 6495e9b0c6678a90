use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entitlements_sdk::{ClientEntitlement, ModulePopularity};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::domain::diff::{CurrentEntitlement, PlannedUpsert};
use crate::domain::error::{DomainError, db_err};
use crate::domain::repos::ClientModulesRepository;
use crate::infra::storage::entity::{client_module, module};
use crate::infra::storage::mapper;

/// ORM-based implementation of the `ClientModulesRepository` trait.
#[derive(Clone, Default)]
pub struct OrmClientModulesRepository;

impl OrmClientModulesRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, FromQueryResult)]
struct PopularityRow {
    code: String,
    display_name: String,
    count: i64,
}

fn client_rows(
    tenant_id: Uuid,
    client_id: Uuid,
) -> sea_orm::SelectTwo<client_module::Entity, module::Entity> {
    client_module::Entity::find()
        .find_also_related(module::Entity)
        .filter(client_module::Column::TenantId.eq(tenant_id))
        .filter(client_module::Column::ClientId.eq(client_id))
}

#[async_trait]
impl ClientModulesRepository for OrmClientModulesRepository {
    async fn list_for_client<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<ClientEntitlement>, DomainError> {
        let rows = client_rows(tenant_id, client_id)
            .order_by_asc(module::Column::DisplayOrder)
            .order_by_asc(module::Column::Code)
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .filter_map(|(cm, m)| m.map(|m| mapper::client_entitlement(cm, m)))
            .collect())
    }

    async fn find<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        module_id: Uuid,
    ) -> Result<Option<ClientEntitlement>, DomainError> {
        let found = client_rows(tenant_id, client_id)
            .filter(client_module::Column::ModuleId.eq(module_id))
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.and_then(|(cm, m)| m.map(|m| mapper::client_entitlement(cm, m))))
    }

    async fn current_rows<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<CurrentEntitlement>, DomainError> {
        let rows = client_rows(tenant_id, client_id)
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .filter_map(|(cm, m)| {
                m.map(|m| CurrentEntitlement {
                    module_id: cm.module_id,
                    module_code: m.code,
                    active: cm.active,
                })
            })
            .collect())
    }

    async fn deactivate_except<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        keep: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let mut update = client_module::Entity::update_many()
            .col_expr(client_module::Column::Active, Expr::value(false))
            .col_expr(client_module::Column::UpdatedAt, Expr::value(now))
            .filter(client_module::Column::TenantId.eq(tenant_id))
            .filter(client_module::Column::ClientId.eq(client_id))
            .filter(client_module::Column::Active.eq(true));
        if !keep.is_empty() {
            update = update.filter(client_module::Column::ModuleId.is_not_in(keep.iter().copied()));
        }
        let res = update.exec(conn).await.map_err(db_err)?;
        Ok(res.rows_affected)
    }

    async fn upsert_active<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        rows: &[PlannedUpsert],
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let models = rows.iter().map(|r| client_module::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            client_id: Set(client_id),
            module_id: Set(r.module_id),
            active: Set(true),
            usage_limit: Set(r.usage_limit),
            usage_current: Set(0),
            config: Set(r.config.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        });

        client_module::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([client_module::Column::ClientId, client_module::Column::ModuleId])
                    .update_columns([
                        client_module::Column::Active,
                        client_module::Column::UsageLimit,
                        client_module::Column::UsageCurrent,
                        client_module::Column::Config,
                        client_module::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(db_err)
    }

    async fn set_active<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        client_id: Uuid,
        module_id: Uuid,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let m = client_module::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            client_id: Set(client_id),
            module_id: Set(module_id),
            active: Set(active),
            usage_limit: Set(None),
            usage_current: Set(0),
            config: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        client_module::Entity::insert(m)
            .on_conflict(
                OnConflict::columns([client_module::Column::ClientId, client_module::Column::ModuleId])
                    .update_columns([client_module::Column::Active, client_module::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn module_popularity<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
    ) -> Result<Vec<ModulePopularity>, DomainError> {
        let rows = client_module::Entity::find()
            .select_only()
            .column(module::Column::Code)
            .column(module::Column::DisplayName)
            .column_as(
                Expr::col((client_module::Entity, client_module::Column::Id)).count(),
                "count",
            )
            .join(JoinType::InnerJoin, client_module::Relation::Module.def())
            .filter(client_module::Column::TenantId.eq(tenant_id))
            .filter(client_module::Column::Active.eq(true))
            .group_by(module::Column::Code)
            .group_by(module::Column::DisplayName)
            .into_model::<PopularityRow>()
            .all(conn)
            .await
            .map_err(db_err)?;

        let mut out: Vec<ModulePopularity> = rows
            .into_iter()
            .map(|r| ModulePopularity {
                module_code: r.code,
                module_name: r.display_name,
                count: u64::try_from(r.count).unwrap_or_default(),
            })
            .collect();
        out.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.module_code.cmp(&b.module_code))
        });
        Ok(out)
    }
}
