use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use entitlements_sdk::{Module, ModuleUsage, NewModule};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::error::{DomainError, db_err};
use crate::domain::repos::CatalogRepository;
use crate::infra::storage::entity::{client_module, module, plan_module};

/// ORM-based implementation of the `CatalogRepository` trait.
#[derive(Clone, Default)]
pub struct OrmCatalogRepository;

impl OrmCatalogRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, FromQueryResult)]
struct ModuleCount {
    id: Uuid,
    count: i64,
}

fn count_map(rows: Vec<ModuleCount>) -> HashMap<Uuid, u64> {
    rows.into_iter()
        .map(|r| (r.id, u64::try_from(r.count).unwrap_or_default()))
        .collect()
}

#[async_trait]
impl CatalogRepository for OrmCatalogRepository {
    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        active_only: bool,
    ) -> Result<Vec<Module>, DomainError> {
        let mut query = module::Entity::find();
        if active_only {
            query = query.filter(module::Column::Active.eq(true));
        }
        let rows = query
            .order_by_asc(module::Column::DisplayOrder)
            .order_by_asc(module::Column::Code)
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_usage<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
    ) -> Result<Vec<ModuleUsage>, DomainError> {
        let modules = self.list(conn, false).await?;

        let plan_counts = count_map(
            plan_module::Entity::find()
                .select_only()
                .column_as(plan_module::Column::ModuleId, "id")
                .column_as(Expr::col(plan_module::Column::Id).count(), "count")
                .group_by(plan_module::Column::ModuleId)
                .into_model::<ModuleCount>()
                .all(conn)
                .await
                .map_err(db_err)?,
        );

        let client_counts = count_map(
            client_module::Entity::find()
                .select_only()
                .column_as(client_module::Column::ModuleId, "id")
                .column_as(Expr::col(client_module::Column::Id).count(), "count")
                .filter(client_module::Column::TenantId.eq(tenant_id))
                .group_by(client_module::Column::ModuleId)
                .into_model::<ModuleCount>()
                .all(conn)
                .await
                .map_err(db_err)?,
        );

        Ok(modules
            .into_iter()
            .map(|module| ModuleUsage {
                plan_count: plan_counts.get(&module.id).copied().unwrap_or_default(),
                client_count: client_counts.get(&module.id).copied().unwrap_or_default(),
                module,
            })
            .collect())
    }

    async fn find_by_code<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<Option<Module>, DomainError> {
        let found = module::Entity::find()
            .filter(module::Column::Code.eq(code))
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn resolve_codes<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        codes: &[String],
    ) -> Result<HashMap<String, Uuid>, DomainError> {
        if codes.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = module::Entity::find()
            .filter(module::Column::Code.is_in(codes.iter().map(String::as_str)))
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(|m| (m.code, m.id)).collect())
    }

    async fn upsert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        new_module: NewModule,
    ) -> Result<Module, DomainError> {
        let now = Utc::now();
        let code = new_module.code.clone();

        let m = module::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(new_module.code),
            display_name: Set(new_module.display_name),
            description: Set(new_module.description),
            category: Set(new_module.category),
            icon: Set(new_module.icon),
            price_per_month: Set(new_module.price_per_month),
            display_order: Set(new_module.display_order),
            active: Set(new_module.active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        module::Entity::insert(m)
            .on_conflict(
                OnConflict::column(module::Column::Code)
                    .update_columns([
                        module::Column::DisplayName,
                        module::Column::Description,
                        module::Column::Category,
                        module::Column::Icon,
                        module::Column::PricePerMonth,
                        module::Column::DisplayOrder,
                        module::Column::Active,
                        module::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;

        self.find_by_code(conn, &code)
            .await?
            .ok_or_else(|| DomainError::database(format!("module '{code}' missing after upsert")))
    }
}
