use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub price_per_month: Decimal,
    pub display_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::plan_module::Entity")]
    PlanModule,
    #[sea_orm(has_many = "super::client_module::Entity")]
    ClientModule,
}

impl Related<super::plan_module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanModule.def()
    }
}

impl Related<super::client_module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientModule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
