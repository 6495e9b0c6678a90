use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_monthly: Decimal,
    pub price_annual: Option<Decimal>,
    pub trial_days: i32,
    pub display_order: i32,
    pub active: bool,
    pub color: Option<String>,
    pub billing_product_id: Option<String>,
    pub billing_monthly_price_id: Option<String>,
    pub billing_annual_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::plan_module::Entity")]
    PlanModule,
    #[sea_orm(has_many = "super::client_subscription::Entity")]
    ClientSubscription,
}

impl Related<super::plan_module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanModule.def()
    }
}

impl Related<super::client_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientSubscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
