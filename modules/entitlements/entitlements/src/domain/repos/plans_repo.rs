use async_trait::async_trait;
use entitlements_sdk::{ModuleAssignment, NewPlan, Plan, PlanDetails, SubscriptionStatus};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Repository trait for plans and their module bundles.
///
/// Subscription counts in `PlanDetails` are scoped to `tenant_id`.
#[async_trait]
pub trait PlansRepository: Send + Sync {
    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<PlanDetails>, DomainError>;

    async fn details<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        plan: Plan,
    ) -> Result<PlanDetails, DomainError>;

    async fn find<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Plan>, DomainError>;

    async fn find_by_code<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<Option<Plan>, DomainError>;

    /// Insert the plan row only; modules are written with `replace_modules`.
    async fn insert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan: &NewPlan,
    ) -> Result<Plan, DomainError>;

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan: Plan,
    ) -> Result<Plan, DomainError>;

    /// Delete every module row of the plan, then insert `modules`.
    async fn replace_modules<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan_id: Uuid,
        modules: &[(Uuid, ModuleAssignment)],
    ) -> Result<(), DomainError>;

    /// The plan's modules as assignments, in display order.
    async fn assignments<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan_id: Uuid,
    ) -> Result<Vec<ModuleAssignment>, DomainError>;

    /// Count subscriptions of any tenant with the given status on the plan.
    async fn count_subscriptions<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        plan_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<u64, DomainError>;
}
