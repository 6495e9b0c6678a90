use entitlements_sdk::{
    BillingProviderIds, Client, ClientEntitlement, Module, Plan, PlanModule, PlanSnapshot,
    Subscription, SubscriptionSnapshot,
};

use crate::infra::storage::entity::{
    client, client_module, client_subscription, module, plan, plan_module,
};

impl From<module::Model> for Module {
    fn from(m: module::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            display_name: m.display_name,
            description: m.description,
            category: m.category,
            icon: m.icon,
            price_per_month: m.price_per_month,
            display_order: m.display_order,
            active: m.active,
        }
    }
}

impl From<plan::Model> for Plan {
    fn from(p: plan::Model) -> Self {
        Self {
            id: p.id,
            code: p.code,
            name: p.name,
            description: p.description,
            price_monthly: p.price_monthly,
            price_annual: p.price_annual,
            trial_days: p.trial_days,
            display_order: p.display_order,
            active: p.active,
            color: p.color,
            billing: BillingProviderIds {
                product_id: p.billing_product_id,
                monthly_price_id: p.billing_monthly_price_id,
                annual_price_id: p.billing_annual_price_id,
            },
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<plan::Model> for PlanSnapshot {
    fn from(p: plan::Model) -> Self {
        Self {
            id: p.id,
            code: p.code,
            name: p.name,
            price_monthly: p.price_monthly,
        }
    }
}

impl From<client::Model> for Client {
    fn from(c: client::Model) -> Self {
        Self {
            id: c.id,
            tenant_id: c.tenant_id,
            display_name: c.display_name,
            created_at: c.created_at,
        }
    }
}

impl From<client_subscription::Model> for Subscription {
    fn from(s: client_subscription::Model) -> Self {
        Self {
            id: s.id,
            tenant_id: s.tenant_id,
            client_id: s.client_id,
            plan_id: s.plan_id,
            status: s.status.into(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Build a subscription snapshot from a subscription row and its (optional) plan row.
pub fn subscription_snapshot(
    s: client_subscription::Model,
    p: Option<plan::Model>,
) -> SubscriptionSnapshot {
    SubscriptionSnapshot {
        id: s.id,
        status: s.status.into(),
        plan: p.map(Into::into),
        created_at: s.created_at,
    }
}

pub fn to_plan_module(pm: plan_module::Model, m: module::Model) -> PlanModule {
    PlanModule {
        module_id: m.id,
        module_code: m.code,
        module_name: m.display_name,
        usage_limit: pm.usage_limit,
        config: pm.config,
    }
}

pub fn client_entitlement(cm: client_module::Model, m: module::Model) -> ClientEntitlement {
    ClientEntitlement {
        module: m.into(),
        active: cm.active,
        usage_limit: cm.usage_limit,
        usage_current: cm.usage_current,
        config: cm.config,
        updated_at: cm.updated_at,
    }
}
