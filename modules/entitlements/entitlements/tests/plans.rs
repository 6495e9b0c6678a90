#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Catalog and plan registry behavior.

mod support;

use entitlements::{EntitlementsError, ModuleAssignment};
use entitlements_sdk::{NewModule, NewSubscription, PlanPatch, SubscriptionStatus};
use rust_decimal::Decimal;
use support::{TestContext, new_plan, user_ctx};
use uuid::Uuid;

fn subscription(plan_code: &str, status: SubscriptionStatus) -> NewSubscription {
    NewSubscription {
        plan_code: plan_code.to_owned(),
        status,
    }
}

#[tokio::test]
async fn seeded_catalog_is_listed_in_display_order() {
    let t = TestContext::new().await;

    let modules = t.api.list_modules(&t.ctx).await.unwrap();

    assert_eq!(modules.len(), 12);
    assert_eq!(modules[0].code, "facturation");
    assert!(modules.windows(2).all(|w| w[0].display_order <= w[1].display_order));
}

#[tokio::test]
async fn seeding_twice_does_not_duplicate_modules() {
    let t = TestContext::new().await;

    t.module.seed_catalog().await.unwrap();

    assert_eq!(t.api.list_modules(&t.ctx).await.unwrap().len(), 12);
}

#[tokio::test]
async fn inactive_modules_only_show_in_the_admin_listing() {
    let t = TestContext::new().await;
    t.api
        .upsert_module(
            &t.ctx,
            NewModule {
                code: "legacy".to_owned(),
                display_name: "Legacy".to_owned(),
                description: None,
                category: None,
                icon: None,
                price_per_month: Decimal::ZERO,
                display_order: 99,
                active: false,
            },
        )
        .await
        .unwrap();

    let public = t.api.list_modules(&t.ctx).await.unwrap();
    let all = t.api.list_all_modules(&t.ctx).await.unwrap();

    assert!(public.iter().all(|m| m.code != "legacy"));
    assert!(all.iter().any(|u| u.module.code == "legacy"));
}

#[tokio::test]
async fn module_usage_counts_plans_and_tenant_clients() {
    let t = TestContext::new().await;
    t.plan("starter", &["facturation"]).await;
    t.plan("pro", &["facturation", "devis"]).await;
    let client = t.client("ACME").await;
    t.api
        .activate(
            &t.ctx,
            client,
            entitlements::ActivationSource::Modules(vec![ModuleAssignment::new("facturation")]),
        )
        .await
        .unwrap();

    let usage = t.api.list_all_modules(&t.ctx).await.unwrap();
    let facturation = usage.iter().find(|u| u.module.code == "facturation").unwrap();
    assert_eq!(facturation.plan_count, 2);
    assert_eq!(facturation.client_count, 1);

    let other_tenant = t.api.list_all_modules(&user_ctx(Uuid::new_v4())).await.unwrap();
    let facturation = other_tenant
        .iter()
        .find(|u| u.module.code == "facturation")
        .unwrap();
    assert_eq!(facturation.client_count, 0);
}

#[tokio::test]
async fn created_plan_carries_its_modules() {
    let t = TestContext::new().await;
    let mut plan = new_plan("pro", &[]);
    plan.price_annual = Some(Decimal::new(29000, 2));
    plan.modules = vec![
        ModuleAssignment::new("facturation").with_usage_limit(100),
        ModuleAssignment::new("devis"),
    ];

    let created = t.api.create_plan(&t.ctx, plan).await.unwrap();

    assert_eq!(created.plan.code, "pro");
    assert_eq!(created.plan.price_annual, Some(Decimal::new(29000, 2)));
    assert_eq!(created.modules.len(), 2);
    assert_eq!(created.subscription_count, 0);
    let fetched = t.api.get_plan_by_code(&t.ctx, "pro").await.unwrap();
    assert_eq!(fetched.plan.id, created.plan.id);
    let facturation = fetched
        .modules
        .iter()
        .find(|m| m.module_code == "facturation")
        .unwrap();
    assert_eq!(facturation.usage_limit, Some(100));
}

#[tokio::test]
async fn duplicate_plan_code_conflicts() {
    let t = TestContext::new().await;
    t.plan("pro", &["facturation"]).await;

    let err = t
        .api
        .create_plan(&t.ctx, new_plan("pro", &[]))
        .await
        .unwrap_err();

    assert!(matches!(err, EntitlementsError::Conflict { .. }));
}

#[tokio::test]
async fn invalid_plan_reports_every_field() {
    let t = TestContext::new().await;
    let mut plan = new_plan("X", &[]);
    plan.name = String::new();
    plan.price_monthly = Decimal::new(-5, 0);

    let err = t.api.create_plan(&t.ctx, plan).await.unwrap_err();

    let EntitlementsError::Validation { violations, .. } = err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["code", "name", "priceMonthly"]);
}

#[tokio::test]
async fn plan_with_unknown_module_is_not_created() {
    let t = TestContext::new().await;

    let err = t
        .api
        .create_plan(&t.ctx, new_plan("pro", &["facturation", "ghost"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EntitlementsError::NotFound {
            resource: "Module",
            ..
        }
    ));
    assert!(t.api.get_plan_by_code(&t.ctx, "pro").await.is_err());
}

#[tokio::test]
async fn replacing_modules_with_an_unknown_code_writes_nothing() {
    let t = TestContext::new().await;
    let plan = t.plan("pro", &["facturation", "devis"]).await;

    let err = t
        .api
        .replace_plan_modules(
            &t.ctx,
            plan.plan.id,
            vec![ModuleAssignment::new("leads"), ModuleAssignment::new("ghost")],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EntitlementsError::NotFound { .. }));
    let unchanged = t.api.get_plan(&t.ctx, plan.plan.id).await.unwrap();
    let mut codes: Vec<_> = unchanged.modules.iter().map(|m| m.module_code.as_str()).collect();
    codes.sort_unstable();
    assert_eq!(codes, vec!["devis", "facturation"]);
}

#[tokio::test]
async fn replacing_modules_swaps_the_bundle() {
    let t = TestContext::new().await;
    let plan = t.plan("pro", &["facturation", "devis"]).await;

    let updated = t
        .api
        .replace_plan_modules(
            &t.ctx,
            plan.plan.id,
            vec![ModuleAssignment::new("leads").with_usage_limit(20)],
        )
        .await
        .unwrap();

    assert_eq!(updated.modules.len(), 1);
    assert_eq!(updated.modules[0].module_code, "leads");
    assert_eq!(updated.modules[0].usage_limit, Some(20));
}

#[tokio::test]
async fn patch_updates_only_given_fields() {
    let t = TestContext::new().await;
    let plan = t.plan("pro", &["facturation"]).await;

    let updated = t
        .api
        .update_plan(
            &t.ctx,
            plan.plan.id,
            PlanPatch {
                name: Some("Professional".to_owned()),
                trial_days: Some(14),
                ..PlanPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.plan.name, "Professional");
    assert_eq!(updated.plan.trial_days, 14);
    assert_eq!(updated.plan.code, "pro");
    assert_eq!(updated.plan.price_monthly, plan.plan.price_monthly);
    assert_eq!(updated.modules.len(), 1);
}

#[tokio::test]
async fn renaming_a_plan_onto_a_taken_code_conflicts() {
    let t = TestContext::new().await;
    t.plan("starter", &[]).await;
    let pro = t.plan("pro", &[]).await;

    let err = t
        .api
        .update_plan(
            &t.ctx,
            pro.plan.id,
            PlanPatch {
                code: Some("starter".to_owned()),
                ..PlanPatch::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EntitlementsError::Conflict { .. }));
}

#[tokio::test]
async fn plan_with_active_subscription_cannot_be_deleted() {
    let t = TestContext::new().await;
    let plan = t.plan("pro", &["facturation"]).await;
    let client = t.client("ACME").await;
    t.api
        .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::Active))
        .await
        .unwrap();

    let err = t.api.deactivate_plan(&t.ctx, plan.plan.id).await.unwrap_err();

    assert!(matches!(err, EntitlementsError::Conflict { .. }));
    assert!(t.api.get_plan(&t.ctx, plan.plan.id).await.unwrap().plan.active);
}

#[tokio::test]
async fn trial_subscriptions_do_not_block_deletion() {
    let t = TestContext::new().await;
    let plan = t.plan("pro", &["facturation"]).await;
    let client = t.client("ACME").await;
    t.api
        .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::Trial))
        .await
        .unwrap();

    let deactivated = t.api.deactivate_plan(&t.ctx, plan.plan.id).await.unwrap();

    assert!(!deactivated.active);
}

#[tokio::test]
async fn deleted_plans_leave_the_public_listing() {
    let t = TestContext::new().await;
    t.plan("starter", &[]).await;
    let pro = t.plan("pro", &[]).await;

    t.api.deactivate_plan(&t.ctx, pro.plan.id).await.unwrap();

    let active = t.api.list_plans(&t.ctx, false).await.unwrap();
    let all = t.api.list_plans(&t.ctx, true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].plan.code, "starter");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn unknown_plan_lookups_are_not_found() {
    let t = TestContext::new().await;

    let by_id = t.api.get_plan(&t.ctx, Uuid::new_v4()).await.unwrap_err();
    let by_code = t.api.get_plan_by_code(&t.ctx, "nope").await.unwrap_err();
    let delete = t
        .api
        .deactivate_plan(&t.ctx, Uuid::new_v4())
        .await
        .unwrap_err();

    for err in [by_id, by_code, delete] {
        assert!(matches!(err, EntitlementsError::NotFound { .. }));
    }
}
