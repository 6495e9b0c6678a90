#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Client registration, subscription lifecycle and tenant stats.

mod support;

use entitlements::{ActivationSource, EntitlementsError};
use entitlements_sdk::{NewSubscription, SubscriptionStatus};
use support::{TestContext, modules, user_ctx};
use uuid::Uuid;

fn subscription(plan_code: &str, status: SubscriptionStatus) -> NewSubscription {
    NewSubscription {
        plan_code: plan_code.to_owned(),
        status,
    }
}

#[tokio::test]
async fn registering_twice_renames_the_client() {
    let t = TestContext::new().await;
    let id = Uuid::new_v4();

    t.api
        .register_client(&t.ctx, id, "ACME".to_owned())
        .await
        .unwrap();
    let renamed = t
        .api
        .register_client(&t.ctx, id, "  ACME Corp  ".to_owned())
        .await
        .unwrap();

    assert_eq!(renamed.display_name, "ACME Corp");
    assert_eq!(renamed.tenant_id, t.tenant_id);
}

#[tokio::test]
async fn client_ids_cannot_move_between_tenants() {
    let t = TestContext::new().await;
    let id = t.client("ACME").await;

    let err = t
        .api
        .register_client(&user_ctx(Uuid::new_v4()), id, "Hijack".to_owned())
        .await
        .unwrap_err();

    assert!(matches!(err, EntitlementsError::Conflict { .. }));
}

#[tokio::test]
async fn blank_client_name_is_rejected() {
    let t = TestContext::new().await;

    let err = t
        .api
        .register_client(&t.ctx, Uuid::new_v4(), "   ".to_owned())
        .await
        .unwrap_err();

    assert!(matches!(err, EntitlementsError::Validation { .. }));
}

#[tokio::test]
async fn new_subscription_cancels_the_previous_one() {
    let t = TestContext::new().await;
    t.plan("starter", &["facturation"]).await;
    t.plan("pro", &["facturation", "devis"]).await;
    let client = t.client("ACME").await;

    t.api
        .start_subscription(&t.ctx, client, subscription("starter", SubscriptionStatus::Trial))
        .await
        .unwrap();
    let pro = t
        .api
        .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::Active))
        .await
        .unwrap();

    let current = t
        .api
        .get_entitlements(&t.ctx, client)
        .await
        .unwrap()
        .subscription
        .unwrap();
    assert_eq!(current.id, pro.id);
    assert_eq!(current.status, SubscriptionStatus::Active);
    assert_eq!(current.plan.unwrap().code, "pro");

    let starter = t.api.get_plan_by_code(&t.ctx, "starter").await.unwrap();
    assert_eq!(starter.subscription_count, 0);
}

#[tokio::test]
async fn subscription_must_start_current_on_an_active_plan() {
    let t = TestContext::new().await;
    let plan = t.plan("pro", &[]).await;
    let client = t.client("ACME").await;

    let bad_status = t
        .api
        .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::PastDue))
        .await
        .unwrap_err();
    assert!(matches!(bad_status, EntitlementsError::Validation { .. }));

    t.api.deactivate_plan(&t.ctx, plan.plan.id).await.unwrap();
    let inactive = t
        .api
        .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::Active))
        .await
        .unwrap_err();
    assert!(matches!(inactive, EntitlementsError::Validation { .. }));

    let unknown_client = t
        .api
        .start_subscription(
            &t.ctx,
            Uuid::new_v4(),
            subscription("pro", SubscriptionStatus::Active),
        )
        .await
        .unwrap_err();
    assert!(matches!(unknown_client, EntitlementsError::NotFound { .. }));
}

#[tokio::test]
async fn status_follows_the_transition_table() {
    let t = TestContext::new().await;
    t.plan("pro", &[]).await;
    let client = t.client("ACME").await;
    t.api
        .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::Trial))
        .await
        .unwrap();

    let illegal = t
        .api
        .set_subscription_status(&t.ctx, client, SubscriptionStatus::Suspended)
        .await
        .unwrap_err();
    let EntitlementsError::Validation { violations, .. } = illegal else {
        panic!("expected validation error, got {illegal:?}");
    };
    assert_eq!(violations[0].field, "status");

    for next in [
        SubscriptionStatus::Active,
        SubscriptionStatus::PastDue,
        SubscriptionStatus::Suspended,
        SubscriptionStatus::Canceled,
    ] {
        let sub = t
            .api
            .set_subscription_status(&t.ctx, client, next)
            .await
            .unwrap();
        assert_eq!(sub.status, next);
    }

    let reopen = t
        .api
        .set_subscription_status(&t.ctx, client, SubscriptionStatus::Active)
        .await
        .unwrap_err();
    assert!(matches!(reopen, EntitlementsError::Validation { .. }));
}

#[tokio::test]
async fn setting_the_same_status_is_a_no_op() {
    let t = TestContext::new().await;
    t.plan("pro", &[]).await;
    let client = t.client("ACME").await;
    let started = t
        .api
        .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::Active))
        .await
        .unwrap();

    let same = t
        .api
        .set_subscription_status(&t.ctx, client, SubscriptionStatus::Active)
        .await
        .unwrap();

    assert_eq!(same, started);
}

#[tokio::test]
async fn status_change_without_subscription_is_not_found() {
    let t = TestContext::new().await;
    let client = t.client("ACME").await;

    let err = t
        .api
        .set_subscription_status(&t.ctx, client, SubscriptionStatus::Active)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EntitlementsError::NotFound {
            resource: "Subscription",
            ..
        }
    ));
}

#[tokio::test]
async fn suspended_subscription_is_not_current() {
    let t = TestContext::new().await;
    t.plan("pro", &[]).await;
    let client = t.client("ACME").await;
    t.api
        .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::Active))
        .await
        .unwrap();

    t.api
        .set_subscription_status(&t.ctx, client, SubscriptionStatus::Suspended)
        .await
        .unwrap();

    let entitlements = t.api.get_entitlements(&t.ctx, client).await.unwrap();
    assert!(entitlements.subscription.is_none());
}

#[tokio::test]
async fn stats_are_scoped_to_the_callers_tenant() {
    let t = TestContext::new().await;
    t.plan("starter", &["facturation"]).await;
    t.plan("pro", &["facturation", "devis"]).await;

    let a = t.client("A").await;
    let b = t.client("B").await;
    for client in [a, b] {
        t.api
            .start_subscription(&t.ctx, client, subscription("pro", SubscriptionStatus::Active))
            .await
            .unwrap();
        t.api
            .activate(
                &t.ctx,
                client,
                ActivationSource::Plan {
                    plan_code: "pro".to_owned(),
                },
            )
            .await
            .unwrap();
    }
    t.api
        .activate(&t.ctx, b, ActivationSource::Modules(modules(&["devis"])))
        .await
        .unwrap();

    let other_ctx = user_ctx(Uuid::new_v4());
    let other = t.client_in(&other_ctx, "C").await;
    t.api
        .start_subscription(&other_ctx, other, subscription("starter", SubscriptionStatus::Active))
        .await
        .unwrap();
    t.api
        .activate(&other_ctx, other, ActivationSource::Modules(modules(&["leads"])))
        .await
        .unwrap();

    let stats = t.api.stats(&t.ctx).await.unwrap();

    let distribution: Vec<_> = stats
        .plan_distribution
        .iter()
        .map(|p| (p.plan_code.as_str(), p.count))
        .collect();
    assert_eq!(distribution, vec![("pro", 2), ("starter", 0)]);

    let popularity: Vec<_> = stats
        .module_popularity
        .iter()
        .map(|m| (m.module_code.as_str(), m.count))
        .collect();
    assert_eq!(popularity, vec![("devis", 2), ("facturation", 1)]);
}
