//! Activation planning.
//!
//! `plan_activation` turns "what the client has" plus "what the client should
//! have" into the exact set of row changes. It performs no I/O; the
//! provisioning service applies the result inside one transaction as a bulk
//! deactivate followed by a bulk upsert.

use std::collections::{HashMap, HashSet};

use entitlements_sdk::ModuleAssignment;
use uuid::Uuid;

/// An existing entitlement row for the client being provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentEntitlement {
    pub module_id: Uuid,
    pub module_code: String,
    pub active: bool,
}

/// A row to insert or refresh with `active = true` and a zeroed usage counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpsert {
    pub module_id: Uuid,
    pub module_code: String,
    pub usage_limit: Option<i32>,
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationPlan {
    /// Rows asserted by the new set, in request order.
    pub upserts: Vec<PlannedUpsert>,
    /// Currently active rows not asserted by the new set.
    pub deactivations: Vec<CurrentEntitlement>,
    /// Requested codes missing from the catalog.
    pub skipped: Vec<String>,
}

impl ActivationPlan {
    pub fn keep_module_ids(&self) -> Vec<Uuid> {
        self.upserts.iter().map(|u| u.module_id).collect()
    }

    pub fn activated_codes(&self) -> Vec<String> {
        self.upserts.iter().map(|u| u.module_code.clone()).collect()
    }

    pub fn deactivated_codes(&self) -> Vec<String> {
        self.deactivations
            .iter()
            .map(|d| d.module_code.clone())
            .collect()
    }
}

/// Compute the row changes that make `desired` the client's exact active set.
///
/// `catalog` maps module code to module id for every code that exists.
/// Codes absent from it are reported in `skipped` and produce no rows.
/// A code requested twice keeps its first position and its last overrides.
pub fn plan_activation(
    current: &[CurrentEntitlement],
    desired: &[ModuleAssignment],
    catalog: &HashMap<String, Uuid>,
) -> ActivationPlan {
    let mut plan = ActivationPlan::default();
    let mut position: HashMap<Uuid, usize> = HashMap::new();

    for assignment in desired {
        let Some(&module_id) = catalog.get(&assignment.module_code) else {
            if !plan.skipped.contains(&assignment.module_code) {
                plan.skipped.push(assignment.module_code.clone());
            }
            continue;
        };

        let upsert = PlannedUpsert {
            module_id,
            module_code: assignment.module_code.clone(),
            usage_limit: assignment.usage_limit,
            config: assignment.config.clone(),
        };

        if let Some(&idx) = position.get(&module_id) {
            plan.upserts[idx] = upsert;
        } else {
            position.insert(module_id, plan.upserts.len());
            plan.upserts.push(upsert);
        }
    }

    let keep: HashSet<Uuid> = position.into_keys().collect();
    plan.deactivations = current
        .iter()
        .filter(|row| row.active && !keep.contains(&row.module_id))
        .cloned()
        .collect();

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(codes: &[&str]) -> HashMap<String, Uuid> {
        codes
            .iter()
            .map(|c| ((*c).to_owned(), Uuid::new_v4()))
            .collect()
    }

    fn row(catalog: &HashMap<String, Uuid>, code: &str, active: bool) -> CurrentEntitlement {
        CurrentEntitlement {
            module_id: catalog[code],
            module_code: code.to_owned(),
            active,
        }
    }

    #[test]
    fn fresh_client_gets_every_known_module() {
        let cat = catalog(&["facturation", "devis"]);
        let desired = vec![
            ModuleAssignment::new("facturation"),
            ModuleAssignment::new("devis").with_usage_limit(10),
        ];

        let plan = plan_activation(&[], &desired, &cat);

        assert_eq!(plan.activated_codes(), vec!["facturation", "devis"]);
        assert_eq!(plan.upserts[1].usage_limit, Some(10));
        assert!(plan.deactivations.is_empty());
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn switchover_deactivates_rows_not_reasserted() {
        let cat = catalog(&["a", "b", "c"]);
        let current = vec![row(&cat, "a", true), row(&cat, "b", true)];

        let plan = plan_activation(&current, &[ModuleAssignment::new("c")], &cat);

        assert_eq!(plan.activated_codes(), vec!["c"]);
        let mut gone = plan.deactivated_codes();
        gone.sort();
        assert_eq!(gone, vec!["a", "b"]);
    }

    #[test]
    fn already_inactive_rows_are_not_reported() {
        let cat = catalog(&["a", "b"]);
        let current = vec![row(&cat, "a", false), row(&cat, "b", true)];

        let plan = plan_activation(&current, &[ModuleAssignment::new("b")], &cat);

        assert!(plan.deactivations.is_empty());
        assert_eq!(plan.keep_module_ids(), vec![cat["b"]]);
    }

    #[test]
    fn unknown_codes_are_skipped_once() {
        let cat = catalog(&["facturation"]);
        let desired = vec![
            ModuleAssignment::new("facturation"),
            ModuleAssignment::new("ghost"),
            ModuleAssignment::new("ghost"),
        ];

        let plan = plan_activation(&[], &desired, &cat);

        assert_eq!(plan.activated_codes(), vec!["facturation"]);
        assert_eq!(plan.skipped, vec!["ghost"]);
    }

    #[test]
    fn duplicate_code_keeps_first_position_and_last_overrides() {
        let cat = catalog(&["a", "b"]);
        let desired = vec![
            ModuleAssignment::new("a").with_usage_limit(1),
            ModuleAssignment::new("b"),
            ModuleAssignment::new("a")
                .with_usage_limit(5)
                .with_config(json!({"tier": "gold"})),
        ];

        let plan = plan_activation(&[], &desired, &cat);

        assert_eq!(plan.activated_codes(), vec!["a", "b"]);
        assert_eq!(plan.upserts[0].usage_limit, Some(5));
        assert_eq!(plan.upserts[0].config, Some(json!({"tier": "gold"})));
    }

    #[test]
    fn empty_request_deactivates_everything() {
        let cat = catalog(&["a", "b"]);
        let current = vec![row(&cat, "a", true), row(&cat, "b", true)];

        let plan = plan_activation(&current, &[], &cat);

        assert!(plan.upserts.is_empty());
        assert_eq!(plan.deactivations.len(), 2);
    }

    #[test]
    fn same_request_twice_changes_nothing_but_counters() {
        let cat = catalog(&["a", "b"]);
        let desired = vec![ModuleAssignment::new("a"), ModuleAssignment::new("b")];
        let current = vec![row(&cat, "a", true), row(&cat, "b", true)];

        let first = plan_activation(&[], &desired, &cat);
        let second = plan_activation(&current, &desired, &cat);

        assert_eq!(first.upserts, second.upserts);
        assert!(second.deactivations.is_empty());
    }
}
