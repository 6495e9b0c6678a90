//! Input validation for plan, module and client writes.
//!
//! Field names in violations use the JSON (camelCase) spelling so the REST
//! layer can return them verbatim.

use entitlements_sdk::{FieldViolation, ModuleAssignment, NewModule, NewPlan, PlanPatch};
use rust_decimal::Decimal;

use crate::domain::error::DomainError;

const CODE_MIN: usize = 2;
const CODE_MAX: usize = 50;
const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const CLIENT_NAME_MAX: usize = 200;

#[derive(Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    fn code(&mut self, field: &str, value: &str) {
        let len = value.chars().count();
        if !(CODE_MIN..=CODE_MAX).contains(&len) {
            self.push(
                field,
                format!("must be between {CODE_MIN} and {CODE_MAX} characters"),
            );
        } else if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            self.push(
                field,
                "may only contain lowercase letters, digits, '_' and '-'",
            );
        }
    }

    fn name(&mut self, field: &str, value: &str) {
        let len = value.trim().chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&len) {
            self.push(
                field,
                format!("must be between {NAME_MIN} and {NAME_MAX} characters"),
            );
        }
    }

    fn non_negative_price(&mut self, field: &str, value: Decimal) {
        if value.is_sign_negative() && !value.is_zero() {
            self.push(field, "must be greater than or equal to 0");
        }
    }

    fn non_negative(&mut self, field: &str, value: i32) {
        if value < 0 {
            self.push(field, "must be greater than or equal to 0");
        }
    }

    fn assignments(&mut self, field: &str, list: &[ModuleAssignment]) {
        for (i, a) in list.iter().enumerate() {
            if a.module_code.trim().is_empty() {
                self.push(format!("{field}[{i}].moduleCode"), "must not be empty");
            }
            if let Some(limit) = a.usage_limit {
                self.non_negative(&format!("{field}[{i}].usageLimit"), limit);
            }
            if let Some(config) = &a.config
                && !config.is_object()
            {
                self.push(format!("{field}[{i}].config"), "must be a JSON object");
            }
        }
    }

    fn finish(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::violations(self.0))
        }
    }
}

pub fn validate_new_plan(plan: &NewPlan) -> Result<(), DomainError> {
    let mut v = Violations::default();
    v.code("code", &plan.code);
    v.name("name", &plan.name);
    v.non_negative_price("priceMonthly", plan.price_monthly);
    if let Some(annual) = plan.price_annual {
        v.non_negative_price("priceAnnual", annual);
    }
    v.non_negative("trialDays", plan.trial_days);
    v.non_negative("displayOrder", plan.display_order);
    v.assignments("modules", &plan.modules);
    v.finish()
}

pub fn validate_plan_patch(patch: &PlanPatch) -> Result<(), DomainError> {
    let mut v = Violations::default();
    if let Some(code) = &patch.code {
        v.code("code", code);
    }
    if let Some(name) = &patch.name {
        v.name("name", name);
    }
    if let Some(price) = patch.price_monthly {
        v.non_negative_price("priceMonthly", price);
    }
    if let Some(price) = patch.price_annual {
        v.non_negative_price("priceAnnual", price);
    }
    if let Some(days) = patch.trial_days {
        v.non_negative("trialDays", days);
    }
    if let Some(order) = patch.display_order {
        v.non_negative("displayOrder", order);
    }
    v.finish()
}

pub fn validate_assignments(field: &str, list: &[ModuleAssignment]) -> Result<(), DomainError> {
    let mut v = Violations::default();
    v.assignments(field, list);
    v.finish()
}

pub fn validate_new_module(module: &NewModule) -> Result<(), DomainError> {
    let mut v = Violations::default();
    v.code("code", &module.code);
    v.name("displayName", &module.display_name);
    v.non_negative_price("pricePerMonth", module.price_per_month);
    v.non_negative("displayOrder", module.display_order);
    v.finish()
}

pub fn validate_client_name(name: &str) -> Result<(), DomainError> {
    let len = name.trim().chars().count();
    if len == 0 || len > CLIENT_NAME_MAX {
        return Err(DomainError::validation(
            "displayName",
            format!("must be between 1 and {CLIENT_NAME_MAX} characters"),
        ));
    }
    Ok(())
}

pub fn validate_plan_code(field: &str, code: &str) -> Result<(), DomainError> {
    if code.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitlements_sdk::BillingProviderIds;
    use serde_json::json;

    fn plan() -> NewPlan {
        NewPlan {
            code: "starter".to_owned(),
            name: "Starter".to_owned(),
            description: None,
            price_monthly: Decimal::new(1900, 2),
            price_annual: None,
            trial_days: 0,
            display_order: 0,
            active: true,
            color: None,
            billing: BillingProviderIds::default(),
            modules: vec![ModuleAssignment::new("facturation")],
        }
    }

    fn fields(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation { violations } => {
                violations.into_iter().map(|v| v.field).collect()
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_plan_passes() {
        assert!(validate_new_plan(&plan()).is_ok());
    }

    #[test]
    fn every_bad_field_is_reported() {
        let mut p = plan();
        p.code = "Bad Code".to_owned();
        p.name = "x".to_owned();
        p.price_monthly = Decimal::new(-1, 0);
        p.trial_days = -3;
        p.modules = vec![
            ModuleAssignment::new(""),
            ModuleAssignment::new("devis")
                .with_usage_limit(-1)
                .with_config(json!([1, 2])),
        ];

        let err = validate_new_plan(&p).err().map(fields).unwrap_or_default();
        assert_eq!(
            err,
            vec![
                "code",
                "name",
                "priceMonthly",
                "trialDays",
                "modules[0].moduleCode",
                "modules[1].usageLimit",
                "modules[1].config",
            ]
        );
    }

    #[test]
    fn code_length_bounds() {
        let mut p = plan();
        p.code = "a".to_owned();
        assert!(validate_new_plan(&p).is_err());
        p.code = "a".repeat(50);
        assert!(validate_new_plan(&p).is_ok());
        p.code = "a".repeat(51);
        assert!(validate_new_plan(&p).is_err());
    }

    #[test]
    fn zero_price_is_allowed() {
        let mut p = plan();
        p.price_monthly = Decimal::ZERO;
        assert!(validate_new_plan(&p).is_ok());
    }

    #[test]
    fn patch_only_checks_present_fields() {
        assert!(validate_plan_patch(&PlanPatch::default()).is_ok());
        let patch = PlanPatch {
            display_order: Some(-1),
            ..PlanPatch::default()
        };
        assert!(validate_plan_patch(&patch).is_err());
    }

    #[test]
    fn client_name_must_not_be_blank() {
        assert!(validate_client_name("  ").is_err());
        assert!(validate_client_name("ACME").is_ok());
    }
}
