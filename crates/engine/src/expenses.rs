//! The module contains the expense rows and their currency resolution.
//!
//! A stored expense carries three raw amounts (estimated, budgeted, actual)
//! in whatever currency was typed at the till. Resolution turns a row into an
//! [`Expense`] snapshot: currency normalized, per-amount CHF equivalents, and
//! the single reference amount every aggregation works on.

use std::collections::HashMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{currency::normalize_code, policy::ReferenceAmountPolicy};

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub day_ref: Option<i32>,
    pub description: String,
    pub category: String,
    pub estimated_amount: f64,
    pub budgeted_amount: f64,
    pub actual_amount: f64,
    pub currency: String,
    pub spent_on: String,
    pub paid_by: String,
    pub split_among: String,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A currency-resolved expense. Read-only snapshot: the reconciliation core
/// never writes these back.
///
/// CHF equivalents are `None` when the rate is unknown — `None` distinguishes
/// "unconvertible" from "zero spent". `rate <= 0` marks the row as
/// unconvertible for the aggregations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i32,
    pub day_ref: Option<i32>,
    pub description: String,
    /// Category label, blank rows already defaulted to "Uncategorized".
    pub category: String,
    /// Canonical currency code.
    pub currency: String,
    /// Rate towards CHF, 0.0 when unknown.
    pub rate: f64,
    pub estimated: f64,
    pub budgeted: f64,
    pub actual: f64,
    pub estimated_chf: Option<f64>,
    pub budgeted_chf: Option<f64>,
    pub actual_chf: Option<f64>,
    /// The amount aggregation works on, picked by the reference policy.
    pub reference_amount: f64,
    pub reference_chf: Option<f64>,
    /// Payer as stored (trimmed); canonicalization happens at aggregation.
    pub paid_by: String,
    /// Raw comma-separated split list as stored.
    pub split_among: String,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub note: String,
}

impl Expense {
    /// Resolves a stored row against a rate snapshot.
    pub(crate) fn resolve(
        model: Model,
        rates: &HashMap<String, f64>,
        policy: ReferenceAmountPolicy,
    ) -> Self {
        let currency = normalize_code(&model.currency);
        let rate = rates.get(&currency).copied().unwrap_or(0.0);
        let convert = |amount: f64| (rate > 0.0).then_some(amount * rate);

        let reference_amount = policy.reference_amount(
            model.estimated_amount,
            model.budgeted_amount,
            model.actual_amount,
        );

        let category = if model.category.trim().is_empty() {
            UNCATEGORIZED_LABEL.to_string()
        } else {
            model.category
        };

        Self {
            id: model.id,
            day_ref: model.day_ref,
            description: model.description,
            category,
            currency,
            rate,
            estimated: model.estimated_amount,
            budgeted: model.budgeted_amount,
            actual: model.actual_amount,
            estimated_chf: convert(model.estimated_amount),
            budgeted_chf: convert(model.budgeted_amount),
            actual_chf: convert(model.actual_amount),
            reference_amount,
            reference_chf: convert(reference_amount),
            paid_by: model.paid_by.trim().to_string(),
            split_among: model.split_among,
            date: model.spent_on,
            note: model.note.unwrap_or_default(),
        }
    }

    /// `true` when the currency has no known rate.
    #[must_use]
    pub fn is_unconvertible(&self) -> bool {
        self.rate <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(currency: &str, estimated: f64, budgeted: f64, actual: f64) -> Model {
        Model {
            id: 7,
            day_ref: Some(3),
            description: "funivia".to_string(),
            category: "Trasporti".to_string(),
            estimated_amount: estimated,
            budgeted_amount: budgeted,
            actual_amount: actual,
            currency: currency.to_string(),
            spent_on: "2025-05-10".to_string(),
            paid_by: " alice ".to_string(),
            split_among: "alice,bob".to_string(),
            note: None,
        }
    }

    fn rates() -> HashMap<String, f64> {
        HashMap::from([("CHF".to_string(), 1.0), ("USD".to_string(), 0.9)])
    }

    #[test]
    fn converts_each_amount_with_the_rate() {
        let expense = Expense::resolve(
            model("usd", 10.0, 20.0, 30.0),
            &rates(),
            ReferenceAmountPolicy::default(),
        );
        assert_eq!(expense.currency, "USD");
        assert_eq!(expense.estimated_chf, Some(9.0));
        assert_eq!(expense.budgeted_chf, Some(18.0));
        assert_eq!(expense.actual_chf, Some(27.0));
        assert_eq!(expense.reference_amount, 30.0);
        assert_eq!(expense.reference_chf, Some(27.0));
        assert_eq!(expense.paid_by, "alice");
    }

    #[test]
    fn unknown_rate_gives_none_not_zero() {
        let expense = Expense::resolve(
            model("XXX", 10.0, 0.0, 0.0),
            &rates(),
            ReferenceAmountPolicy::default(),
        );
        assert!(expense.is_unconvertible());
        assert_eq!(expense.estimated_chf, None);
        assert_eq!(expense.reference_chf, None);
        // raw amounts survive for the missing-rate diagnostics
        assert_eq!(expense.reference_amount, 10.0);
    }

    #[test]
    fn blank_category_defaults() {
        let mut raw = model("CHF", 1.0, 0.0, 0.0);
        raw.category = "  ".to_string();
        let expense = Expense::resolve(raw, &rates(), ReferenceAmountPolicy::default());
        assert_eq!(expense.category, UNCATEGORIZED_LABEL);
    }
}
