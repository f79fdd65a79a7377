use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ResultEngine, filter::LedgerFilter, money::round2};

use super::Engine;

/// CHF sums of the three expense amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AmountTotals {
    pub estimated: f64,
    pub budgeted: f64,
    pub actual: f64,
}

/// Filtered totals plus the currencies that could not be converted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Totals {
    pub values: AmountTotals,
    /// Distinct codes excluded from the sums, one entry per code.
    pub missing_currencies: Vec<String>,
}

/// An expense surfaced on the "needs verification" panel: its currency has
/// no known rate, so it is excluded from every sum.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MissingRateRow {
    pub category: String,
    pub description: String,
    pub currency: String,
    pub reference_amount: f64,
    pub date: String,
    pub day_ref: Option<i32>,
}

impl Engine {
    /// Sums estimated/budgeted/actual CHF amounts across filtered expenses.
    ///
    /// Unconvertible rows are excluded and their currency recorded once.
    /// Sums stay unrounded until the final values.
    pub async fn totals(&self, filter: &LedgerFilter) -> ResultEngine<Totals> {
        filter.validate()?;

        let mut values = AmountTotals::default();
        let mut missing = BTreeSet::new();

        for expense in self.list_expenses().await {
            if !filter.matches(&expense) {
                continue;
            }
            if expense.is_unconvertible() {
                missing.insert(expense.currency);
                continue;
            }
            if let Some(chf) = expense.estimated_chf {
                values.estimated += chf;
            }
            if let Some(chf) = expense.budgeted_chf {
                values.budgeted += chf;
            }
            if let Some(chf) = expense.actual_chf {
                values.actual += chf;
            }
        }

        Ok(Totals {
            values: AmountTotals {
                estimated: round2(values.estimated),
                budgeted: round2(values.budgeted),
                actual: round2(values.actual),
            },
            missing_currencies: missing.into_iter().collect(),
        })
    }

    /// Every filtered expense whose currency has no known rate, date
    /// ascending.
    pub async fn missing_rate_rows(
        &self,
        filter: &LedgerFilter,
    ) -> ResultEngine<Vec<MissingRateRow>> {
        filter.validate()?;

        let rows = self
            .list_expenses()
            .await
            .into_iter()
            .filter(|expense| filter.matches(expense) && expense.is_unconvertible())
            .map(|expense| MissingRateRow {
                category: expense.category,
                description: expense.description,
                currency: expense.currency,
                reference_amount: expense.reference_amount,
                date: expense.date,
                day_ref: expense.day_ref,
            })
            .collect();

        Ok(rows)
    }
}
