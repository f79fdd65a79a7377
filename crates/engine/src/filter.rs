//! Row filter shared by all aggregation entry points.

use crate::{EngineError, ResultEngine, currency::normalize_code, expenses::Expense};

/// Filters for the reconciliation ops.
///
/// `from` and `to` are inclusive ISO `YYYY-MM-DD` bounds compared lexically
/// (that format sorts correctly as a string). `currency` matches the resolved
/// currency code case-insensitively. A non-empty `categories` set restricts
/// rows to those exact category labels (blank categories have already been
/// defaulted to "Uncategorized" at resolution).
#[derive(Clone, Debug, Default)]
pub struct LedgerFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub currency: Option<String>,
    pub categories: Vec<String>,
}

impl LedgerFilter {
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (&self.from, &self.to)
            && from > to
        {
            return Err(EngineError::InvalidFilter(
                "invalid range: from must be <= to".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn matches(&self, expense: &Expense) -> bool {
        if let Some(from) = &self.from
            && expense.date.as_str() < from.as_str()
        {
            return false;
        }
        if let Some(to) = &self.to
            && expense.date.as_str() > to.as_str()
        {
            return false;
        }
        if let Some(currency) = &self.currency
            && expense.currency != normalize_code(currency)
        {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&expense.category) {
            return false;
        }
        true
    }
}
