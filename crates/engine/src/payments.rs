//! Contributions into the shared travel fund.

use std::collections::HashMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{currency::normalize_code, names::normalize_name};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub participant: String,
    pub amount: f64,
    pub currency: String,
    pub paid_on: String,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A currency-resolved contribution.
///
/// `amount_chf` is `None` when the rate is unknown; such rows are skipped by
/// the per-participant sums.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i32,
    /// Normalized participant name (aliases are applied at aggregation).
    pub participant: String,
    pub amount: f64,
    pub currency: String,
    pub rate: f64,
    pub amount_chf: Option<f64>,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub note: String,
}

impl Payment {
    pub(crate) fn resolve(model: Model, rates: &HashMap<String, f64>) -> Self {
        let currency = normalize_code(&model.currency);
        let rate = rates.get(&currency).copied().unwrap_or(0.0);

        Self {
            id: model.id,
            participant: normalize_name(&model.participant),
            amount: model.amount,
            currency,
            rate,
            amount_chf: (rate > 0.0).then_some(model.amount * rate),
            date: model.paid_on,
            note: model.note.unwrap_or_default(),
        }
    }
}
