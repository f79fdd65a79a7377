use std::collections::HashMap;

use sea_orm::EntityTrait;

use crate::payments::{self, Payment};

use super::Engine;

impl Engine {
    /// All contributions, currency-resolved, sorted by `(date, id)`.
    pub async fn list_payments(&self) -> Vec<Payment> {
        let models = match payments::Entity::find().all(&self.database).await {
            Ok(models) => models,
            Err(err) => {
                tracing::warn!("payment store unavailable, returning no rows: {err}");
                return Vec::new();
            }
        };

        let rates = self.fx.rates().await;
        let mut resolved: Vec<Payment> = models
            .into_iter()
            .map(|model| Payment::resolve(model, &rates))
            .collect();
        resolved.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        resolved
    }

    /// CHF contributed per normalized participant name, skipping rows whose
    /// currency cannot be converted.
    pub async fn contributions_by_participant(&self) -> HashMap<String, f64> {
        let mut sums: HashMap<String, f64> = HashMap::new();
        for payment in self.list_payments().await {
            let Some(chf) = payment.amount_chf else {
                continue;
            };
            *sums.entry(payment.participant).or_default() += chf;
        }
        sums
    }
}
