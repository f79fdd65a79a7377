use sea_orm::EntityTrait;

use crate::expenses::{self, Expense};

use super::Engine;

impl Engine {
    /// All expenses, currency-resolved, sorted by `(date, id)`.
    ///
    /// A failing store degrades to no rows; unconvertible currencies stay in
    /// the list with `None` CHF amounts so the aggregations can report them.
    pub async fn list_expenses(&self) -> Vec<Expense> {
        let models = match expenses::Entity::find().all(&self.database).await {
            Ok(models) => models,
            Err(err) => {
                tracing::warn!("expense store unavailable, returning no rows: {err}");
                return Vec::new();
            }
        };

        let rates = self.fx.rates().await;
        let mut resolved: Vec<Expense> = models
            .into_iter()
            .map(|model| Expense::resolve(model, &rates, self.policy))
            .collect();
        resolved.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        resolved
    }
}
