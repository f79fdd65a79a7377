use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    ResultEngine, expenses::Expense, filter::LedgerFilter, money::round2, slug::slugify,
    util::natural_cmp,
};

use super::Engine;

/// Per-category CHF sums of the reference amounts, natural label order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub values: Vec<CategoryTotal>,
    pub missing_currencies: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub label: String,
    pub slug: String,
    pub total_chf: f64,
}

/// Bidirectional label ↔ slug mapping over the full expense set.
///
/// When two labels collapse to one slug, the first label in natural order
/// keeps it; every label still maps forward.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CategoriesIndex {
    pub slug_to_label: BTreeMap<String, String>,
    pub label_to_slug: BTreeMap<String, String>,
}

/// The expenses of one category, resolved through its slug.
///
/// `label` is `None` when the slug matches no category (the caller maps that
/// to a not-found response).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryExpenses {
    pub label: Option<String>,
    pub rows: Vec<CategoryExpenseRow>,
    pub total_chf: f64,
    pub missing_currencies: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryExpenseRow {
    pub id: i32,
    pub day_ref: Option<i32>,
    pub description: String,
    pub currency: String,
    pub reference_amount: f64,
    pub reference_chf: f64,
    pub date: String,
    pub paid_by: String,
    pub split_among: String,
}

impl Engine {
    /// Reference-amount CHF sums per category across filtered expenses.
    pub async fn by_category(&self, filter: &LedgerFilter) -> ResultEngine<CategoryBreakdown> {
        filter.validate()?;

        let mut sums: HashMap<String, f64> = HashMap::new();
        let mut missing = BTreeSet::new();

        for expense in self.list_expenses().await {
            if !filter.matches(&expense) {
                continue;
            }
            if expense.is_unconvertible() {
                missing.insert(expense.currency);
                continue;
            }
            let Some(chf) = expense.reference_chf else {
                continue;
            };
            *sums.entry(expense.category).or_default() += chf;
        }

        let mut values: Vec<CategoryTotal> = sums
            .into_iter()
            .map(|(label, total)| CategoryTotal {
                slug: slugify(&label),
                label,
                total_chf: round2(total),
            })
            .collect();
        values.sort_by(|a, b| natural_cmp(&a.label, &b.label));

        Ok(CategoryBreakdown {
            values,
            missing_currencies: missing.into_iter().collect(),
        })
    }

    /// Label ↔ slug index over the full, unfiltered expense set.
    pub async fn categories_index(&self) -> CategoriesIndex {
        build_index(&self.list_expenses().await)
    }

    /// Expenses of the category behind `slug`, date ascending, with rounded
    /// total and missing-currency diagnostics.
    pub async fn list_by_category_slug(&self, slug: &str) -> CategoryExpenses {
        let expenses = self.list_expenses().await;
        let index = build_index(&expenses);

        let Some(label) = index.slug_to_label.get(slug).cloned() else {
            return CategoryExpenses {
                label: None,
                rows: Vec::new(),
                total_chf: 0.0,
                missing_currencies: Vec::new(),
            };
        };

        let mut rows = Vec::new();
        let mut total = 0.0;
        let mut missing = BTreeSet::new();

        for expense in expenses {
            if expense.category != label {
                continue;
            }
            if expense.is_unconvertible() {
                missing.insert(expense.currency);
                continue;
            }
            let Some(chf) = expense.reference_chf else {
                continue;
            };
            total += chf;
            rows.push(CategoryExpenseRow {
                id: expense.id,
                day_ref: expense.day_ref,
                description: expense.description,
                currency: expense.currency,
                reference_amount: expense.reference_amount,
                reference_chf: round2(chf),
                date: expense.date,
                paid_by: expense.paid_by,
                split_among: expense.split_among,
            });
        }

        CategoryExpenses {
            label: Some(label),
            rows,
            total_chf: round2(total),
            missing_currencies: missing.into_iter().collect(),
        }
    }
}

fn build_index(expenses: &[Expense]) -> CategoriesIndex {
    let mut labels: Vec<&str> = Vec::new();
    for expense in expenses {
        if !labels.contains(&expense.category.as_str()) {
            labels.push(&expense.category);
        }
    }
    labels.sort_by(|a, b| natural_cmp(a, b));

    let mut index = CategoriesIndex::default();
    for label in labels {
        let slug = slugify(label);
        index
            .slug_to_label
            .entry(slug.clone())
            .or_insert_with(|| label.to_string());
        index.label_to_slug.insert(label.to_string(), slug);
    }
    index
}
