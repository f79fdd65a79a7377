use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    ResultEngine, filter::LedgerFilter, money::round2, names::split_participants, slug::slugify,
    util::natural_cmp,
};

use super::Engine;

/// One participant's reconciled position.
///
/// `paid` is informational: fronting an expense does not offset what one
/// owes. Settlement flows only through `contributed`, so
/// `balance = contributed - owed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub name: String,
    pub slug: String,
    /// Sum of this person's equal-split shares.
    pub owed: f64,
    /// Expenses this person fronted as payer.
    pub paid: f64,
    /// Payments into the shared fund.
    pub contributed: f64,
    pub balance: f64,
}

/// Per-participant rows plus the amounts nobody is splitting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticipantsReport {
    pub rows: Vec<ParticipantRow>,
    /// Convertible expenses with an empty split list.
    pub unassigned_total: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OwedRow {
    pub description: String,
    pub category: String,
    pub date: String,
    pub day_ref: Option<i32>,
    pub share_chf: f64,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaidRow {
    pub description: String,
    pub category: String,
    pub date: String,
    pub day_ref: Option<i32>,
    pub amount_chf: f64,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContributionRow {
    pub date: String,
    pub amount_chf: f64,
    pub currency: String,
    pub amount: f64,
    pub note: String,
}

/// A participant's itemized statement: every share they owe, every expense
/// they fronted, every contribution, with totals and balance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticipantLedger {
    pub name: String,
    pub owed: Vec<OwedRow>,
    pub paid: Vec<PaidRow>,
    pub contributed: Vec<ContributionRow>,
    pub total_owed: f64,
    pub total_paid: f64,
    pub total_contributed: f64,
    pub balance: f64,
}

impl Engine {
    /// Reconciles every participant seen in filtered expenses or in
    /// contributions.
    ///
    /// For each convertible, strictly-positive reference amount: the payer's
    /// `paid` takes the full amount; each split participant's `owed` takes an
    /// exact equal share; an empty split list sends the amount to
    /// `unassigned_total` instead. People who only contributed still get a
    /// row. Rounding happens once, on the output values.
    pub async fn participants(&self, filter: &LedgerFilter) -> ResultEngine<ParticipantsReport> {
        filter.validate()?;

        let mut contributed: HashMap<String, f64> = HashMap::new();
        for (who, amount) in self.contributions_by_participant().await {
            *contributed
                .entry(self.aliases.canonicalize(&who))
                .or_default() += amount;
        }

        let mut names: Vec<String> = Vec::new();
        let mut owed: HashMap<String, f64> = HashMap::new();
        let mut paid: HashMap<String, f64> = HashMap::new();
        let mut unassigned = 0.0;

        fn push_name(names: &mut Vec<String>, name: &str) {
            if !names.iter().any(|known| known == name) {
                names.push(name.to_string());
            }
        }

        for expense in self.list_expenses().await {
            if !filter.matches(&expense) {
                continue;
            }
            let Some(amount) = expense.reference_chf else {
                continue;
            };
            if amount <= 0.0 {
                continue;
            }

            let parts: Vec<String> = split_participants(&expense.split_among)
                .iter()
                .map(|name| self.aliases.canonicalize(name))
                .collect();
            let payer = self.aliases.canonicalize(&expense.paid_by);

            if !payer.is_empty() {
                push_name(&mut names, &payer);
                *paid.entry(payer).or_default() += amount;
            }
            for part in &parts {
                push_name(&mut names, part);
            }

            if parts.is_empty() {
                unassigned += amount;
            } else {
                // exact division; rounding only at output
                let share = amount / parts.len() as f64;
                for part in parts {
                    *owed.entry(part).or_default() += share;
                }
            }
        }

        for who in contributed.keys() {
            push_name(&mut names, who);
        }
        names.sort_by(|a, b| natural_cmp(a, b));

        let rows = names
            .into_iter()
            .map(|name| {
                let owed = round2(owed.get(&name).copied().unwrap_or(0.0));
                let paid = round2(paid.get(&name).copied().unwrap_or(0.0));
                let contributed = round2(contributed.get(&name).copied().unwrap_or(0.0));
                ParticipantRow {
                    slug: slugify(&name),
                    name,
                    owed,
                    paid,
                    contributed,
                    balance: round2(contributed - owed),
                }
            })
            .collect();

        Ok(ParticipantsReport {
            rows,
            unassigned_total: round2(unassigned),
        })
    }

    /// Itemized statement for the participant behind `slug`.
    ///
    /// The display name is recovered from the slug (`-` → space) and
    /// canonicalized, so aliases resolve here too. Lists are date ascending;
    /// totals stay unrounded until the output values.
    pub async fn ledger_by_participant_slug(&self, slug: &str) -> ParticipantLedger {
        let name = self.aliases.canonicalize(&slug.replace('-', " "));

        let mut owed = Vec::new();
        let mut paid = Vec::new();
        let mut contributed = Vec::new();
        let mut total_owed = 0.0;
        let mut total_paid = 0.0;
        let mut total_contributed = 0.0;

        for expense in self.list_expenses().await {
            let Some(amount) = expense.reference_chf else {
                continue;
            };
            if amount <= 0.0 {
                continue;
            }

            let parts: Vec<String> = split_participants(&expense.split_among)
                .iter()
                .map(|part| self.aliases.canonicalize(part))
                .collect();
            let payer = self.aliases.canonicalize(&expense.paid_by);

            if !parts.is_empty() && parts.contains(&name) {
                let share = amount / parts.len() as f64;
                total_owed += share;
                owed.push(OwedRow {
                    description: expense.description.clone(),
                    category: expense.category.clone(),
                    date: expense.date.clone(),
                    day_ref: expense.day_ref,
                    share_chf: round2(share),
                    currency: expense.currency.clone(),
                });
            }

            if !payer.is_empty() && payer == name {
                total_paid += amount;
                paid.push(PaidRow {
                    description: expense.description,
                    category: expense.category,
                    date: expense.date,
                    day_ref: expense.day_ref,
                    amount_chf: round2(amount),
                    currency: expense.currency,
                });
            }
        }

        for payment in self.list_payments().await {
            let Some(chf) = payment.amount_chf else {
                continue;
            };
            if self.aliases.canonicalize(&payment.participant) != name {
                continue;
            }
            total_contributed += chf;
            contributed.push(ContributionRow {
                date: payment.date,
                amount_chf: round2(chf),
                currency: payment.currency,
                amount: payment.amount,
                note: payment.note,
            });
        }

        ParticipantLedger {
            name,
            owed,
            paid,
            contributed,
            total_owed: round2(total_owed),
            total_paid: round2(total_paid),
            total_contributed: round2(total_contributed),
            balance: round2(total_contributed - total_owed),
        }
    }
}
