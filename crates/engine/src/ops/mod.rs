use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use crate::{
    EngineError, ResultEngine,
    filter::LedgerFilter,
    fx::{FxDiskCache, FxMemoryCache, FxTable},
    names::NameAliases,
    policy::ReferenceAmountPolicy,
};

mod categories;
mod expenses;
mod participants;
mod payments;
mod totals;

pub use categories::{
    CategoriesIndex, CategoryBreakdown, CategoryExpenseRow, CategoryExpenses, CategoryTotal,
};
pub use participants::{
    ContributionRow, OwedRow, PaidRow, ParticipantLedger, ParticipantRow, ParticipantsReport,
};
pub use totals::{AmountTotals, MissingRateRow, Totals};

use serde::{Deserialize, Serialize};

/// The reconciliation engine: read-only aggregation over the expense,
/// payment and rate stores.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    fx: FxTable,
    aliases: NameAliases,
    policy: ReferenceAmountPolicy,
}

/// Everything the dashboard needs in one response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Summary {
    pub totals: Totals,
    pub by_category: CategoryBreakdown,
    pub participants: ParticipantsReport,
    pub categories: CategoriesIndex,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Rate towards CHF for a raw code spelling.
    pub async fn rate_to_chf(&self, code: &str) -> f64 {
        self.fx.rate_to_chf(code).await
    }

    /// All currency codes with a known rate, CHF always included.
    pub async fn known_codes(&self) -> Vec<String> {
        self.fx.known_codes().await
    }

    /// Unfiltered dashboard summary: totals, category breakdown, participant
    /// ledger rows and the category index in one pass.
    pub async fn summary(&self) -> ResultEngine<Summary> {
        let filter = LedgerFilter::default();
        Ok(Summary {
            totals: self.totals(&filter).await?,
            by_category: self.by_category(&filter).await?,
            participants: self.participants(&filter).await?,
            categories: self.categories_index().await,
        })
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    aliases: NameAliases,
    policy: ReferenceAmountPolicy,
    fx_memory: FxMemoryCache,
    fx_disk: Option<FxDiskCache>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Participant alias map ("fra" → "Francesca").
    pub fn aliases(mut self, aliases: NameAliases) -> EngineBuilder {
        self.aliases = aliases;
        self
    }

    /// Reference-amount policy; defaults to actual → budgeted → estimated.
    pub fn reference_policy(mut self, policy: ReferenceAmountPolicy) -> EngineBuilder {
        self.policy = policy;
        self
    }

    /// In-process rate cache. Inject a fresh one per test to start cold.
    pub fn fx_memory_cache(mut self, cache: FxMemoryCache) -> EngineBuilder {
        self.fx_memory = cache;
        self
    }

    /// Optional on-disk rate cache tier.
    pub fn fx_disk_cache(mut self, cache: FxDiskCache) -> EngineBuilder {
        self.fx_disk = Some(cache);
        self
    }

    /// Construct `Engine`.
    ///
    /// Probes the backing tables once: a missing table is a configuration
    /// error surfaced here, not a per-request fallback.
    pub async fn build(self) -> ResultEngine<Engine> {
        for table in ["fx_rates", "expenses", "payments"] {
            probe_table(&self.database, table).await?;
        }

        let fx = FxTable::new(self.database.clone(), self.fx_memory, self.fx_disk);
        Ok(Engine {
            database: self.database,
            fx,
            aliases: self.aliases,
            policy: self.policy,
        })
    }
}

async fn probe_table(database: &DatabaseConnection, table: &str) -> ResultEngine<()> {
    let statement = Statement::from_string(
        database.get_database_backend(),
        format!("SELECT COUNT(*) FROM {table}"),
    );
    database.query_one(statement).await.map_err(|err| {
        EngineError::Schema(format!("backing table '{table}' is not queryable: {err}"))
    })?;
    Ok(())
}
