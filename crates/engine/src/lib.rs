pub use error::EngineError;
pub use expenses::{Expense, UNCATEGORIZED_LABEL};
pub use filter::LedgerFilter;
pub use fx::{DEFAULT_CACHE_TTL_SECS, FxDiskCache, FxMemoryCache, FxTable};
pub use names::NameAliases;
pub use ops::{
    AmountTotals, CategoriesIndex, CategoryBreakdown, CategoryExpenseRow, CategoryExpenses,
    CategoryTotal, ContributionRow, Engine, EngineBuilder, MissingRateRow, OwedRow, PaidRow,
    ParticipantLedger, ParticipantRow, ParticipantsReport, Summary, Totals,
};
pub use payments::Payment;
pub use policy::ReferenceAmountPolicy;

pub mod currency;
mod error;
mod expenses;
mod filter;
mod fx;
mod fx_rates;
pub mod money;
pub mod names;
mod ops;
mod payments;
mod policy;
pub mod slug;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
