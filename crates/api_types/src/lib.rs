use serde::{Deserialize, Serialize};

pub mod rendiconto {
    use super::*;

    /// Query parameters accepted by the filterable rendiconto endpoints.
    ///
    /// `from`/`to` are inclusive ISO `YYYY-MM-DD` bounds, `cur` a currency
    /// code in any known spelling, `cat` a repeatable category label
    /// parameter (`?cat=Cibo&cat=Trasporti`).
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct LedgerQuery {
        pub from: Option<String>,
        pub to: Option<String>,
        pub cur: Option<String>,
        #[serde(default)]
        pub cat: Vec<String>,
    }
}

pub mod fx {
    use super::*;

    /// Currency codes with a known rate, settlement currency included.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct KnownCodes {
        pub codes: Vec<String>,
    }
}
