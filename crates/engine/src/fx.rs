//! The currency rate table and its two cache tiers.
//!
//! Rate lookups go memory → disk cache → backing table:
//!
//! 1. an in-process cache, valid for the process lifetime. It is an injected
//!    object rather than a global so tests can start from a fresh one; racing
//!    requests may both populate it, which is benign (same derived value).
//! 2. a JSON blob `{ts, rates}` on disk with a TTL (default 6 hours).
//!    Absence, corruption or staleness is a miss, never an error.
//! 3. the `fx_rates` table, written through to the disk cache on success.
//!
//! A failing store degrades to "only CHF is known": lookups return 0.0 and
//! the aggregations mark those rows as missing instead of erroring.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::{
    currency::{SETTLEMENT_CURRENCY, normalize_code},
    fx_rates,
    util::natural_cmp,
};

/// Default disk-cache TTL: 6 hours.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 21_600;

/// Process-lifetime rate cache, shared by cloning.
#[derive(Clone, Debug, Default)]
pub struct FxMemoryCache {
    inner: Arc<RwLock<Option<Arc<HashMap<String, f64>>>>>,
}

impl FxMemoryCache {
    fn get(&self) -> Option<Arc<HashMap<String, f64>>> {
        self.inner.read().ok()?.clone()
    }

    fn set(&self, rates: Arc<HashMap<String, f64>>) {
        if let Ok(mut slot) = self.inner.write() {
            *slot = Some(rates);
        }
    }
}

/// On-disk cache tier: a timestamped JSON blob at a configurable path.
#[derive(Clone, Debug)]
pub struct FxDiskCache {
    path: PathBuf,
    ttl_secs: u64,
}

#[derive(Serialize, Deserialize)]
struct CachedRates {
    ts: i64,
    rates: HashMap<String, f64>,
}

impl FxDiskCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        Self {
            path: path.into(),
            ttl_secs,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the blob. Stale, absent or corrupt files are a miss.
    fn load(&self) -> Option<HashMap<String, f64>> {
        if self.ttl_secs == 0 {
            return None;
        }
        let bytes = std::fs::read(&self.path).ok()?;
        let cached: CachedRates = serde_json::from_slice(&bytes).ok()?;
        let age = chrono::Utc::now().timestamp().saturating_sub(cached.ts);
        if age < 0 || age as u64 > self.ttl_secs {
            return None;
        }
        Some(normalize_rates(cached.rates))
    }

    fn store(&self, rates: &HashMap<String, f64>) {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && let Err(err) = std::fs::create_dir_all(dir)
        {
            tracing::debug!("fx cache dir not writable: {err}");
            return;
        }
        let blob = CachedRates {
            ts: chrono::Utc::now().timestamp(),
            rates: rates.clone(),
        };
        match serde_json::to_vec(&blob) {
            Ok(bytes) => {
                if let Err(err) = std::fs::write(&self.path, bytes) {
                    tracing::debug!("fx cache write failed: {err}");
                }
            }
            Err(err) => tracing::debug!("fx cache encode failed: {err}"),
        }
    }
}

/// Normalizes cache/store keys and pins CHF to 1.0, dropping unusable rates.
fn normalize_rates(raw: HashMap<String, f64>) -> HashMap<String, f64> {
    let mut rates = HashMap::from([(SETTLEMENT_CURRENCY.to_string(), 1.0)]);
    for (code, rate) in raw {
        let code = normalize_code(&code);
        if code == SETTLEMENT_CURRENCY || rate <= 0.0 {
            continue;
        }
        rates.insert(code, rate);
    }
    rates
}

/// The rate table: answers rate queries against whichever tier is warm.
#[derive(Debug)]
pub struct FxTable {
    database: DatabaseConnection,
    memory: FxMemoryCache,
    disk: Option<FxDiskCache>,
}

impl FxTable {
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        memory: FxMemoryCache,
        disk: Option<FxDiskCache>,
    ) -> Self {
        Self {
            database,
            memory,
            disk,
        }
    }

    /// Current rate snapshot, loading the cold tiers on first use.
    pub async fn rates(&self) -> Arc<HashMap<String, f64>> {
        if let Some(rates) = self.memory.get() {
            return rates;
        }

        if let Some(disk) = &self.disk
            && let Some(rates) = disk.load()
        {
            let rates = Arc::new(rates);
            self.memory.set(rates.clone());
            return rates;
        }

        let rates = match fx_rates::Entity::find().all(&self.database).await {
            Ok(rows) => {
                let rates = normalize_rates(
                    rows.into_iter()
                        .map(|row| (row.code, row.rate_to_chf))
                        .collect(),
                );
                if let Some(disk) = &self.disk {
                    disk.store(&rates);
                }
                rates
            }
            Err(err) => {
                tracing::warn!("fx store unavailable, degrading to CHF only: {err}");
                HashMap::from([(SETTLEMENT_CURRENCY.to_string(), 1.0)])
            }
        };

        let rates = Arc::new(rates);
        self.memory.set(rates.clone());
        rates
    }

    /// Rate towards CHF for a raw code spelling. 1.0 for CHF, 0.0 when the
    /// code is unknown ("cannot convert", not an error).
    pub async fn rate_to_chf(&self, code: &str) -> f64 {
        let code = normalize_code(code);
        if code == SETTLEMENT_CURRENCY {
            return 1.0;
        }
        self.rates().await.get(&code).copied().unwrap_or(0.0)
    }

    /// All codes with a known rate, CHF always included, natural order.
    pub async fn known_codes(&self) -> Vec<String> {
        let rates = self.rates().await;
        let mut codes: Vec<String> = rates.keys().cloned().collect();
        if !codes.iter().any(|code| code == SETTLEMENT_CURRENCY) {
            codes.push(SETTLEMENT_CURRENCY.to_string());
        }
        codes.sort_by(|a, b| natural_cmp(a, b));
        codes
    }
}
