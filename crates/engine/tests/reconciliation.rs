use std::sync::atomic::{AtomicUsize, Ordering};

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, FxDiskCache, LedgerFilter, NameAliases};
use migration::MigratorTrait;

async fn db_with_schema() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn engine_for(db: &DatabaseConnection) -> Engine {
    Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap()
}

async fn seed_rate(db: &DatabaseConnection, code: &str, rate: f64) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO fx_rates (code, rate_to_chf) VALUES (?, ?)",
        vec![code.into(), rate.into()],
    ))
    .await
    .unwrap();
}

#[allow(clippy::too_many_arguments)]
async fn seed_expense(
    db: &DatabaseConnection,
    description: &str,
    category: &str,
    amounts: (f64, f64, f64),
    currency: &str,
    spent_on: &str,
    paid_by: &str,
    split_among: &str,
) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO expenses (day_ref, description, category, estimated_amount, \
         budgeted_amount, actual_amount, currency, spent_on, paid_by, split_among) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            Option::<i32>::None.into(),
            description.into(),
            category.into(),
            amounts.0.into(),
            amounts.1.into(),
            amounts.2.into(),
            currency.into(),
            spent_on.into(),
            paid_by.into(),
            split_among.into(),
        ],
    ))
    .await
    .unwrap();
}

async fn seed_payment(
    db: &DatabaseConnection,
    participant: &str,
    amount: f64,
    currency: &str,
    paid_on: &str,
) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO payments (participant, amount, currency, paid_on) VALUES (?, ?, ?, ?)",
        vec![
            participant.into(),
            amount.into(),
            currency.into(),
            paid_on.into(),
        ],
    ))
    .await
    .unwrap();
}

fn temp_blob_path(tag: &str) -> std::path::PathBuf {
    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "rendiconto_fx_{}_{}_{}.json",
        tag,
        std::process::id(),
        seq
    ))
}

#[tokio::test]
async fn settlement_rate_is_one_regardless_of_store() {
    let db = db_with_schema().await;
    let engine = engine_for(&db).await;

    assert_eq!(engine.rate_to_chf("CHF").await, 1.0);
    assert_eq!(engine.rate_to_chf("chf").await, 1.0);
    assert_eq!(engine.rate_to_chf("Sfr.").await, 1.0);
}

#[tokio::test]
async fn known_codes_always_include_settlement_and_sort() {
    let db = db_with_schema().await;
    seed_rate(&db, "USD", 0.9).await;
    seed_rate(&db, "EUR", 0.95).await;
    let engine = engine_for(&db).await;

    assert_eq!(engine.known_codes().await, vec!["CHF", "EUR", "USD"]);
}

#[tokio::test]
async fn totals_exclude_unconvertible_rows_and_report_their_currency_once() {
    let db = db_with_schema().await;
    seed_rate(&db, "USD", 0.9).await;
    seed_expense(
        &db,
        "funivia",
        "Trasporti",
        (0.0, 0.0, 100.0),
        "USD",
        "2025-05-10",
        "alice",
        "alice, Bob ",
    )
    .await;
    seed_expense(
        &db,
        "souvenir",
        "Varie",
        (0.0, 0.0, 50.0),
        "XXX",
        "2025-05-11",
        "alice",
        "",
    )
    .await;
    seed_expense(
        &db,
        "mancia",
        "Varie",
        (0.0, 0.0, 5.0),
        "XXX",
        "2025-05-12",
        "alice",
        "",
    )
    .await;
    let engine = engine_for(&db).await;

    let totals = engine.totals(&LedgerFilter::default()).await.unwrap();
    assert_eq!(totals.values.actual, 90.0);
    assert_eq!(totals.values.estimated, 0.0);
    assert_eq!(totals.missing_currencies, vec!["XXX"]);
}

#[tokio::test]
async fn split_shares_and_contributions_reconcile() {
    let db = db_with_schema().await;
    seed_rate(&db, "USD", 0.9).await;
    // 100 USD split between two people, each owes 45.00 CHF
    seed_expense(
        &db,
        "funivia",
        "Trasporti",
        (0.0, 0.0, 100.0),
        "USD",
        "2025-05-10",
        "alice",
        "alice, Bob ",
    )
    .await;
    // unknown rate: skipped entirely, reaches neither owed nor unassigned
    seed_expense(
        &db,
        "souvenir",
        "Varie",
        (0.0, 0.0, 50.0),
        "XXX",
        "2025-05-11",
        "alice",
        "",
    )
    .await;
    seed_payment(&db, "Alice", 200.0, "CHF", "2025-05-12").await;
    let engine = engine_for(&db).await;

    let report = engine.participants(&LedgerFilter::default()).await.unwrap();
    assert_eq!(report.unassigned_total, 0.0);

    let names: Vec<&str> = report.rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);

    let alice = &report.rows[0];
    assert_eq!(alice.owed, 45.0);
    assert_eq!(alice.paid, 90.0);
    assert_eq!(alice.contributed, 200.0);
    assert_eq!(alice.balance, 155.0);

    let bob = &report.rows[1];
    assert_eq!(bob.owed, 45.0);
    assert_eq!(bob.paid, 0.0);
    assert_eq!(bob.contributed, 0.0);
    assert_eq!(bob.balance, -45.0);
}

#[tokio::test]
async fn empty_split_goes_to_unassigned_when_convertible() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "taxi",
        "Trasporti",
        (0.0, 0.0, 30.0),
        "CHF",
        "2025-05-10",
        "bob",
        "",
    )
    .await;
    let engine = engine_for(&db).await;

    let report = engine.participants(&LedgerFilter::default()).await.unwrap();
    assert_eq!(report.unassigned_total, 30.0);

    let bob = &report.rows[0];
    assert_eq!(bob.name, "Bob");
    assert_eq!(bob.paid, 30.0);
    assert_eq!(bob.owed, 0.0);
    assert_eq!(bob.balance, 0.0);
}

#[tokio::test]
async fn contribution_only_participant_still_gets_a_row() {
    let db = db_with_schema().await;
    seed_payment(&db, "carla", 10.0, "CHF", "2025-05-01").await;
    let engine = engine_for(&db).await;

    let report = engine.participants(&LedgerFilter::default()).await.unwrap();
    assert_eq!(report.rows.len(), 1);
    let carla = &report.rows[0];
    assert_eq!(carla.name, "Carla");
    assert_eq!(carla.owed, 0.0);
    assert_eq!(carla.contributed, 10.0);
    assert_eq!(carla.balance, 10.0);
}

#[tokio::test]
async fn uneven_split_shares_still_sum_to_the_amount() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "cena",
        "Cibo",
        (0.0, 0.0, 100.0),
        "CHF",
        "2025-05-10",
        "",
        "alice,bob,carla",
    )
    .await;
    seed_payment(&db, "alice", 100.0, "CHF", "2025-05-11").await;
    let engine = engine_for(&db).await;

    let report = engine.participants(&LedgerFilter::default()).await.unwrap();
    let owed: Vec<f64> = report.rows.iter().map(|row| row.owed).collect();
    assert_eq!(owed, vec![33.33, 33.33, 33.33]);

    // division stays exact until output: 100 - 100/3 rounds to 66.67
    let alice = &report.rows[0];
    assert_eq!(alice.balance, 66.67);
}

#[tokio::test]
async fn category_breakdown_sorts_labels_naturally() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "pranzo",
        "cibo",
        (0.0, 0.0, 12.0),
        "CHF",
        "2025-05-10",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "biglietti",
        "Trasporti",
        (0.0, 0.0, 40.0),
        "CHF",
        "2025-05-10",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "cena",
        "cibo",
        (0.0, 0.0, 18.5),
        "CHF",
        "2025-05-11",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "souvenir",
        "",
        (0.0, 0.0, 5.0),
        "CHF",
        "2025-05-12",
        "",
        "",
    )
    .await;
    let engine = engine_for(&db).await;

    let breakdown = engine.by_category(&LedgerFilter::default()).await.unwrap();
    let labels: Vec<&str> = breakdown
        .values
        .iter()
        .map(|value| value.label.as_str())
        .collect();
    assert_eq!(labels, vec!["cibo", "Trasporti", "Uncategorized"]);
    assert_eq!(breakdown.values[0].total_chf, 30.5);
    assert_eq!(breakdown.values[2].total_chf, 5.0);
    assert!(breakdown.missing_currencies.is_empty());
}

#[tokio::test]
async fn categories_index_round_trips_and_resolves_collisions_first_wins() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "bus",
        "Trasporti ",
        (0.0, 0.0, 4.0),
        "CHF",
        "2025-05-10",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "treno",
        "trasporti",
        (0.0, 0.0, 20.0),
        "CHF",
        "2025-05-11",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "pranzo",
        "Cibo",
        (0.0, 0.0, 12.0),
        "CHF",
        "2025-05-11",
        "",
        "",
    )
    .await;
    let engine = engine_for(&db).await;

    let index = engine.categories_index().await;
    assert_eq!(
        index.label_to_slug.get("Trasporti "),
        Some(&"trasporti".to_string())
    );
    assert_eq!(
        index.label_to_slug.get("trasporti"),
        Some(&"trasporti".to_string())
    );
    // "trasporti" sorts before "Trasporti " naturally, so it keeps the slug
    assert_eq!(
        index.slug_to_label.get("trasporti"),
        Some(&"trasporti".to_string())
    );

    let slug = index.label_to_slug.get("Cibo").unwrap();
    assert_eq!(index.slug_to_label.get(slug), Some(&"Cibo".to_string()));
}

#[tokio::test]
async fn list_by_category_slug_sorts_by_date_and_reports_missing() {
    let db = db_with_schema().await;
    seed_rate(&db, "USD", 0.9).await;
    seed_expense(
        &db,
        "cena",
        "Cibo",
        (0.0, 0.0, 20.0),
        "CHF",
        "2025-05-12",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "pranzo",
        "Cibo",
        (0.0, 0.0, 10.0),
        "USD",
        "2025-05-10",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "street food",
        "Cibo",
        (0.0, 0.0, 7.0),
        "XXX",
        "2025-05-11",
        "",
        "",
    )
    .await;
    let engine = engine_for(&db).await;

    let listing = engine.list_by_category_slug("cibo").await;
    assert_eq!(listing.label.as_deref(), Some("Cibo"));
    let dates: Vec<&str> = listing.rows.iter().map(|row| row.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-05-10", "2025-05-12"]);
    assert_eq!(listing.total_chf, 29.0);
    assert_eq!(listing.missing_currencies, vec!["XXX"]);

    let unknown = engine.list_by_category_slug("no-such-category").await;
    assert_eq!(unknown.label, None);
    assert!(unknown.rows.is_empty());
}

#[tokio::test]
async fn ledger_resolves_aliases_from_slug() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "cena",
        "Cibo",
        (0.0, 0.0, 60.0),
        "CHF",
        "2025-05-10",
        "fra",
        "fra, bob",
    )
    .await;
    seed_payment(&db, "Franzi", 80.0, "CHF", "2025-05-12").await;

    let engine = Engine::builder()
        .database(db.clone())
        .aliases(NameAliases::new([
            ("fra".to_string(), "Francesca".to_string()),
            ("franzi".to_string(), "Francesca".to_string()),
        ]))
        .build()
        .await
        .unwrap();

    let ledger = engine.ledger_by_participant_slug("fra").await;
    assert_eq!(ledger.name, "Francesca");
    assert_eq!(ledger.owed.len(), 1);
    assert_eq!(ledger.owed[0].share_chf, 30.0);
    assert_eq!(ledger.paid.len(), 1);
    assert_eq!(ledger.paid[0].amount_chf, 60.0);
    assert_eq!(ledger.contributed.len(), 1);
    assert_eq!(ledger.contributed[0].amount_chf, 80.0);
    assert_eq!(ledger.total_owed, 30.0);
    assert_eq!(ledger.total_paid, 60.0);
    assert_eq!(ledger.total_contributed, 80.0);
    assert_eq!(ledger.balance, 50.0);
}

#[tokio::test]
async fn ledger_lists_are_date_ascending() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "cena",
        "Cibo",
        (0.0, 0.0, 20.0),
        "CHF",
        "2025-05-12",
        "anna",
        "anna",
    )
    .await;
    seed_expense(
        &db,
        "pranzo",
        "Cibo",
        (0.0, 0.0, 10.0),
        "CHF",
        "2025-05-10",
        "anna",
        "anna",
    )
    .await;
    let engine = engine_for(&db).await;

    let ledger = engine.ledger_by_participant_slug("anna").await;
    let dates: Vec<&str> = ledger.owed.iter().map(|row| row.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-05-10", "2025-05-12"]);
}

#[tokio::test]
async fn filters_restrict_dates_currency_and_categories() {
    let db = db_with_schema().await;
    seed_rate(&db, "USD", 0.9).await;
    seed_expense(
        &db,
        "pranzo",
        "Cibo",
        (0.0, 0.0, 10.0),
        "CHF",
        "2025-05-10",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "cena",
        "Cibo",
        (0.0, 0.0, 20.0),
        "USD",
        "2025-05-11",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "museo",
        "Cultura",
        (0.0, 0.0, 15.0),
        "CHF",
        "2025-05-12",
        "",
        "",
    )
    .await;
    let engine = engine_for(&db).await;

    let may_11_on = LedgerFilter {
        from: Some("2025-05-11".to_string()),
        ..Default::default()
    };
    assert_eq!(engine.totals(&may_11_on).await.unwrap().values.actual, 33.0);

    let usd_only = LedgerFilter {
        currency: Some("usd".to_string()),
        ..Default::default()
    };
    assert_eq!(engine.totals(&usd_only).await.unwrap().values.actual, 18.0);

    let food_only = LedgerFilter {
        categories: vec!["Cibo".to_string()],
        ..Default::default()
    };
    assert_eq!(engine.totals(&food_only).await.unwrap().values.actual, 28.0);

    let inverted = LedgerFilter {
        from: Some("2025-06-01".to_string()),
        to: Some("2025-05-01".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        engine.totals(&inverted).await,
        Err(EngineError::InvalidFilter(_))
    ));
}

#[tokio::test]
async fn missing_rate_rows_are_date_ascending() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "souvenir",
        "Varie",
        (0.0, 0.0, 50.0),
        "XXX",
        "2025-05-12",
        "",
        "",
    )
    .await;
    seed_expense(
        &db,
        "mercato",
        "",
        (25.0, 0.0, 0.0),
        "YYY",
        "2025-05-10",
        "",
        "",
    )
    .await;
    let engine = engine_for(&db).await;

    let rows = engine
        .missing_rate_rows(&LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-05-10");
    assert_eq!(rows[0].currency, "YYY");
    assert_eq!(rows[0].category, "Uncategorized");
    assert_eq!(rows[0].reference_amount, 25.0);
    assert_eq!(rows[1].currency, "XXX");
}

#[tokio::test]
async fn store_failure_degrades_to_empty_reports() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "pranzo",
        "Cibo",
        (0.0, 0.0, 10.0),
        "CHF",
        "2025-05-10",
        "",
        "",
    )
    .await;
    let engine = engine_for(&db).await;

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, "DROP TABLE expenses"))
        .await
        .unwrap();

    let totals = engine.totals(&LedgerFilter::default()).await.unwrap();
    assert_eq!(totals.values.actual, 0.0);
    assert!(totals.missing_currencies.is_empty());

    let report = engine.participants(&LedgerFilter::default()).await.unwrap();
    assert!(report.rows.is_empty());
}

#[tokio::test]
async fn fx_store_failure_degrades_to_settlement_only() {
    let db = db_with_schema().await;
    seed_rate(&db, "USD", 0.9).await;
    let engine = engine_for(&db).await;

    // the table vanishes after the startup probe; the first lookup hits the
    // store, fails, and degrades to CHF-only
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, "DROP TABLE fx_rates"))
        .await
        .unwrap();

    assert_eq!(engine.rate_to_chf("CHF").await, 1.0);
    assert_eq!(engine.rate_to_chf("USD").await, 0.0);
    assert_eq!(engine.known_codes().await, vec!["CHF"]);
}

#[tokio::test]
async fn missing_schema_fails_startup() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let result = Engine::builder().database(db).build().await;
    assert!(matches!(result, Err(EngineError::Schema(_))));
}

#[tokio::test]
async fn fresh_disk_cache_wins_over_the_store() {
    let db = db_with_schema().await;
    seed_rate(&db, "USD", 0.9).await;

    let path = temp_blob_path("fresh");
    let blob = serde_json::json!({
        "ts": chrono::Utc::now().timestamp(),
        "rates": { "USD": 0.5 }
    });
    std::fs::write(&path, blob.to_string()).unwrap();

    let engine = Engine::builder()
        .database(db.clone())
        .fx_disk_cache(FxDiskCache::new(&path, 3600))
        .build()
        .await
        .unwrap();
    assert_eq!(engine.rate_to_chf("USD").await, 0.5);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn stale_disk_cache_falls_through_and_is_rewritten() {
    let db = db_with_schema().await;
    seed_rate(&db, "USD", 0.9).await;

    let path = temp_blob_path("stale");
    let blob = serde_json::json!({
        "ts": chrono::Utc::now().timestamp() - 100_000,
        "rates": { "USD": 0.5 }
    });
    std::fs::write(&path, blob.to_string()).unwrap();

    let engine = Engine::builder()
        .database(db.clone())
        .fx_disk_cache(FxDiskCache::new(&path, 3600))
        .build()
        .await
        .unwrap();
    assert_eq!(engine.rate_to_chf("USD").await, 0.9);

    // write-through refreshed the blob: a second engine with a cold memory
    // cache reads 0.9 from disk even though the store now says otherwise
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "UPDATE fx_rates SET rate_to_chf = 0.7 WHERE code = 'USD'",
    ))
    .await
    .unwrap();

    let second = Engine::builder()
        .database(db.clone())
        .fx_disk_cache(FxDiskCache::new(&path, 3600))
        .build()
        .await
        .unwrap();
    assert_eq!(second.rate_to_chf("USD").await, 0.9);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn summary_bundles_the_dashboard_views() {
    let db = db_with_schema().await;
    seed_expense(
        &db,
        "pranzo",
        "Cibo",
        (0.0, 0.0, 10.0),
        "CHF",
        "2025-05-10",
        "alice",
        "alice",
    )
    .await;
    let engine = engine_for(&db).await;

    let summary = engine.summary().await.unwrap();
    assert_eq!(summary.totals.values.actual, 10.0);
    assert_eq!(summary.by_category.values.len(), 1);
    assert_eq!(summary.participants.rows.len(), 1);
    assert!(summary.categories.slug_to_label.contains_key("cibo"));
}
