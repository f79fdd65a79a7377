use clap::Parser;
use migration::{Migrator, MigratorTrait};

use settings::Database;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "rendiconto", version, about = "Travel expense reconciliation service")]
struct Cli {
    /// Settings file, without extension.
    #[arg(short, long, default_value = "settings", env = "RENDICONTO_CONFIG")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "rendiconto={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    let mut builder = engine::Engine::builder().database(db);
    if !settings.aliases.is_empty() {
        builder = builder.aliases(engine::NameAliases::new(settings.aliases.clone()));
    }
    if let Some(fx_cache) = &settings.fx_cache {
        builder = builder.fx_disk_cache(engine::FxDiskCache::new(
            &fx_cache.path,
            fx_cache.ttl_secs,
        ));
    }

    let engine = match builder.build().await {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("failed to build engine from database: {err}");
            return Err(Box::new(err) as Box<dyn std::error::Error + Send + Sync>);
        }
    };

    let bind = settings.server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
