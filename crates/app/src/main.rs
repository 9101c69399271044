use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait};
use server::{DEFAULT_TOKEN_TTL_MINUTES, IdentityConfig, IdentityGate, ServerState};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = match parse_database(&settings.server.database, settings.server.max_connections).await
    {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Err(err);
        }
    };

    let engine = match engine::Engine::builder().database(db).build().await {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("failed to build engine from database: {err}");
            return Err(err.into());
        }
    };

    let identity = IdentityGate::new(IdentityConfig {
        secret: settings.auth.secret,
        token_ttl_minutes: settings
            .auth
            .token_ttl_minutes
            .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
    });

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return Err(err.into());
        }
    };

    if let Err(err) = server::run_with_listener(ServerState::new(engine, identity), listener).await {
        tracing::error!("server failed: {err}");
        return Err(err.into());
    }

    Ok(())
}

fn connect_options(config: &Database, max_connections: u32) -> ConnectOptions {
    match config {
        // Every connection to `sqlite::memory:` opens its own database.
        Database::Memory => {
            let mut options = ConnectOptions::new("sqlite::memory:");
            options.max_connections(1);
            options
        }
        Database::Sqlite(path) => {
            let mut options = ConnectOptions::new(format!("sqlite:{}?mode=rwc", path));
            options.max_connections(max_connections.max(1));
            options
        }
    }
}

async fn parse_database(
    config: &settings::Database,
    max_connections: u32,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let options = connect_options(config, max_connections);
    tracing::info!(
        max_connections = options.get_max_connections(),
        "connecting to database"
    );

    let database = sea_orm::Database::connect(options).await?;
    if matches!(config, Database::Sqlite(_)) {
        // Readers see a snapshot while a writer commits.
        database
            .execute_unprepared("PRAGMA journal_mode=WAL")
            .await?;
    }
    Migrator::up(&database, None).await?;
    Ok(database)
}
