use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Same override the `ledger` binary reads for its SQLite file.
const SQLITE_PATH_VAR: &str = "LEDGER__SERVER__DATABASE__SQLITE";
const DEFAULT_SQLITE_PATH: &str = "./ledger.db";

const USAGE: &str = "Usage: migration [up|down|fresh|status]

The database is taken from DATABASE_URL, or else from the SQLite file in
LEDGER__SERVER__DATABASE__SQLITE (default ./ledger.db).";

/// `DATABASE_URL` wins; otherwise the ledger's SQLite file is opened (and
/// created if missing).
fn database_url(database_url: Option<String>, sqlite_path: Option<String>) -> String {
    database_url.unwrap_or_else(|| {
        let path = sqlite_path.unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string());
        format!("sqlite:{path}?mode=rwc")
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cmd = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    if !matches!(cmd.as_str(), "up" | "down" | "fresh" | "status") {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let db_url = database_url(
        std::env::var("DATABASE_URL").ok(),
        std::env::var(SQLITE_PATH_VAR).ok(),
    );
    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        _ => migration::Migrator::up(&db, None).await?,
    }

    Ok(())
}
