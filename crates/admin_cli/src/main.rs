use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use server::{DEFAULT_TOKEN_TTL_MINUTES, IdentityConfig, IdentityGate};

#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Admin utilities for the expense ledger (categories, dev tokens)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./ledger.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Category(Category),
    Token(Token),
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create(CategoryCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct CategoryCreateArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Token {
    #[command(subcommand)]
    command: TokenCommand,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a bearer token for local testing.
    Issue(TokenIssueArgs),
}

#[derive(Args, Debug)]
struct TokenIssueArgs {
    #[arg(long)]
    user_id: i64,
    #[arg(long)]
    email: Option<String>,
    /// Shared secret used by the server (also read from `JWT_SECRET`).
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: String,
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_MINUTES)]
    ttl_minutes: i64,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Category(Category { command }) => {
            let db = connect_db(&cli.database_url).await?;
            let engine = Engine::builder().database(db).build().await?;

            match command {
                CategoryCommand::Create(args) => match engine.create_category(&args.name).await {
                    Ok(category) => println!("created category: {} ({})", category.name, category.id),
                    Err(EngineError::ExistingKey(name)) => {
                        eprintln!("category already exists: {name}");
                        std::process::exit(1);
                    }
                    Err(err) => return Err(err.into()),
                },
                CategoryCommand::List => {
                    for category in engine.list_categories().await? {
                        println!("{}\t{}", category.id, category.name);
                    }
                }
            }
        }
        Command::Token(Token {
            command: TokenCommand::Issue(args),
        }) => {
            let gate = IdentityGate::new(IdentityConfig {
                secret: args.jwt_secret,
                token_ttl_minutes: args.ttl_minutes,
            });
            let token = gate.issue(args.user_id, args.email.as_deref())?;
            println!("{token}");
        }
    }

    Ok(())
}
