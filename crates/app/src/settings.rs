//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overridden by `LEDGER__*` environment
//! variables (e.g. `LEDGER__AUTH__SECRET`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Pool size for a file-backed database. An in-memory one always uses a
    /// single connection.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub secret: String,
    pub token_ttl_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .set_default("app.level", "info")?
                .add_source(File::with_name("settings").required(false))
                .add_source(Environment::with_prefix("LEDGER").separator("__")),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_config(
            Config::builder()
                .set_default("app.level", "info")?
                .add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn full_settings() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "./ledger.db" }
            max_connections = 4

            [auth]
            secret = "s3cret"
            token_ttl_minutes = 30
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.server.database,
            Database::Sqlite("./ledger.db".to_string())
        );
        assert_eq!(settings.server.max_connections, 4);
        assert_eq!(settings.auth.token_ttl_minutes, Some(30));
    }

    #[test]
    fn minimal_settings_use_defaults() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"

            [auth]
            secret = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.bind, None);
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.server.max_connections, 10);
        assert_eq!(settings.auth.token_ttl_minutes, None);
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(
            parse(
                r#"
                [server]
                port = 3000
                database = "memory"
                "#
            )
            .is_err()
        );
    }
}
