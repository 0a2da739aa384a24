//! Service Configuration
//!
//! Sources, lowest to highest precedence: JSON file, `SUBSCRIPTIONS_*`
//! environment variables, command line flags.
//!
//! Nested keys use a double underscore: `SUBSCRIPTIONS_DB__URL` sets `db.url`,
//! `SUBSCRIPTIONS_JWT_SECRET` sets `jwt_secret`.

use anyhow::{Context, bail};
use config::{Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_PORT: u16 = 7070;
const ENV_PREFIX: &str = "SUBSCRIPTIONS";

/// Database backends the service can run on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// `postgres`, `postgresql` or `memory`; derived from `url` when empty
    pub driver: String,
    pub url: String,
    /// Table name prefix
    pub namespace: String,
    pub automigrate: bool,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 0 until resolved
    pub port: u16,
    pub jwt_secret: String,
    pub admin_group_name: String,
    /// Processor secret key; empty selects the fail-closed proxy
    pub stripe_key: String,
    pub log: LogConfig,
    pub db: DbConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("admin_group_name", &self.admin_group_name)
            .field("stripe_key", &"[REDACTED]")
            .field("log", &self.log)
            .field("db", &self.db)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment (after `.env`) and an optional file
    pub fn load(file: Option<&Path>, port_flag: Option<u16>) -> anyhow::Result<Self> {
        Self::from_sources(file, None, port_flag)
    }

    /// Merge every source and validate the result
    ///
    /// `vars` replaces the process environment when given.
    pub fn from_sources(
        file: Option<&Path>,
        vars: Option<HashMap<String, String>>,
        port_flag: Option<u16>,
    ) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Json));
        }

        let mut config: AppConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .source(vars.clone()),
            )
            .set_override_option("port", port_flag.map(i64::from))?
            .build()
            .context("loading configuration")?
            .try_deserialize()
            .context("parsing configuration")?;

        config.resolve(|key| match &vars {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        })?;
        Ok(config)
    }

    /// Fallbacks and validation
    fn resolve(&mut self, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if self.port == 0 {
            self.port = match env("PORT").filter(|v| !v.is_empty()) {
                Some(port) => port
                    .parse()
                    .with_context(|| format!("invalid PORT: {port}"))?,
                None => DEFAULT_PORT,
            };
        }

        if self.db.url.is_empty() {
            self.db.url = env("DATABASE_URL").unwrap_or_default();
        }
        if self.db.driver.is_empty() {
            self.db.driver = match self.db.url.split_once("://") {
                Some((scheme, _)) => scheme.to_string(),
                None => bail!("db.url or DATABASE_URL must be set unless db.driver is \"memory\""),
            };
        }
        // Validates the driver name.
        let driver = self.db.driver()?;
        if driver == Driver::Postgres && self.db.url.is_empty() {
            bail!("db.url or DATABASE_URL must be set for the postgres driver");
        }

        if self.jwt_secret.is_empty() {
            bail!("jwt_secret must be set");
        }
        if self.log.level.is_empty() {
            self.log.level = "info".to_string();
        }

        Ok(())
    }
}

impl DbConfig {
    pub fn driver(&self) -> anyhow::Result<Driver> {
        match self.driver.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            "memory" => Ok(Driver::Memory),
            other => bail!("unsupported database driver: {other}"),
        }
    }
}
