//! Settings of the service binary.
//!
//! Values come from an optional TOML file (`config/settings.toml` unless
//! `--config` says otherwise) and are overridden by `CAMPUS_RISK__…`
//! environment variables, e.g. `CAMPUS_RISK__SERVER__PORT=8080`.

use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use engine::{Amount, Pagination, RiskLimits};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/settings";

#[derive(Debug, Parser)]
#[command(name = "campus_risk", version, about = "Campus marketplace risk service")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long, env = "CAMPUS_RISK_CONFIG")]
    config: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long)]
    level: Option<String>,
    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 3000,
            database: Database::Sqlite("campus_risk.db".to_string()),
        }
    }
}

/// Risk thresholds, amounts in major units.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Risk {
    pub human_monthly_limit: i64,
    pub pair_human_limit: i64,
    pub pair_transaction_limit: u64,
    pub high_value_limit: i64,
    pub low_monetary_threshold: i64,
    pub window_days: i64,
    pub score_threshold: f64,
    pub query_timeout_ms: Option<u64>,
}

impl Default for Risk {
    fn default() -> Self {
        let limits = RiskLimits::default();
        Self {
            human_monthly_limit: limits.human_monthly_limit.minor() / 100,
            pair_human_limit: limits.pair_human_limit.minor() / 100,
            pair_transaction_limit: limits.pair_transaction_limit,
            high_value_limit: limits.high_value_limit.minor() / 100,
            low_monetary_threshold: limits.low_monetary_threshold.minor() / 100,
            window_days: limits.window.num_days(),
            score_threshold: limits.score_threshold,
            query_timeout_ms: None,
        }
    }
}

impl Risk {
    pub fn limits(&self) -> Result<RiskLimits, ConfigError> {
        let window = chrono::TimeDelta::try_days(self.window_days)
            .filter(|window| *window > chrono::TimeDelta::zero())
            .ok_or_else(|| ConfigError::Message("risk.window_days must be positive".to_string()))?;
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::Message(
                "risk.score_threshold must be between 0 and 1".to_string(),
            ));
        }

        Ok(RiskLimits {
            human_monthly_limit: Amount::from_major(self.human_monthly_limit),
            pair_human_limit: Amount::from_major(self.pair_human_limit),
            pair_transaction_limit: self.pair_transaction_limit,
            high_value_limit: Amount::from_major(self.high_value_limit),
            low_monetary_threshold: Amount::from_major(self.low_monetary_threshold),
            window,
            score_threshold: self.score_threshold,
        })
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Paging {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for Paging {
    fn default() -> Self {
        let pagination = Pagination::default();
        Self {
            default_limit: pagination.default_limit,
            max_limit: pagination.max_limit,
        }
    }
}

impl From<&Paging> for Pagination {
    fn from(value: &Paging) -> Self {
        Self {
            default_limit: value.default_limit,
            max_limit: value.max_limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub risk: Risk,
    pub pagination: Paging,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();

        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(config_path).required(args.config.is_some()))
            .add_source(
                Environment::with_prefix("CAMPUS_RISK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Some(level) = args.level {
            settings.app.level = level;
        }
        if let Some(port) = args.port {
            settings.server.port = port;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_match_the_engine() {
        let settings = from_toml("");
        assert_eq!(settings.risk.limits().unwrap(), RiskLimits::default());
        assert_eq!(Pagination::from(&settings.pagination), Pagination::default());
        assert_eq!(settings.server.port, 3000);
        assert!(settings.risk.query_timeout().is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let settings = from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            port = 8080
            database = "memory"

            [risk]
            human_monthly_limit = 2000
            window_days = 7
            query_timeout_ms = 250
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert!(matches!(settings.server.database, Database::Memory));

        let limits = settings.risk.limits().unwrap();
        assert_eq!(limits.human_monthly_limit, Amount::from_major(2000));
        assert_eq!(limits.window, chrono::TimeDelta::days(7));
        assert_eq!(settings.risk.query_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn sqlite_path_is_a_table() {
        let settings = from_toml(
            r#"
            [server.database]
            sqlite = "data/risk.db"
            "#,
        );
        assert!(matches!(settings.server.database, Database::Sqlite(ref path) if path == "data/risk.db"));
    }

    #[test]
    fn bad_window_is_rejected() {
        let settings = from_toml("[risk]\nwindow_days = 0\n");
        assert!(settings.risk.limits().is_err());
    }
}
