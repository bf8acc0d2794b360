use std::{path::PathBuf, str::FromStr};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::Parser;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/motolog.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `memory`, or the path of a SQLite file.
    pub database: String,
    /// E-mail domains allowed to sign in. Empty means any domain.
    pub allowed_domains: Vec<String>,
    /// Where the signed-in address is remembered between runs.
    pub session_file: Option<String>,
    pub timezone: String,
    pub log_file: String,
    pub level: String,
    /// Prefill for the login screen.
    pub email: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: "motolog.db".to_string(),
            allowed_domains: Vec::new(),
            session_file: Some("config/session.json".to_string()),
            timezone: "America/Bogota".to_string(),
            log_file: "motolog.log".to_string(),
            level: "info".to_string(),
            email: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl AppConfig {
    pub fn database(&self) -> Database {
        match self.database.trim() {
            "memory" | ":memory:" => Database::Memory,
            path => Database::Sqlite(path.to_string()),
        }
    }

    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }

    pub fn tz(&self) -> Result<Tz> {
        Tz::from_str(self.timezone.trim())
            .map_err(|_| AppError::Timezone(self.timezone.clone()))
    }

    /// The calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        match self.tz() {
            Ok(tz) => Utc::now().with_timezone(&tz).date_naive(),
            Err(_) => Utc::now().date_naive(),
        }
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Self::Memory => "sqlite::memory:".to_string(),
            Self::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "motolog", about = "Motorcycle maintenance expense tracker")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override database (`memory` or a SQLite path).
    #[arg(long)]
    database: Option<String>,
    /// Allow sign-ins from this e-mail domain. Repeatable.
    #[arg(long = "allowed-domain")]
    allowed_domains: Vec<String>,
    /// Override session file path.
    #[arg(long)]
    session_file: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override log file path.
    #[arg(long)]
    log_file: Option<String>,
    /// Override log level.
    #[arg(long)]
    level: Option<String>,
    /// Prefill the login e-mail.
    #[arg(long)]
    email: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("MOTOLOG")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("allowed_domains"),
    );
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(database) = args.database {
        settings.database = database;
    }
    if !args.allowed_domains.is_empty() {
        settings.allowed_domains = args.allowed_domains;
    }
    if let Some(session_file) = args.session_file {
        settings.session_file = Some(session_file);
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }
    if let Some(email) = args.email {
        settings.email = email;
    }

    settings.tz()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_kind_follows_the_value() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.database(),
            Database::Sqlite("motolog.db".to_string())
        );
        assert_eq!(config.database().url(), "sqlite:motolog.db?mode=rwc");

        config.database = " memory ".to_string();
        assert_eq!(config.database(), Database::Memory);
    }

    #[test]
    fn blank_session_file_disables_persistence() {
        let config = AppConfig {
            session_file: Some("  ".to_string()),
            ..AppConfig::default()
        };
        assert!(config.session_path().is_none());
    }

    #[test]
    fn unknown_timezones_are_rejected() {
        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.tz(), Err(AppError::Timezone(_))));
        assert!(AppConfig::default().tz().is_ok());
    }
}
