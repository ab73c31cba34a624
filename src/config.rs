//! Layered client configuration.
//!
//! Priority, lowest first: built-in defaults, config file, `CURA_`
//! environment variables (`CURA_SERVICE__BASE_URL=...`), command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::persistence::{FileStore, HistoryStorage};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the reply service
    #[arg(long)]
    pub service_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Extra delay before a reply is shown, in milliseconds
    #[arg(long)]
    pub reply_delay_ms: Option<u64>,

    /// File holding the chat history
    #[arg(long)]
    pub history_file: Option<String>,

    /// Keep history in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub exchange: ExchangeConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeConfig {
    pub reply_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub ephemeral: bool,
}

impl ServiceConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ExchangeConfig {
    #[must_use]
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl StorageConfig {
    /// History storage described by this configuration.
    #[must_use]
    pub fn open(&self) -> HistoryStorage {
        if self.ephemeral {
            HistoryStorage::in_memory()
        } else {
            HistoryStorage::new(FileStore::new(&self.path))
        }
    }
}

impl AppConfig {
    /// Load from the process arguments.
    ///
    /// `--help`, `--version` and invalid flags are reported by clap, which
    /// exits the process.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_cli(Cli::parse())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(cli)
    }

    pub fn from_cli(cli: Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("service.base_url", "http://127.0.0.1:5000")?
            .set_default("service.timeout_secs", 30)?
            .set_default("exchange.reply_delay_ms", 0)?
            .set_default("storage.path", "curaai_chat_history.json")?
            .set_default("storage.ephemeral", false)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("cura").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("CURA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = cli.service_url {
            builder = builder.set_override("service.base_url", url)?;
        }
        if let Some(secs) = cli.timeout_secs {
            builder = builder.set_override("service.timeout_secs", secs)?;
        }
        if let Some(ms) = cli.reply_delay_ms {
            builder = builder.set_override("exchange.reply_delay_ms", ms)?;
        }
        if let Some(path) = cli.history_file {
            builder = builder.set_override("storage.path", path)?;
        }
        if cli.ephemeral {
            builder = builder.set_override("storage.ephemeral", true)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        if config.service.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "service.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(config)
    }
}
