use crate::persistence::{JsonFileStore, KeyValueStore, MemoryStore, PersistenceResult};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "timebudget.toml";
pub const ENV_PREFIX: &str = "TIMEBUDGET_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub store_path: PathBuf,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Json,
            store_path: PathBuf::from("timebudget.json"),
            log_filter: "warn".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self(Box::new(value))
    }
}

impl Config {
    /// Defaults, then the TOML file, then `TIMEBUDGET_*` variables.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(path).extract()?)
    }

    pub fn open_store(&self) -> PersistenceResult<Box<dyn KeyValueStore>> {
        match self.store_backend {
            StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
            StoreBackend::Json => Ok(Box::new(JsonFileStore::new(&self.store_path))),
            #[cfg(feature = "sqlite")]
            StoreBackend::Sqlite => Ok(Box::new(crate::persistence::sqlite::SqliteStore::new(
                &self.store_path,
            )?)),
            #[cfg(not(feature = "sqlite"))]
            StoreBackend::Sqlite => Err(crate::persistence::PersistenceError::InvalidData(
                "sqlite backend requires the `sqlite` feature".into(),
            )),
        }
    }
}
