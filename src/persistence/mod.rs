use crate::item::Item;
use serde_json::Error as SerdeJsonError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;

/// Key the whole schedule is stored under.
pub const SAVE_KEY: &str = "save";

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// String-keyed storage the session saves into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn validate_items(items: &[Item]) -> PersistenceResult<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate item id {}",
                item.id()
            )));
        }
    }
    Ok(())
}

pub mod file;
pub mod record;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonFileStore, export_timeline_csv, export_timeline_csv_in, load_schedule_from_json,
    save_schedule_to_json,
};
pub use record::{ItemRecord, ScheduleRecord};
