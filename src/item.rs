use crate::clock::Clock;
use crate::duration::{self, DurationValue};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const ID_SALT_MAX: u32 = 10_000;

/// Opaque identifier of an item. Stable for the item's whole life and only
/// ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `<epoch millis>-<random 0..=10000>`.
    pub fn generate(clock: &dyn Clock) -> Self {
        let salt = rand::rng().random_range(0..=ID_SALT_MAX);
        Self(format!("{}-{}", clock.now().timestamp_millis(), salt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    pub name: String,
    pub duration: String,
}

impl Item {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            name: String::new(),
            duration: String::new(),
        }
    }

    pub fn with_fields(id: ItemId, name: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            duration: duration.into(),
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Parses the duration text afresh on every call.
    pub fn parsed_duration(&self) -> DurationValue {
        duration::parse(&self.duration)
    }
}
