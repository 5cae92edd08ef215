use super::PersistenceResult;
use crate::Schedule;
use crate::item::{Item, ItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub duration: String,
}

/// Stored form of a schedule. The anchor keeps its historical field name,
/// `startTime`, even though it marks the end of the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    #[serde(rename = "startTime")]
    pub anchor: DateTime<Utc>,
    pub items: Vec<ItemRecord>,
}

impl ScheduleRecord {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            anchor: schedule.end_timestamp(),
            items: schedule
                .items()
                .iter()
                .map(|item| ItemRecord {
                    id: item.id().clone(),
                    name: item.name.clone(),
                    duration: item.duration.clone(),
                })
                .collect(),
        }
    }

    pub fn into_schedule(self) -> PersistenceResult<Schedule> {
        let items = self
            .items
            .into_iter()
            .map(|record| Item::with_fields(record.id, record.name, record.duration))
            .collect::<Vec<_>>();
        super::validate_items(&items)?;
        Ok(Schedule::from_parts(self.anchor, items))
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Schedule {
    pub fn to_json(&self) -> PersistenceResult<String> {
        ScheduleRecord::from_schedule(self).to_json()
    }

    /// Rebuilds a schedule from its stored JSON form. Fails on malformed
    /// JSON or duplicate item ids; never touches any existing schedule.
    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        ScheduleRecord::from_json(json)?.into_schedule()
    }
}
