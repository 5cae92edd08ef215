use super::{KeyValueStore, PersistenceError, PersistenceResult, ScheduleRecord};
use crate::Schedule;
use crate::display::format_adjusted_in;
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

pub fn save_schedule_to_json<P: AsRef<Path>>(
    schedule: &Schedule,
    path: P,
) -> PersistenceResult<()> {
    let record = ScheduleRecord::from_schedule(schedule);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &record)?;
    Ok(())
}

pub fn load_schedule_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Schedule> {
    let file = File::open(path)?;
    let record: ScheduleRecord = serde_json::from_reader(file)?;
    record.into_schedule()
}

/// Key-value store kept as a single JSON object on disk. The file is read on
/// every `get` and replaced on every `set`.
///
/// A file that does not hold a JSON object of strings makes `get` fail, but
/// `set` starts over from an empty object so the store can recover.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> PersistenceResult<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|err| {
            PersistenceError::InvalidData(format!(
                "store file {} is not a JSON object of strings: {err}",
                self.path.display()
            ))
        })
    }

    /// Sibling file the new contents are written to before being renamed
    /// over the store, so a crash mid-write leaves the old file intact.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> PersistenceResult<()> {
        let temp = self.temp_path();
        let written = File::create(&temp)
            .map_err(PersistenceError::from)
            .and_then(|mut file| {
                serde_json::to_writer_pretty(&mut file, values)?;
                file.sync_all()?;
                Ok(())
            })
            .and_then(|()| fs::rename(&temp, &self.path).map_err(PersistenceError::from));
        if written.is_err() {
            let _ = fs::remove_file(&temp);
        }
        written
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(PersistenceError::InvalidData(reason)) => {
                warn!(
                    path = %self.path.display(),
                    %reason,
                    "store file is unreadable, replacing it"
                );
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }
}

#[derive(Serialize)]
struct TimelineCsvRecord {
    position: usize,
    id: String,
    name: String,
    duration: String,
    parsed_duration: String,
    start_by: String,
    start_by_display: String,
    end_time: String,
}

/// Writes the computed chain, one row per item, with month steps and the
/// display column in local time. Every row repeats the schedule's end time.
pub fn export_timeline_csv<P: AsRef<Path>>(schedule: &Schedule, path: P) -> PersistenceResult<()> {
    export_timeline_csv_in(schedule, path, &Local)
}

/// Same as [`export_timeline_csv`], computing and displaying in `tz`.
pub fn export_timeline_csv_in<P, Tz>(
    schedule: &Schedule,
    path: P,
    tz: &Tz,
) -> PersistenceResult<()>
where
    P: AsRef<Path>,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let end_time = schedule.end_timestamp().to_rfc3339();
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (idx, entry) in schedule.timeline_in(tz).into_iter().enumerate() {
        writer.serialize(TimelineCsvRecord {
            position: idx + 1,
            id: entry.id.to_string(),
            name: entry.name,
            duration: entry.duration_text,
            parsed_duration: entry.duration.to_string(),
            start_by: entry.adjusted.to_rfc3339(),
            start_by_display: format_adjusted_in(entry.adjusted, tz),
            end_time: end_time.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
