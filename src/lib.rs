pub mod calculations;
pub mod clock;
pub mod config;
pub mod display;
pub mod duration;
pub mod item;
pub mod persistence;
pub mod schedule;
pub mod session;

pub use clock::{CalendarZone, Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError, StoreBackend};
pub use duration::{DurationUnit, DurationValue, parse as parse_duration};
pub use item::{Item, ItemId};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    JsonFileStore, KeyValueStore, MemoryStore, PersistenceError, PersistenceResult,
    SAVE_KEY, ScheduleRecord, export_timeline_csv, export_timeline_csv_in,
    load_schedule_from_json, save_schedule_to_json,
};
pub use schedule::{Schedule, TimelineEntry};
pub use session::{PlannerSession, load_schedule};
