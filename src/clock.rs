use chrono::{DateTime, Utc};

/// Source of "now" for new items and fresh schedules.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Calendar that month and year steps are counted on. Timestamps are always
/// stored as UTC; this only decides whose wall clock stays fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalendarZone {
    #[default]
    Utc,
    Local,
}
