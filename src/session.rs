use crate::clock::{CalendarZone, Clock};
use crate::item::ItemId;
use crate::persistence::{KeyValueStore, SAVE_KEY};
use crate::schedule::{Schedule, TimelineEntry};
use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

pub type Observer = Box<dyn FnMut(&Schedule)>;

/// Reads the saved schedule out of `store`, falling back to a fresh one
/// anchored at the current time when nothing usable is stored.
pub fn load_schedule<S: KeyValueStore + ?Sized>(store: &S, clock: &dyn Clock) -> Schedule {
    match store.get(SAVE_KEY) {
        Ok(Some(json)) => match Schedule::from_json(&json) {
            Ok(schedule) => {
                debug!(items = schedule.len(), "loaded saved schedule");
                schedule
            }
            Err(err) => {
                warn!(error = %err, "saved schedule is unreadable, starting fresh");
                Schedule::starting_now(clock)
            }
        },
        Ok(None) => {
            debug!("no saved schedule, starting fresh");
            Schedule::starting_now(clock)
        }
        Err(err) => {
            warn!(error = %err, "could not read saved schedule, starting fresh");
            Schedule::starting_now(clock)
        }
    }
}

/// Owns the one live schedule. Every change goes through here so observers
/// hear about it and the store is rewritten right after.
pub struct PlannerSession<S: KeyValueStore> {
    schedule: Schedule,
    store: S,
    clock: Box<dyn Clock>,
    zone: CalendarZone,
    observers: Vec<Observer>,
}

impl<S: KeyValueStore> PlannerSession<S> {
    pub fn open(store: S, clock: impl Clock + 'static) -> Self {
        let schedule = load_schedule(&store, &clock);
        Self {
            schedule,
            store,
            clock: Box::new(clock),
            zone: CalendarZone::default(),
            observers: Vec::new(),
        }
    }

    /// Sets the calendar month and year steps are counted on when the chain
    /// is computed. Storage stays in UTC either way.
    pub fn with_zone(mut self, zone: CalendarZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Schedule) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn adjusted_timestamps(&self) -> HashMap<ItemId, DateTime<Utc>> {
        match self.zone {
            CalendarZone::Utc => self.schedule.adjusted_timestamps_in(&Utc),
            CalendarZone::Local => self.schedule.adjusted_timestamps_in(&Local),
        }
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        match self.zone {
            CalendarZone::Utc => self.schedule.timeline_in(&Utc),
            CalendarZone::Local => self.schedule.timeline_in(&Local),
        }
    }

    pub fn earliest_start(&self) -> DateTime<Utc> {
        match self.zone {
            CalendarZone::Utc => self.schedule.earliest_start_in(&Utc),
            CalendarZone::Local => self.schedule.earliest_start_in(&Local),
        }
    }

    pub fn set_end_timestamp(&mut self, end: DateTime<Utc>) {
        self.schedule.set_end_timestamp(end);
        self.changed();
    }

    pub fn add_item(&mut self) -> ItemId {
        let id = self.schedule.add_item(self.clock.as_ref()).id().clone();
        self.changed();
        id
    }

    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        let found = self.schedule.remove_item(id);
        self.changed_if(found)
    }

    pub fn move_up(&mut self, id: &ItemId) -> bool {
        let found = self.schedule.move_up(id);
        self.changed_if(found)
    }

    pub fn move_down(&mut self, id: &ItemId) -> bool {
        let found = self.schedule.move_down(id);
        self.changed_if(found)
    }

    pub fn move_to(&mut self, id: &ItemId, position: usize) -> bool {
        let found = self.schedule.move_to(id, position);
        self.changed_if(found)
    }

    pub fn set_item_name(&mut self, id: &ItemId, name: impl Into<String>) -> bool {
        let found = self.schedule.set_item_name(id, name);
        self.changed_if(found)
    }

    pub fn set_item_duration(&mut self, id: &ItemId, duration: impl Into<String>) -> bool {
        let found = self.schedule.set_item_duration(id, duration);
        self.changed_if(found)
    }

    /// Swaps in a whole schedule, e.g. one imported from a file.
    pub fn replace_schedule(&mut self, schedule: Schedule) {
        self.schedule = schedule;
        self.changed();
    }

    /// Writes the current schedule under the save key. Failures are logged
    /// and dropped.
    pub fn persist(&mut self) {
        let json = match self.schedule.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "could not serialize schedule");
                return;
            }
        };
        match self.store.set(SAVE_KEY, &json) {
            Ok(()) => debug!(items = self.schedule.len(), "schedule saved"),
            Err(err) => warn!(error = %err, "could not save schedule"),
        }
    }

    fn changed_if(&mut self, changed: bool) -> bool {
        if changed {
            self.changed();
        }
        changed
    }

    fn changed(&mut self) {
        for observer in self.observers.iter_mut() {
            observer(&self.schedule);
        }
        self.persist();
    }
}
