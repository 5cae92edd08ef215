use crate::calculations::backward_pass::BackwardPass;
use crate::clock::Clock;
use crate::duration::DurationValue;
use crate::item::{Item, ItemId};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One row of the computed chain, in list order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub id: ItemId,
    pub name: String,
    pub duration_text: String,
    pub duration: DurationValue,
    pub adjusted: DateTime<Utc>,
}

/// An end time plus the ordered steps that have to happen before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    end: DateTime<Utc>,
    items: Vec<Item>,
}

impl Schedule {
    pub fn new(end: DateTime<Utc>) -> Self {
        Self {
            end,
            items: Vec::new(),
        }
    }

    /// Fresh schedule anchored at the clock's current time.
    pub fn starting_now(clock: &dyn Clock) -> Self {
        Self::new(clock.now())
    }

    pub(crate) fn from_parts(end: DateTime<Utc>, items: Vec<Item>) -> Self {
        Self { end, items }
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn set_end_timestamp(&mut self, end: DateTime<Utc>) {
        self.end = end;
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Appends an empty item and hands it back for editing.
    pub fn add_item(&mut self, clock: &dyn Clock) -> &mut Item {
        let mut id = ItemId::generate(clock);
        while self.position(&id).is_some() {
            id = ItemId::generate(clock);
        }
        let index = self.items.len();
        self.items.push(Item::new(id));
        &mut self.items[index]
    }

    /// Removes the item with `id`. Returns `false` when it was not in the list.
    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Takes the item out and reinserts it at `position`; positions past the
    /// end append.
    pub fn move_to(&mut self, id: &ItemId, position: usize) -> bool {
        let Some(current) = self.position(id) else {
            return false;
        };
        let item = self.items.remove(current);
        let target = position.min(self.items.len());
        self.items.insert(target, item);
        true
    }

    /// Shifts the item one slot toward the end of the list (index + 1).
    pub fn move_up(&mut self, id: &ItemId) -> bool {
        match self.position(id) {
            Some(current) => self.move_to(id, current + 1),
            None => false,
        }
    }

    /// Shifts the item one slot toward the start of the list (index - 1).
    ///
    /// The first item stays where it is: the target clamps at index 0. This
    /// differs from a negative splice index, which would wrap around and turn
    /// `[A, B, C]` into `[B, A, C]`.
    pub fn move_down(&mut self, id: &ItemId) -> bool {
        match self.position(id) {
            Some(current) => self.move_to(id, current.saturating_sub(1)),
            None => false,
        }
    }

    pub fn set_item_name(&mut self, id: &ItemId, name: impl Into<String>) -> bool {
        match self.item_mut(id) {
            Some(item) => {
                item.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_item_duration(&mut self, id: &ItemId, duration: impl Into<String>) -> bool {
        match self.item_mut(id) {
            Some(item) => {
                item.duration = duration.into();
                true
            }
            None => false,
        }
    }

    /// Item id to the time that item has to start by. Recomputed on every call.
    pub fn adjusted_timestamps(&self) -> HashMap<ItemId, DateTime<Utc>> {
        self.adjusted_timestamps_in(&Utc)
    }

    /// Same as [`Schedule::adjusted_timestamps`], with month and year steps
    /// counted on the calendar of `tz`.
    pub fn adjusted_timestamps_in<Tz: TimeZone>(
        &self,
        tz: &Tz,
    ) -> HashMap<ItemId, DateTime<Utc>> {
        BackwardPass::in_zone(&self.items, tz.clone()).execute(self.end)
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.timeline_in(&Utc)
    }

    pub fn timeline_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<TimelineEntry> {
        self.items
            .iter()
            .zip(BackwardPass::in_zone(&self.items, tz.clone()).steps(self.end))
            .map(|(item, adjusted)| TimelineEntry {
                id: item.id().clone(),
                name: item.name.clone(),
                duration_text: item.duration.clone(),
                duration: item.parsed_duration(),
                adjusted,
            })
            .collect()
    }

    /// When the first step of the chain has to begin: the last item's
    /// adjusted time, or the end time itself for an empty list.
    pub fn earliest_start(&self) -> DateTime<Utc> {
        self.earliest_start_in(&Utc)
    }

    pub fn earliest_start_in<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        BackwardPass::in_zone(&self.items, tz.clone())
            .steps(self.end)
            .last()
            .copied()
            .unwrap_or(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::clock::test_zone::CentralEurope2025;
    use chrono::Duration;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 4, 1, 18, 0, 0).unwrap())
    }

    fn ids(schedule: &Schedule) -> Vec<ItemId> {
        schedule.items().iter().map(|i| i.id().clone()).collect()
    }

    #[test]
    fn add_item_appends_empty_item_with_unique_id() {
        let clock = clock();
        let mut s = Schedule::starting_now(&clock);
        for _ in 0..50 {
            s.add_item(&clock);
        }
        let mut seen = ids(&s);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 50);
        assert!(s.items().iter().all(|i| i.name.is_empty() && i.duration.is_empty()));
    }

    #[test]
    fn move_to_past_end_appends() {
        let clock = clock();
        let mut s = Schedule::starting_now(&clock);
        let a = s.add_item(&clock).id().clone();
        let b = s.add_item(&clock).id().clone();
        assert!(s.move_to(&a, 10));
        assert_eq!(ids(&s), vec![b, a]);
    }

    #[test]
    fn move_down_at_start_stays_put() {
        let clock = clock();
        let mut s = Schedule::starting_now(&clock);
        let a = s.add_item(&clock).id().clone();
        let b = s.add_item(&clock).id().clone();
        let c = s.add_item(&clock).id().clone();
        assert!(s.move_down(&a));
        assert_eq!(ids(&s), vec![a, b, c]);
    }

    #[test]
    fn setters_report_lookup_misses() {
        let clock = clock();
        let mut s = Schedule::starting_now(&clock);
        let missing = ItemId::new("missing");
        assert!(!s.set_item_name(&missing, "x"));
        assert!(!s.set_item_duration(&missing, "1 hr"));
        assert!(!s.move_up(&missing));
        assert!(!s.remove_item(&missing));
    }

    #[test]
    fn earliest_start_is_last_adjusted_time() {
        let clock = clock();
        let mut s = Schedule::starting_now(&clock);
        assert_eq!(s.earliest_start(), clock.0);
        let a = s.add_item(&clock).id().clone();
        s.set_item_duration(&a, "2 hours");
        let b = s.add_item(&clock).id().clone();
        s.set_item_duration(&b, "30 min");
        assert_eq!(s.earliest_start(), clock.0 - Duration::minutes(150));
    }

    #[test]
    fn timeline_matches_adjusted_map() {
        let clock = clock();
        let mut s = Schedule::starting_now(&clock);
        let a = s.add_item(&clock).id().clone();
        s.set_item_name(&a, "Travel");
        s.set_item_duration(&a, "45 minutes");
        let map = s.adjusted_timestamps();
        let timeline = s.timeline();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].name, "Travel");
        assert_eq!(timeline[0].duration.minutes, Some(45));
        assert_eq!(Some(&timeline[0].adjusted), map.get(&a));
    }

    #[test]
    fn month_durations_keep_local_time_across_a_dst_change() {
        let zone = CentralEurope2025;
        let end = zone
            .with_ymd_and_hms(2025, 4, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let clock = FixedClock(end);
        let mut s = Schedule::starting_now(&clock);
        let a = s.add_item(&clock).id().clone();
        s.set_item_duration(&a, "1 month");

        let start = s.earliest_start_in(&zone);
        let local = start.with_timezone(&zone).format("%m-%d %H:%M").to_string();
        assert_eq!(local, "03-15 12:00");
        assert_eq!(s.timeline_in(&zone)[0].adjusted, start);
        assert_eq!(s.adjusted_timestamps_in(&zone).get(&a), Some(&start));
        // On the UTC calendar the same step lands at 11:00 local.
        assert_eq!(start - s.earliest_start(), Duration::hours(1));
    }
}
