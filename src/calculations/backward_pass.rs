use crate::item::{Item, ItemId};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

/// Walks the item list from the anchor, taking each item's duration off the
/// running cursor. Item 0 sits closest to the anchor. Month and year steps are
/// counted on the calendar of `tz`.
pub struct BackwardPass<'a, Tz: TimeZone = Utc> {
    items: &'a [Item],
    tz: Tz,
}

impl<'a> BackwardPass<'a> {
    pub fn new(items: &'a [Item]) -> Self {
        Self { items, tz: Utc }
    }
}

impl<'a, Tz: TimeZone> BackwardPass<'a, Tz> {
    pub fn in_zone(items: &'a [Item], tz: Tz) -> Self {
        Self { items, tz }
    }

    /// Adjusted timestamp of every item, in list order.
    pub fn steps(&self, anchor: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut cursor = anchor;
        let mut steps = Vec::with_capacity(self.items.len());
        for item in self.items {
            let duration = item.parsed_duration();
            cursor = match duration.subtract_from_in(cursor, &self.tz) {
                Some(adjusted) => adjusted,
                None => {
                    tracing::warn!(
                        item = %item.id(),
                        duration = %item.duration,
                        "duration moves the time out of range, leaving it unchanged"
                    );
                    cursor
                }
            };
            steps.push(cursor);
        }
        steps
    }

    pub fn execute(&self, anchor: DateTime<Utc>) -> HashMap<ItemId, DateTime<Utc>> {
        self.items
            .iter()
            .zip(self.steps(anchor))
            .map(|(item, adjusted)| (item.id().clone(), adjusted))
            .collect()
    }
}
