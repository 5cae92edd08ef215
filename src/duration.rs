use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// Longer words come first so `minute` is not swallowed by `min`.
static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s+(year|yr|month|mon|day|dy|hour|hr|minute|min|second|sec)s?")
        .expect("valid duration regex")
});

/// Canonical time unit a duration word maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl DurationUnit {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "year" | "yr" => Some(Self::Years),
            "month" | "mon" => Some(Self::Months),
            "day" | "dy" => Some(Self::Days),
            "hour" | "hr" => Some(Self::Hours),
            "minute" | "min" => Some(Self::Minutes),
            "second" | "sec" => Some(Self::Seconds),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Years => "years",
            Self::Months => "months",
            Self::Days => "days",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
        }
    }

    fn singular(&self) -> &'static str {
        match self {
            Self::Years => "year",
            Self::Months => "month",
            Self::Days => "day",
            Self::Hours => "hour",
            Self::Minutes => "minute",
            Self::Seconds => "second",
        }
    }
}

/// A partial set of unit counts read out of free text.
///
/// Units that never appeared stay `None`, so an empty value means "no
/// duration" rather than "zero of everything".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
}

impl DurationValue {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn get(&self, unit: DurationUnit) -> Option<u32> {
        match unit {
            DurationUnit::Years => self.years,
            DurationUnit::Months => self.months,
            DurationUnit::Days => self.days,
            DurationUnit::Hours => self.hours,
            DurationUnit::Minutes => self.minutes,
            DurationUnit::Seconds => self.seconds,
        }
    }

    /// Overwrites the count for `unit`; a repeated unit keeps the last amount.
    pub fn set(&mut self, unit: DurationUnit, amount: u32) {
        let slot = match unit {
            DurationUnit::Years => &mut self.years,
            DurationUnit::Months => &mut self.months,
            DurationUnit::Days => &mut self.days,
            DurationUnit::Hours => &mut self.hours,
            DurationUnit::Minutes => &mut self.minutes,
            DurationUnit::Seconds => &mut self.seconds,
        };
        *slot = Some(amount);
    }

    /// Units present in this value, largest first.
    pub fn units(&self) -> impl Iterator<Item = (DurationUnit, u32)> + '_ {
        [
            DurationUnit::Years,
            DurationUnit::Months,
            DurationUnit::Days,
            DurationUnit::Hours,
            DurationUnit::Minutes,
            DurationUnit::Seconds,
        ]
        .into_iter()
        .filter_map(|unit| self.get(unit).map(|amount| (unit, amount)))
    }

    /// Subtracts this duration from `from` on the UTC calendar.
    pub fn subtract_from(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.subtract_from_in(from, &Utc)
    }

    /// Subtracts this duration from `from`, counting years and months on the
    /// wall clock of `tz`.
    ///
    /// Years and months are removed first as calendar months, clamping to the
    /// end of shorter months and keeping the local clock time across offset
    /// changes. A result that lands in a skipped local hour moves forward by
    /// an hour. Days, hours, minutes and seconds are then taken off as exact
    /// durations. Returns `None` when the result would fall outside the
    /// representable range.
    pub fn subtract_from_in<Tz: TimeZone>(
        &self,
        from: DateTime<Utc>,
        tz: &Tz,
    ) -> Option<DateTime<Utc>> {
        let total_months = u32::checked_add(
            self.years.unwrap_or(0).checked_mul(12)?,
            self.months.unwrap_or(0),
        )?;
        let mut result = if total_months > 0 {
            let local = from
                .with_timezone(tz)
                .naive_local()
                .checked_sub_months(Months::new(total_months))?;
            tz.from_local_datetime(&local)
                .earliest()
                .or_else(|| {
                    let shifted = local.checked_add_signed(Duration::hours(1))?;
                    tz.from_local_datetime(&shifted).earliest()
                })?
                .with_timezone(&Utc)
        } else {
            from
        };

        let exact = Duration::try_days(i64::from(self.days.unwrap_or(0)))?
            .checked_add(&Duration::try_hours(i64::from(self.hours.unwrap_or(0)))?)?
            .checked_add(&Duration::try_minutes(i64::from(self.minutes.unwrap_or(0)))?)?
            .checked_add(&Duration::try_seconds(i64::from(self.seconds.unwrap_or(0)))?)?;
        if !exact.is_zero() {
            result = result.checked_sub_signed(exact)?;
        }
        Some(result)
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no duration");
        }
        let parts = self
            .units()
            .map(|(unit, amount)| {
                if amount == 1 {
                    format!("{amount} {}", unit.singular())
                } else {
                    format!("{amount} {}", unit.as_str())
                }
            })
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join(" "))
    }
}

/// Reads every `<number> <unit>` pair out of `text`.
///
/// Anything between pairs is ignored, unknown words never match and the
/// function never fails: text without a recognizable pair yields an empty
/// value.
pub fn parse(text: &str) -> DurationValue {
    let mut value = DurationValue::default();
    for caps in DURATION_PATTERN.captures_iter(text) {
        let Ok(amount) = caps[1].parse::<u32>() else {
            continue;
        };
        if let Some(unit) = DurationUnit::from_word(&caps[2]) {
            value.set(unit, amount);
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_zone::CentralEurope2025;
    use chrono::{NaiveDate, NaiveDateTime};

    fn zone_naive(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        zone_naive_min(y, m, d, h, 0)
    }

    fn zone_naive_min(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parses_hours_and_minutes() {
        let value = parse("1 hour 3 minutes");
        assert_eq!(value.hours, Some(1));
        assert_eq!(value.minutes, Some(3));
        assert_eq!(value.days, None);
    }

    #[test]
    fn ignores_separators_between_pairs() {
        let value = parse("2 days, and 4 hrs");
        assert_eq!(
            value,
            DurationValue {
                days: Some(2),
                hours: Some(4),
                ..Default::default()
            }
        );
    }

    #[test]
    fn repeated_unit_keeps_last_amount() {
        assert_eq!(parse("1 year 1 yr").years, Some(1));
        assert_eq!(parse("1 hour 5 hours").hours, Some(5));
    }

    #[test]
    fn month_and_mon_are_the_same_unit() {
        assert_eq!(parse("3 months").months, Some(3));
        assert_eq!(parse("3 mon").months, Some(3));
        assert_eq!(parse("3 mons").months, Some(3));
    }

    #[test]
    fn oversized_amounts_are_skipped() {
        let value = parse("99999999999 seconds 2 min");
        assert_eq!(value.seconds, None);
        assert_eq!(value.minutes, Some(2));
    }

    #[test]
    fn display_lists_units_largest_first() {
        assert_eq!(parse("3 minutes 1 hour").to_string(), "1 hour 3 minutes");
        assert_eq!(parse("").to_string(), "no duration");
    }

    #[test]
    fn subtract_clamps_to_month_end() {
        let value = parse("1 month");
        assert_eq!(value.subtract_from(at(2025, 3, 31, 9, 0)), Some(at(2025, 2, 28, 9, 0)));
    }

    #[test]
    fn subtract_applies_calendar_then_exact_units() {
        let value = parse("1 year 2 days 3 hours");
        assert_eq!(value.subtract_from(at(2024, 3, 3, 12, 0)), Some(at(2023, 3, 1, 9, 0)));
    }

    #[test]
    fn month_step_keeps_local_clock_time_across_dst() {
        let zone = CentralEurope2025;
        let end = zone
            .with_ymd_and_hms(2025, 4, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let start = parse("1 month").subtract_from_in(end, &zone).unwrap();
        let local = start.with_timezone(&zone);
        assert_eq!(local.naive_local(), zone_naive(2025, 3, 15, 12));
        assert_eq!(start, at(2025, 3, 15, 11, 0));
    }

    #[test]
    fn exact_units_ignore_the_zone() {
        let zone = CentralEurope2025;
        let end = at(2025, 3, 30, 12, 0);
        let start = parse("1 day").subtract_from_in(end, &zone).unwrap();
        assert_eq!(end - start, Duration::hours(24));
    }

    #[test]
    fn month_step_into_skipped_hour_moves_forward() {
        let zone = CentralEurope2025;
        // 2025-04-30 02:30 local is summer time; a month earlier is inside the gap.
        let end = zone
            .with_ymd_and_hms(2025, 4, 30, 2, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let start = parse("1 month").subtract_from_in(end, &zone).unwrap();
        assert_eq!(
            start.with_timezone(&zone).naive_local(),
            zone_naive_min(2025, 3, 30, 3, 30)
        );
    }

    #[test]
    fn empty_value_is_identity() {
        let t = at(2025, 6, 1, 8, 30);
        assert_eq!(DurationValue::default().subtract_from(t), Some(t));
    }

    #[test]
    fn out_of_range_subtraction_returns_none() {
        let value = parse("4000000000 years");
        assert_eq!(value.years, Some(4_000_000_000));
        assert_eq!(value.subtract_from(at(2025, 1, 1, 0, 0)), None);
    }
}
