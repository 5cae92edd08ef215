use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use std::fmt::Display;

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// `Oct 9th, 5:30 pm`
pub fn format_adjusted_in<Tz>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = timestamp.with_timezone(tz);
    let day = local.day();
    format!(
        "{} {}{}, {}",
        local.format("%b"),
        day,
        ordinal_suffix(day),
        local.format("%-I:%M %P")
    )
}

/// `Sat Oct 9th, 5:30 pm`
pub fn format_anchor_in<Tz>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = timestamp.with_timezone(tz);
    format!("{} {}", local.format("%a"), format_adjusted_in(timestamp, tz))
}

pub fn format_adjusted(timestamp: DateTime<Utc>) -> String {
    format_adjusted_in(timestamp, &Local)
}

pub fn format_anchor(timestamp: DateTime<Utc>) -> String {
    format_anchor_in(timestamp, &Local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals() {
        let cases = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (31, "st"),
        ];
        for (day, suffix) in cases {
            assert_eq!(ordinal_suffix(day), suffix, "day {day}");
        }
    }

    #[test]
    fn formats_in_given_zone() {
        let ts = Utc.with_ymd_and_hms(2021, 10, 9, 17, 30, 0).unwrap();
        assert_eq!(format_adjusted_in(ts, &Utc), "Oct 9th, 5:30 pm");
        assert_eq!(format_anchor_in(ts, &Utc), "Sat Oct 9th, 5:30 pm");
    }

    #[test]
    fn midnight_is_twelve_am() {
        let ts = Utc.with_ymd_and_hms(2021, 1, 2, 0, 5, 0).unwrap();
        assert_eq!(format_adjusted_in(ts, &Utc), "Jan 2nd, 12:05 am");
    }
}
