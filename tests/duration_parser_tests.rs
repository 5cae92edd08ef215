use time_budget::{DurationValue, parse_duration};

#[test]
fn hours_and_minutes() {
    assert_eq!(
        parse_duration("1 hour 3 minutes"),
        DurationValue {
            hours: Some(1),
            minutes: Some(3),
            ..Default::default()
        }
    );
}

#[test]
fn separators_and_filler_words_are_ignored() {
    assert_eq!(
        parse_duration("2 days, and 4 hrs"),
        DurationValue {
            days: Some(2),
            hours: Some(4),
            ..Default::default()
        }
    );
}

#[test]
fn empty_and_unrecognized_text_parse_to_nothing() {
    for text in ["", "soon", "two hours", "1.5", "-", "5hours", "3 Hours"] {
        assert!(parse_duration(text).is_empty(), "{text:?} should not match");
    }
}

#[test]
fn last_occurrence_of_a_unit_wins() {
    assert_eq!(
        parse_duration("1 year 1 yr"),
        DurationValue {
            years: Some(1),
            ..Default::default()
        }
    );
    assert_eq!(parse_duration("2 hours then 1 hr").hours, Some(1));
}

#[test]
fn synonyms_share_a_canonical_unit() {
    let expected = DurationValue {
        minutes: Some(5),
        ..Default::default()
    };
    assert_eq!(parse_duration("5 mins"), expected);
    assert_eq!(parse_duration("5 minute"), expected);
    assert_eq!(parse_duration("5 minutes"), expected);
    assert_eq!(parse_duration("5 min"), expected);

    assert_eq!(parse_duration("7 dys").days, Some(7));
    assert_eq!(parse_duration("7 sec").seconds, Some(7));
    assert_eq!(parse_duration("7 seconds").seconds, Some(7));
    assert_eq!(parse_duration("7 yrs").years, Some(7));
}

#[test]
fn every_unit_at_once() {
    let value = parse_duration("1 year, 2 months, 3 days, 4 hours, 5 minutes and 6 seconds");
    assert_eq!(value.years, Some(1));
    assert_eq!(value.months, Some(2));
    assert_eq!(value.days, Some(3));
    assert_eq!(value.hours, Some(4));
    assert_eq!(value.minutes, Some(5));
    assert_eq!(value.seconds, Some(6));
}

#[test]
fn whitespace_between_number_and_unit_may_repeat() {
    assert_eq!(parse_duration("10 \t  hours").hours, Some(10));
}

#[test]
fn parsing_is_repeatable() {
    let text = "45 min 2 hr";
    assert_eq!(parse_duration(text), parse_duration(text));
}
