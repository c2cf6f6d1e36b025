use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use chrono_tz::America::New_York;
use nltask_core::dates::resolve;
use proptest::prelude::*;
use rstest::rstest;

/// Friday 2024-03-01 10:30 UTC
fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

#[rstest]
#[case::tomorrow("Call mom tomorrow", at(2024, 3, 2, 10, 30))]
#[case::tomorrow_uppercase("TOMORROW: submit report", at(2024, 3, 2, 10, 30))]
#[case::keyword_beats_explicit_time("tomorrow at 5pm", at(2024, 3, 2, 10, 30))]
#[case::next_week("review goals next week", at(2024, 3, 8, 10, 30))]
#[case::next_month("pay rent next month", at(2024, 4, 1, 10, 30))]
#[case::tonight("dinner tonight", at(2024, 3, 1, 20, 0))]
#[case::valentines_apostrophe("buy valentine's day card", at(2025, 2, 14, 0, 0))]
#[case::valentines_plain("valentines day dinner", at(2025, 2, 14, 0, 0))]
fn test_keywords(#[case] text: &str, #[case] expected: DateTime<Utc>) {
    assert_eq!(resolve(text, &reference_now()), Some(expected));
}

#[rstest]
#[case::later_today("meeting at 3pm", at(2024, 3, 1, 15, 0))]
#[case::twenty_four_hour("standup 14:45", at(2024, 3, 1, 14, 45))]
#[case::split_meridiem("pick up kids at 3 pm", at(2024, 3, 1, 15, 0))]
#[case::noon("lunch at noon", at(2024, 3, 1, 12, 0))]
#[case::passed_time_moves_to_tomorrow("call the dentist at 9am", at(2024, 3, 2, 9, 0))]
#[case::midnight_moves_to_tomorrow("backup at midnight", at(2024, 3, 2, 0, 0))]
#[case::future_date_keeps_time_of_day("conference 2024-06-01", at(2024, 6, 1, 10, 30))]
#[case::future_date_with_time("conference 2024-06-01 at 9am", at(2024, 6, 1, 9, 0))]
#[case::passed_date_moves_to_next_year("renew passport 2024-01-15", at(2025, 1, 15, 10, 30))]
#[case::passed_date_with_time_moves_one_day("dentist 2024-01-15 9am", at(2024, 1, 16, 9, 0))]
fn test_fuzzy_expressions(#[case] text: &str, #[case] expected: DateTime<Utc>) {
    assert_eq!(resolve(text, &reference_now()), Some(expected));
}

#[rstest]
#[case::ordinal_day("dentist april 3rd", at(2024, 4, 3, 10, 30))]
#[case::ordinal_day_this_month("taxes march 15th", at(2024, 3, 15, 10, 30))]
#[case::plain_day("taxes march 15", at(2024, 3, 15, 10, 30))]
#[case::explicit_year("trip march 15, 2025", at(2025, 3, 15, 10, 30))]
#[case::day_before_month("call on the 3rd of april", at(2024, 4, 3, 10, 30))]
#[case::abbreviated_with_time("review sept 2nd at 9am", at(2024, 9, 2, 9, 0))]
#[case::passed_month_day_moves_to_next_year("renew license jan 10", at(2025, 1, 10, 10, 30))]
fn test_month_name_dates(#[case] text: &str, #[case] expected: DateTime<Utc>) {
    assert_eq!(resolve(text, &reference_now()), Some(expected));
}

#[rstest]
#[case::february_thirtieth("party feb 30")]
#[case::april_thirty_first("report due april 31st")]
#[case::invalid_day_with_time("party feb 30 at 8pm")]
fn test_impossible_month_day_is_none(#[case] text: &str) {
    assert_eq!(resolve(text, &reference_now()), None);
}

#[rstest]
#[case::gibberish("xyzzy plugh")]
#[case::empty("")]
#[case::whitespace("   ")]
#[case::bare_number("42")]
#[case::non_ascii("café über")]
#[case::plain_task("buy milk")]
fn test_no_date_found(#[case] text: &str) {
    assert_eq!(resolve(text, &reference_now()), None);
}

#[test]
fn test_valentines_day_before_and_after() {
    let after = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    assert_eq!(resolve("valentine's day", &after), Some(at(2025, 2, 14, 0, 0)));

    let before = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(resolve("valentine's day", &before), Some(at(2024, 2, 14, 0, 0)));

    let on_the_day = Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap();
    assert_eq!(resolve("valentines day", &on_the_day), Some(on_the_day));
}

#[test]
fn test_next_month_clamps_to_month_end() {
    let now = at(2024, 1, 31, 10, 0);
    assert_eq!(resolve("next month", &now), Some(at(2024, 2, 29, 10, 0)));
}

#[test]
fn test_tonight_ignores_current_time() {
    let late = at(2024, 3, 1, 23, 15);
    assert_eq!(resolve("tonight", &late), Some(at(2024, 3, 1, 20, 0)));

    let early = at(2024, 3, 1, 6, 0);
    assert_eq!(resolve("tonight", &early), Some(at(2024, 3, 1, 20, 0)));
}

#[test]
fn test_passed_date_rolls_forward_a_year_not_a_day() {
    let now = reference_now();
    let resolved = resolve("renew passport 2024-01-15", &now).unwrap();
    let original = at(2024, 1, 15, 10, 30);

    assert_eq!(resolved.year(), original.year() + 1);
    assert_eq!(resolved.month(), original.month());
    assert_eq!(resolved.day(), original.day());
    assert_eq!(resolved.time(), now.time());
}

#[test]
fn test_passed_time_rolls_forward_exactly_one_day() {
    let now = reference_now();
    let resolved = resolve("call the dentist at 9am", &now).unwrap();
    assert_eq!(resolved - at(2024, 3, 1, 9, 0), Duration::days(1));
}

#[test]
fn test_tomorrow_keeps_wall_clock_across_dst() {
    // Clocks in New York spring forward on 2024-03-10.
    let now = New_York.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
    let resolved = resolve("tomorrow", &now).unwrap();

    assert_eq!(resolved.day(), 10);
    assert_eq!(resolved.hour(), 12);
    assert_eq!(resolved - now, Duration::hours(23));
}

#[test]
fn test_nonexistent_local_time_is_none() {
    let now = New_York.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap();
    assert_eq!(resolve("at 2:30am", &now), None);
}

proptest! {
    #[test]
    fn prop_tomorrow_is_one_day_later(
        secs in 946_684_800i64..4_102_444_800i64,
        prefix in "[a-z ]{0,12}",
        suffix in "[a-z ]{0,12}",
    ) {
        let now = Utc.timestamp_opt(secs, 0).unwrap();
        let text = format!("{prefix}tomorrow{suffix}");
        prop_assert_eq!(resolve(&text, &now), Some(now + Duration::days(1)));
    }

    #[test]
    fn prop_tonight_is_eight_pm_today(secs in 946_684_800i64..4_102_444_800i64) {
        let now = Utc.timestamp_opt(secs, 0).unwrap();
        let resolved = resolve("tonight", &now).unwrap();
        prop_assert_eq!(resolved.date_naive(), now.date_naive());
        prop_assert_eq!((resolved.hour(), resolved.minute(), resolved.second()), (20, 0, 0));
    }
}
