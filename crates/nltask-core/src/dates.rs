//! Resolution of relative and fuzzy date expressions found in task text.
//!
//! [`resolve`] maps free text and a reference instant to an absolute
//! timestamp in the reference instant's zone, or `None` when the text names no
//! date. It never fails: anything it cannot understand is simply "no date".
//!
//! Keywords are checked first, in priority order:
//!
//! | keyword                              | result                                   |
//! |--------------------------------------|------------------------------------------|
//! | `tomorrow`                           | same time of day, one calendar day later |
//! | `next week`                          | same time of day, seven days later       |
//! | `next month`                         | one calendar month later (day clamped)   |
//! | `tonight`                            | today at 20:00                           |
//! | `valentine's day` / `valentines day` | next Feb 14 at midnight                  |
//!
//! Otherwise the text is scanned for a clock time and a calendar date, the
//! missing half is taken from `now`, and a result that lands in the past is
//! moved forward to its next plausible occurrence. A month name next to a day
//! ("april 3rd", "3 of april 2025") is read directly; a day the month does not
//! have ("feb 30") means no date at all.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use chrono_english::{parse_date_string, Dialect};
use std::ops::Range;

/// Hour of day that "tonight" refers to.
const TONIGHT_HOUR: u32 = 20;

/// Longest run of words handed to the date grammar in one attempt.
const MAX_DATE_WORDS: usize = 4;

/// Characters stripped from both ends of each word before matching.
const WORD_PUNCTUATION: &[char] = &[',', ';', '.', '!', '?', '(', ')', '"', '\''];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Tomorrow,
    NextWeek,
    NextMonth,
    Tonight,
    ValentinesDay,
}

impl Keyword {
    /// Ordered by priority; the first pattern contained in the text wins.
    const PATTERNS: [(&'static str, Keyword); 7] = [
        ("tomorrow", Keyword::Tomorrow),
        ("next week", Keyword::NextWeek),
        ("next month", Keyword::NextMonth),
        ("tonight", Keyword::Tonight),
        ("valentine's day", Keyword::ValentinesDay),
        ("valentine\u{2019}s day", Keyword::ValentinesDay),
        ("valentines day", Keyword::ValentinesDay),
    ];

    fn find(lowered: &str) -> Option<Self> {
        Self::PATTERNS
            .iter()
            .find(|(pattern, _)| lowered.contains(pattern))
            .map(|(_, keyword)| *keyword)
    }

    fn apply<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        match self {
            Keyword::Tomorrow => now.clone().checked_add_days(Days::new(1)),
            Keyword::NextWeek => now.clone().checked_add_days(Days::new(7)),
            Keyword::NextMonth => now.clone().checked_add_months(Months::new(1)),
            Keyword::Tonight => {
                let evening = NaiveTime::from_hms_opt(TONIGHT_HOUR, 0, 0)?;
                at_local(now, now.date_naive(), evening)
            }
            Keyword::ValentinesDay => {
                let this_year = at_local(
                    now,
                    NaiveDate::from_ymd_opt(now.year(), 2, 14)?,
                    NaiveTime::MIN,
                )?;
                if this_year < *now {
                    at_local(
                        now,
                        NaiveDate::from_ymd_opt(now.year() + 1, 2, 14)?,
                        NaiveTime::MIN,
                    )
                } else {
                    Some(this_year)
                }
            }
        }
    }
}

/// Resolve the date a piece of task text refers to, relative to `now`.
///
/// Matching is case-insensitive. Returns `None` when nothing date-like is
/// found, or when the resulting local time does not exist in `now`'s zone.
pub fn resolve<Tz>(text: &str, now: &DateTime<Tz>) -> Option<DateTime<Tz>>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    let lowered = text.to_lowercase();

    if let Some(keyword) = Keyword::find(&lowered) {
        return keyword.apply(now);
    }

    resolve_fuzzy(&lowered, now)
}

fn resolve_fuzzy<Tz>(lowered: &str, now: &DateTime<Tz>) -> Option<DateTime<Tz>>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    let words: Vec<&str> = lowered
        .split_whitespace()
        .map(|word| strip_ordinal(word.trim_matches(WORD_PUNCTUATION)))
        .filter(|word| !word.is_empty())
        .collect();

    let clock = find_clock_time(&words);
    let consumed = clock.as_ref().map(|(_, span)| span.clone());
    let date = match find_month_day(&words, consumed.as_ref(), now) {
        Some(MonthDay::Valid(date)) => Some(date),
        Some(MonthDay::Invalid) => return None,
        None => find_calendar_date(&words, consumed, now),
    };

    let time = clock.map(|(time, _)| time);
    if date.is_none() && time.is_none() {
        return None;
    }

    let candidate = at_local(
        now,
        date.unwrap_or_else(|| now.date_naive()),
        time.unwrap_or_else(|| now.time()),
    )?;

    if candidate >= *now {
        return Some(candidate);
    }

    if time.is_some() && candidate.time() != now.time() {
        // A time that already passed today means the same time tomorrow.
        candidate.checked_add_days(Days::new(1))
    } else {
        // A date that already passed this year means the same date next year.
        candidate.checked_add_months(Months::new(12))
    }
}

/// Find the first clock time in `words`, returning it with the word span it
/// occupies.
fn find_clock_time(words: &[&str]) -> Option<(NaiveTime, Range<usize>)> {
    for (index, word) in words.iter().enumerate() {
        if let Some(time) = parse_clock(word) {
            return Some((time, index..index + 1));
        }

        // "3 pm"
        if let Some(meridiem) = words.get(index + 1) {
            if matches!(*meridiem, "am" | "pm") {
                if let Some(time) = parse_clock(&format!("{word}{meridiem}")) {
                    return Some((time, index..index + 2));
                }
            }
        }
    }
    None
}

/// Parse a single word as a clock time: `noon`, `midnight`, `3pm`, `3:30pm`,
/// `15:45`.
fn parse_clock(word: &str) -> Option<NaiveTime> {
    match word {
        "noon" | "midday" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return Some(NaiveTime::MIN),
        _ => {}
    }

    let (digits, pm) = if let Some(rest) = word.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = word.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (word, None)
    };

    let (hour, minute) = match digits.split_once(':') {
        Some((hour, minute)) if minute.len() == 2 => (parse_number(hour)?, parse_number(minute)?),
        Some(_) => return None,
        // A bare number is only a time when it carries am/pm.
        None if pm.is_some() => (parse_number(digits)?, 0),
        None => return None,
    };

    match pm {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            let hour = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (hour, true) => hour + 12,
                (hour, false) => hour,
            };
            NaiveTime::from_hms_opt(hour, minute, 0)
        }
        None => NaiveTime::from_hms_opt(hour, minute, 0),
    }
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// "3rd" -> "3". Other words are returned unchanged.
fn strip_ordinal(word: &str) -> &str {
    ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| word.strip_suffix(*suffix))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(word)
}

fn month_number(word: &str) -> Option<u32> {
    let month = match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn day_number(word: &str) -> Option<u32> {
    parse_number(word).filter(|day| *day >= 1)
}

fn year_number(word: &str) -> Option<i32> {
    if word.len() != 4 || !word.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    word.parse().ok()
}

/// A month name paired with a day number.
#[derive(Debug, PartialEq)]
enum MonthDay {
    Valid(NaiveDate),
    /// The words name a day the calendar does not have, e.g. "feb 30".
    Invalid,
}

/// Find a month name next to a day number: "april 3", "march 15 2025",
/// "3 april", "3 of april 2025". The year defaults to `now`'s.
///
/// A bare month with no day is left to the date grammar.
fn find_month_day<Tz: TimeZone>(
    words: &[&str],
    consumed: Option<&Range<usize>>,
    now: &DateTime<Tz>,
) -> Option<MonthDay> {
    let free = |index: usize| consumed.map_or(true, |span| !span.contains(&index));
    let word_at = |index: usize| words.get(index).copied().filter(|_| free(index));

    for (index, word) in words.iter().enumerate() {
        if !free(index) {
            continue;
        }
        let Some(month) = month_number(word) else {
            continue;
        };

        let after = word_at(index + 1).and_then(day_number).map(|day| (day, index + 2));
        let before = || {
            let mut day_index = index.checked_sub(1)?;
            if word_at(day_index) == Some("of") {
                day_index = day_index.checked_sub(1)?;
            }
            word_at(day_index).and_then(day_number).map(|day| (day, index + 1))
        };

        let Some((day, year_index)) = after.or_else(before) else {
            continue;
        };
        let year = word_at(year_index)
            .and_then(year_number)
            .unwrap_or_else(|| now.year());

        return Some(match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => MonthDay::Valid(date),
            None => MonthDay::Invalid,
        });
    }
    None
}

/// Find the longest run of words the English date grammar accepts and return
/// the calendar date it names. Words belonging to the clock time are skipped.
fn find_calendar_date<Tz>(
    words: &[&str],
    consumed: Option<Range<usize>>,
    now: &DateTime<Tz>,
) -> Option<NaiveDate>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    let longest = MAX_DATE_WORDS.min(words.len());

    for len in (1..=longest).rev() {
        for start in 0..=words.len() - len {
            let span = start..start + len;
            if let Some(consumed) = &consumed {
                if span.start < consumed.end && consumed.start < span.end {
                    continue;
                }
            }

            let window = &words[span];
            if len == 1 && window[0].bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }

            let phrase = window.join(" ");
            // The date grammar only knows ASCII words.
            if !phrase.is_ascii() {
                continue;
            }

            if let Ok(parsed) = parse_date_string(&phrase, now.clone(), Dialect::Us) {
                return Some(parsed.date_naive());
            }
        }
    }
    None
}

fn at_local<Tz: TimeZone>(
    now: &DateTime<Tz>,
    date: NaiveDate,
    time: NaiveTime,
) -> Option<DateTime<Tz>> {
    now.timezone()
        .from_local_datetime(&date.and_time(time))
        .earliest()
}

/// Naive layouts accepted for timestamps that carry no offset.
const NAIVE_TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an absolute timestamp supplied by an external source.
///
/// Accepts RFC 3339, a naive date-time, or a bare `YYYY-MM-DD` date; naive
/// values are read as local time in `tz`. Durations, prose and anything
/// else yield `None`.
pub fn parse_timestamp<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }

    let naive = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.fixed_offset())
}
