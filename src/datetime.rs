use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Start hour used when a fight has no usable time; main cards air in the evening
pub const DEFAULT_START_HOUR: u32 = 20;

/// Calendar entries are a fixed length since no source gives an end time
pub const EVENT_DURATION_HOURS: i64 = 4;

/// A year-less date this far in the past is taken to mean next year
const PAST_ROLLOVER_DAYS: i64 = 60;

static RE_DAY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s*").unwrap()
});

static RE_MERIDIEM_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<meridiem>AM|PM)").unwrap()
});

static RE_GMT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*GMT").unwrap()
});

const DATE_FORMATS: &[&str] = &["%b %d %Y", "%B %d %Y", "%b %d, %Y", "%B %d, %Y", "%Y-%m-%d"];
const YEARLESS_FORMATS: &[&str] = &["%b %d %Y", "%B %d %Y"];
const LEAP_REFERENCE_YEAR: i32 = 2000;

// ============================================================================
// DATE PARSING
// ============================================================================

/// Parses a scraped date such as "Sat, Nov 22 2025". Dates without a year
/// ("Nov 22") are placed in the current year, or the next one when that would
/// land well in the past. Returns `None` for "TBD" and anything unrecognised.
pub fn parse_event_date(date_raw: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let clean = RE_DAY_NAME.replace(date_raw.trim(), "");
    let clean = clean.split_whitespace().collect::<Vec<_>>().join(" ");

    if clean.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&clean, fmt) {
            return Some(date);
        }
    }

    parse_yearless_date(&clean, now)
}

fn parse_yearless_date(clean: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let today = now.date_naive();

    // Parse against a leap year so "Feb 29" survives until a real year is picked
    let with_year = format!("{} {}", clean, LEAP_REFERENCE_YEAR);
    let reference = YEARLESS_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&with_year, fmt).ok())?;

    let date = place_in_year(reference, today.year());
    if date < today - Duration::days(PAST_ROLLOVER_DAYS) {
        return Some(place_in_year(reference, today.year() + 1));
    }
    Some(date)
}

/// Moves a month/day into `year`, clamping Feb 29 to Feb 28 outside leap years.
fn place_in_year(date: NaiveDate, year: i32) -> NaiveDate {
    date.with_year(year).unwrap_or_else(|| {
        warn!("{} does not exist in {}, using Feb 28", date.format("%b %d"), year);
        NaiveDate::from_ymd_opt(year, 2, 28).unwrap_or(date)
    })
}

// ============================================================================
// TIME PARSING
// ============================================================================

/// Converts "8:00 PM" or "19:00 GMT" to a clock time, defaulting to 20:00.
pub fn parse_start_time(time: &str) -> NaiveTime {
    parse_clock(time).unwrap_or_else(default_start_time)
}

fn parse_clock(time: &str) -> Option<NaiveTime> {
    if let Some(caps) = RE_MERIDIEM_TIME.captures(time) {
        let hour: u32 = caps["hour"].parse().ok()?;
        let minute: u32 = caps["minute"].parse().ok()?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let is_pm = caps["meridiem"].eq_ignore_ascii_case("PM");
        let hour = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some(caps) = RE_GMT_TIME.captures(time) {
        let hour: u32 = caps["hour"].parse().ok()?;
        let minute: u32 = caps["minute"].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    None
}

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0).unwrap_or_default()
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// Builds the UTC start timestamp for a card. An unparseable date falls back
/// to the day of `now`, which is wrong but visible in the calendar.
pub fn normalize_start(date_raw: &str, time: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let date = parse_event_date(date_raw, now).unwrap_or_else(|| {
        warn!("Could not parse date {:?}, using today's date", date_raw);
        now.date_naive()
    });
    date.and_time(parse_start_time(time)).and_utc()
}

/// Start and end of a card's calendar entry.
pub fn event_window(date_raw: &str, time: &str, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = normalize_start(date_raw, time, now);
    (start, start + Duration::hours(EVENT_DURATION_HOURS))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, 9, 30, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_short_form_date() {
        assert_eq!(parse_event_date("Sat, Nov 22 2025", now()), Some(ymd(2025, 11, 22)));
        assert_eq!(parse_event_date("Fri, Jan 3 2026", now()), Some(ymd(2026, 1, 3)));
        assert_eq!(parse_event_date("Saturday, November 22, 2025", now()), Some(ymd(2025, 11, 22)));
    }

    #[test]
    fn test_parse_yearless_date_rolls_forward() {
        assert_eq!(parse_event_date("Nov 22", now()), Some(ymd(2025, 11, 22)));
        assert_eq!(parse_event_date("January 10", now()), Some(ymd(2026, 1, 10)));
        // Within the rollover window it stays in the current year
        assert_eq!(parse_event_date("Oct 1", now()), Some(ymd(2025, 10, 1)));
    }

    #[test]
    fn test_yearless_leap_day_outside_leap_years() {
        // Rolled from leap 2024 into 2025
        let june_2024 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_event_date("Feb 29", june_2024), Some(ymd(2025, 2, 28)));

        // Current year is not a leap year
        let jan_2025 = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(parse_event_date("Sat, Feb 29", jan_2025), Some(ymd(2025, 2, 28)));

        // Leap year, no rollover needed
        let jan_2028 = Utc.with_ymd_and_hms(2028, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(parse_event_date("February 29", jan_2028), Some(ymd(2028, 2, 29)));
    }

    #[test]
    fn test_unparseable_dates() {
        assert_eq!(parse_event_date("TBD", now()), None);
        assert_eq!(parse_event_date("", now()), None);
        assert_eq!(parse_event_date("Sat, Feb 30 2025", now()), None);
    }

    #[test]
    fn test_meridiem_conversion() {
        assert_eq!(parse_start_time("8:00 PM"), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(parse_start_time("12:00 PM"), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(parse_start_time("12:15 AM"), NaiveTime::from_hms_opt(0, 15, 0).unwrap());
        assert_eq!(parse_start_time("9:45 am"), NaiveTime::from_hms_opt(9, 45, 0).unwrap());
    }

    #[test]
    fn test_gmt_time_taken_as_is() {
        assert_eq!(parse_start_time("19:00 GMT"), NaiveTime::from_hms_opt(19, 0, 0).unwrap());
    }

    #[test]
    fn test_default_start_time() {
        assert_eq!(parse_start_time(""), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(parse_start_time("13:00 PM"), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(parse_start_time("25:00 GMT"), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
    }

    #[test]
    fn test_window_for_known_date() {
        let (start, end) = event_window("Sat, Nov 22 2025", "8:00 PM", now());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 11, 22, 20, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 11, 23, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_tbd_falls_back_to_today_at_eight() {
        let (start, end) = event_window("TBD", "", now());
        assert_eq!(start.date_naive(), now().date_naive());
        assert_eq!((start.hour(), start.minute()), (20, 0));
        assert_eq!(end - start, Duration::hours(4));
    }
}
