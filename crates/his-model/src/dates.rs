//! Conversion of legacy-era (民國) dates to ISO calendar dates.
//!
//! Dispensing exports write dates as `YYYMMDD` where `YYY` counts years since
//! 1911. Date-times append `HHMMSS` to the same seven digits.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Offset between the legacy era and the Gregorian calendar.
pub const ERA_OFFSET: i32 = 1911;

const ERA_DATE_LEN: usize = 7;
const ERA_DATETIME_LEN: usize = 13;

fn leading_digits(value: &str, len: usize) -> Option<&str> {
    let head = value.get(..len)?;
    head.bytes().all(|b| b.is_ascii_digit()).then_some(head)
}

fn era_naive_date(value: &str) -> Option<NaiveDate> {
    let digits = leading_digits(value.trim(), ERA_DATE_LEN)?;
    let year: i32 = digits[..3].parse().ok()?;
    let month: u32 = digits[3..5].parse().ok()?;
    let day: u32 = digits[5..7].parse().ok()?;
    NaiveDate::from_ymd_opt(year + ERA_OFFSET, month, day)
}

fn era_naive_time(value: &str) -> Option<NaiveTime> {
    let digits = leading_digits(value.trim(), ERA_DATETIME_LEN)?;
    let hour: u32 = digits[7..9].parse().ok()?;
    let minute: u32 = digits[9..11].parse().ok()?;
    let second: u32 = digits[11..13].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Converts the first seven characters of `value` from `YYYMMDD` to `YYYY-MM-DD`.
///
/// Returns an empty string when the input is shorter than seven characters or
/// does not describe a real calendar date.
///
/// # Example
///
/// ```
/// use his_model::convert_era_date;
///
/// assert_eq!(convert_era_date("1140315"), "2025-03-15");
/// assert_eq!(convert_era_date("abc"), "");
/// ```
pub fn convert_era_date(value: &str) -> String {
    era_naive_date(value)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parses a 13-character `YYYMMDDHHMMSS` value into a date-time.
pub fn convert_era_datetime(value: &str) -> Option<NaiveDateTime> {
    Some(era_naive_date(value)?.and_time(era_naive_time(value)?))
}

/// Splits a visit date-time into an ISO date and an `HH:MM:SS` time.
///
/// The time part is empty unless the value carries at least thirteen
/// characters.
pub fn split_era_datetime(value: &str) -> (String, String) {
    let date = convert_era_date(value);
    let time = era_naive_time(value)
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_default();
    (date, time)
}

/// Normalizes a date column from a delimited or fixed-width export.
///
/// Seven-digit era dates and eight-digit `YYYYMMDD` dates become ISO dates.
/// Anything else is returned trimmed and otherwise untouched.
pub fn normalize_date(value: &str) -> String {
    let value = value.trim();
    let all_digits = value.bytes().all(|b| b.is_ascii_digit());
    match value.len() {
        ERA_DATE_LEN if all_digits => convert_era_date(value),
        8 if all_digits => NaiveDate::parse_from_str(value, "%Y%m%d")
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| value.to_string()),
        _ => value.to_string(),
    }
}
