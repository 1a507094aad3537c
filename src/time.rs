use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::ChartError;
use crate::JulianDay;

/// Parses an IANA zone identifier as produced by the location resolver.
pub fn parse_zone(id: &str) -> Result<Tz, ChartError> {
    id.parse::<Tz>()
        .map_err(|_| ChartError::TimezoneNotFound(format!("zone id {:?}", id)))
}

/// Converts a local civil birth moment into a Julian Day number.
///
/// The date and time are combined, attached to the zone using chrono-tz's
/// default disambiguation (the earlier of two ambiguous mappings), converted
/// to UTC, and folded into a continuous day count. Deterministic: identical
/// inputs always produce identical output.
pub fn julian_day(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<JulianDay, ChartError> {
    let local = date.and_time(time);
    let zoned = tz
        .from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| ChartError::TimezoneNotFound(format!("zone {}", tz.name())))?;
    Ok(julian_day_utc(&zoned.with_timezone(&Utc)))
}

/// Julian Day for a UTC instant, proleptic Gregorian calendar.
pub fn julian_day_utc(utc: &DateTime<Utc>) -> JulianDay {
    let day = utc.day() as f64
        + utc.hour() as f64 / 24.0
        + utc.minute() as f64 / 1440.0
        + (utc.second() as f64 + utc.nanosecond() as f64 * 1e-9) / 86_400.0;
    calendar_to_jd(utc.year(), utc.month(), day)
}

// Meeus' formula with the Gregorian correction applied unconditionally,
// which makes the calendar proleptic.
fn calendar_to_jd(year: i32, month: u32, day: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y as f64 + 4716.0)).floor() + (30.6001 * (m + 1) as f64).floor() + day + b - 1524.5
}
