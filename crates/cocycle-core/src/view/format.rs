use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

/// Countdown to a ride's start: "Starts in 3 days", "Starts in 1 hour".
///
/// `None` once the start time has passed. Whole days at 24h and above,
/// whole hours from 1h, whole minutes below that.
pub fn format_countdown(start: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let delta = start - now;
    if delta <= chrono::Duration::zero() {
        return None;
    }

    let (amount, unit) = if delta.num_days() > 0 {
        (delta.num_days(), "day")
    } else if delta.num_hours() > 0 {
        (delta.num_hours(), "hour")
    } else {
        (delta.num_minutes(), "minute")
    };

    Some(format!("Starts in {} {}{}", amount, unit, plural(amount)))
}

fn plural(amount: i64) -> &'static str {
    if amount > 1 {
        "s"
    } else {
        ""
    }
}

/// Format a distance in meters as kilometers.
/// One decimal below 10 km, whole kilometers from there up.
pub fn format_distance(meters: f64) -> String {
    let km = meters / 1000.0;
    if km < 10.0 {
        format!("{:.1} km", km)
    } else {
        format!("{} km", km.round())
    }
}

/// Long date for the ride header, e.g. "Saturday 15 March"
pub fn format_ride_date<Tz>(start: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    start.with_timezone(tz).format("%A %-d %B").to_string()
}

/// Clock time for the ride header, e.g. "07:30 am"
pub fn format_ride_time<Tz>(start: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    start.with_timezone(tz).format("%I:%M %P").to_string()
}

/// Coordinate pair to four decimals, e.g. "-37.8136, 144.9631"
pub fn format_coordinate(lat: f64, lng: f64) -> String {
    format!("{:.4}, {:.4}", lat, lng)
}

/// Treat missing and blank strings alike
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Format an optional string, returning a default if None or blank
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    non_empty(value).unwrap_or(default).to_string()
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_countdown_boundaries() {
        let now = now();
        assert_eq!(
            format_countdown(now + Duration::hours(24), now).as_deref(),
            Some("Starts in 1 day")
        );
        assert_eq!(
            format_countdown(now + Duration::minutes(90), now).as_deref(),
            Some("Starts in 1 hour")
        );
        assert_eq!(
            format_countdown(now + Duration::minutes(45), now).as_deref(),
            Some("Starts in 45 minutes")
        );
        assert_eq!(format_countdown(now, now), None);
        assert_eq!(format_countdown(now - Duration::minutes(5), now), None);
    }

    #[test]
    fn test_countdown_pluralization() {
        let now = now();
        assert_eq!(
            format_countdown(now + Duration::hours(50), now).as_deref(),
            Some("Starts in 2 days")
        );
        assert_eq!(
            format_countdown(now + Duration::hours(23) + Duration::minutes(59), now).as_deref(),
            Some("Starts in 23 hours")
        );
        assert_eq!(
            format_countdown(now + Duration::minutes(1), now).as_deref(),
            Some("Starts in 1 minute")
        );
        assert_eq!(
            format_countdown(now + Duration::seconds(30), now).as_deref(),
            Some("Starts in 0 minute")
        );
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(9999.0), "10.0 km");
        assert_eq!(format_distance(9000.0), "9.0 km");
        assert_eq!(format_distance(15000.0), "15 km");
        assert_eq!(format_distance(10000.0), "10 km");
        assert_eq!(format_distance(42195.0), "42 km");
        assert_eq!(format_distance(0.0), "0.0 km");
    }

    #[test]
    fn test_format_date_and_time_in_zone() {
        // 20:30 UTC Friday is 07:30 Saturday in Melbourne daylight time
        let start = Utc.with_ymd_and_hms(2025, 3, 14, 20, 30, 0).unwrap();
        let melbourne = FixedOffset::east_opt(11 * 3600).unwrap();
        assert_eq!(format_ride_date(start, &melbourne), "Saturday 15 March");
        assert_eq!(format_ride_time(start, &melbourne), "07:30 am");
        assert_eq!(format_ride_time(start, &Utc), "08:30 pm");
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(-37.81362, 144.96305), "-37.8136, 144.9631");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some("Sam"), "Anonymous"), "Sam");
        assert_eq!(format_optional(Some("  "), "Anonymous"), "Anonymous");
        assert_eq!(format_optional(None, "Anonymous"), "Anonymous");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Café au lait", 7), "Café...");
    }
}
