//! Human readable distances between two instants ("3 days", "about 1 hour").
//!
//! Buckets follow the common `formatDistance` convention used by web
//! front-ends.

use chrono::{DateTime, Datelike, Timelike, Utc};

const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Formats the distance between two instants, regardless of their order
pub fn format_distance(a: DateTime<Utc>, b: DateTime<Utc>) -> String {
    let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
    let seconds = (later - earlier).num_seconds();
    let minutes = div_round(seconds, 60);

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".to_string()
        } else {
            "1 minute".to_string()
        };
    }
    if minutes < 45 {
        return format!("{} minutes", minutes);
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        return format!("about {} hours", div_round(minutes, 60));
    }
    if minutes < 2_520 {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        return format!("{} days", div_round(minutes, MINUTES_IN_DAY));
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = div_round(minutes, MINUTES_IN_MONTH);
        return format!("about {}", plural(months, "month"));
    }

    let months = calendar_months(earlier, later);
    if months < 12 {
        return format!("{} months", div_round(minutes, MINUTES_IN_MONTH).max(2));
    }

    let years = months / 12;
    match months % 12 {
        0..=2 => format!("about {}", plural(years, "year")),
        3..=8 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}

/// Formats the distance from `now` to `instant`
pub fn format_distance_to_now(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_distance(instant, now)
}

// Rounds half up, inputs are never negative
fn div_round(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2) / divisor
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn calendar_months(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month())
        - i64::from(earlier.month());

    let later_in_month = (later.day(), later.num_seconds_from_midnight());
    let earlier_in_month = (earlier.day(), earlier.num_seconds_from_midnight());
    if later_in_month < earlier_in_month {
        months -= 1;
    }
    months.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn after(duration: Duration) -> String {
        format_distance(base(), base() + duration)
    }

    #[test]
    fn test_minutes() {
        assert_eq!(after(Duration::seconds(10)), "less than a minute");
        assert_eq!(after(Duration::seconds(45)), "1 minute");
        assert_eq!(after(Duration::minutes(5)), "5 minutes");
        assert_eq!(after(Duration::minutes(44)), "44 minutes");
    }

    #[test]
    fn test_hours() {
        assert_eq!(after(Duration::minutes(45)), "about 1 hour");
        assert_eq!(after(Duration::minutes(90)), "about 2 hours");
        assert_eq!(after(Duration::hours(23)), "about 23 hours");
    }

    #[test]
    fn test_days() {
        assert_eq!(after(Duration::hours(24)), "1 day");
        assert_eq!(after(Duration::days(2)), "2 days");
        assert_eq!(after(Duration::days(3)), "3 days");
        assert_eq!(after(Duration::days(29)), "29 days");
    }

    #[test]
    fn test_months() {
        assert_eq!(after(Duration::days(30)), "about 1 month");
        assert_eq!(after(Duration::days(50)), "about 2 months");
        assert_eq!(after(Duration::days(120)), "4 months");
    }

    #[test]
    fn test_years() {
        assert_eq!(after(Duration::days(370)), "about 1 year");
        assert_eq!(after(Duration::days(365 + 150)), "over 1 year");
        assert_eq!(after(Duration::days(365 + 300)), "almost 2 years");
        assert_eq!(after(Duration::days(3 * 365 + 10)), "about 3 years");
    }

    #[test]
    fn test_order_of_arguments_does_not_matter() {
        let later = base() + Duration::days(2);
        assert_eq!(format_distance(later, base()), format_distance(base(), later));
        assert_eq!(format_distance_to_now(later, base()), "2 days");
    }
}
