use chrono::{DateTime, Datelike, Utc};

/// Age of a history entry for the history pane:
/// - Relative under a week: "just now", "5m ago", "2h ago", "3d ago"
/// - Absolute otherwise: "Jan 15", or "Dec 3, 2024" for another year
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    format_timestamp_at(timestamp, &Utc::now())
}

fn format_timestamp_at(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let age = now.signed_duration_since(*timestamp);

    // Clock skew can put an entry slightly in the future
    if age.num_seconds() < 60 {
        return "just now".to_string();
    }
    if age.num_days() >= 7 {
        return if timestamp.year() == now.year() {
            timestamp.format("%b %-d").to_string()
        } else {
            timestamp.format("%b %-d, %Y").to_string()
        };
    }

    if age.num_days() > 0 {
        format!("{}d ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}m ago", age.num_minutes())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_just_now() {
        assert_eq!(format_timestamp_at(&(now() - Duration::seconds(30)), &now()), "just now");
        assert_eq!(format_timestamp_at(&(now() + Duration::seconds(5)), &now()), "just now");
    }

    #[test]
    fn test_relative() {
        assert_eq!(format_timestamp_at(&(now() - Duration::minutes(45)), &now()), "45m ago");
        assert_eq!(format_timestamp_at(&(now() - Duration::hours(3)), &now()), "3h ago");
        assert_eq!(format_timestamp_at(&(now() - Duration::days(5)), &now()), "5d ago");
    }

    #[test]
    fn test_absolute_same_year() {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp_at(&timestamp, &now()), "Jan 15");
    }

    #[test]
    fn test_absolute_other_year() {
        let timestamp = Utc.with_ymd_and_hms(2024, 12, 3, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp_at(&timestamp, &now()), "Dec 3, 2024");
    }

    #[test]
    fn test_wall_clock_wrapper() {
        assert_eq!(format_timestamp(&Utc::now()), "just now");
    }
}
