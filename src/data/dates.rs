use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Timestamp layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts. Month-first comes before day-first, so `03/04/2023`
/// reads as March 4th and `13/04/2023` still parses as April 13th.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

/// Parse a cell as a calendar timestamp. Date-only values land on midnight.
///
/// Returns `None` for empty or unrecognised input; callers turn that into a
/// missing cell rather than an error.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(parse_date("2023-01-01"), Some(ymd_hms(2023, 1, 1, 0, 0, 0)));
        assert_eq!(parse_date("  2023-01-02 "), Some(ymd_hms(2023, 1, 2, 0, 0, 0)));
    }

    #[test]
    fn test_timestamps() {
        assert_eq!(
            parse_date("2023-05-06 07:08:09"),
            Some(ymd_hms(2023, 5, 6, 7, 8, 9))
        );
        assert_eq!(
            parse_date("2023-05-06T07:08:09"),
            Some(ymd_hms(2023, 5, 6, 7, 8, 9))
        );
        assert_eq!(
            parse_date("2023-05-06 07:08"),
            Some(ymd_hms(2023, 5, 6, 7, 8, 0))
        );
    }

    #[test]
    fn test_rfc3339_keeps_wall_clock() {
        assert_eq!(
            parse_date("2023-05-06T23:30:00-05:00"),
            Some(ymd_hms(2023, 5, 6, 23, 30, 0))
        );
    }

    #[test]
    fn test_slash_dates_month_first_then_day_first() {
        assert_eq!(parse_date("03/04/2023"), Some(ymd_hms(2023, 3, 4, 0, 0, 0)));
        assert_eq!(parse_date("13/04/2023"), Some(ymd_hms(2023, 4, 13, 0, 0, 0)));
        assert_eq!(parse_date("2023/04/13"), Some(ymd_hms(2023, 4, 13, 0, 0, 0)));
    }

    #[test]
    fn test_slash_timestamps_follow_same_fallback() {
        assert_eq!(
            parse_date("03/04/2023 10:00:00"),
            Some(ymd_hms(2023, 3, 4, 10, 0, 0))
        );
        assert_eq!(
            parse_date("13/04/2023 10:00:00"),
            Some(ymd_hms(2023, 4, 13, 10, 0, 0))
        );
        assert_eq!(
            parse_date("13/04/2023 10:15"),
            Some(ymd_hms(2023, 4, 13, 10, 15, 0))
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2023-02-30"), None);
    }
}
