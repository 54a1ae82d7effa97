//! Timestamp formatting for the `last` column of the 4-column zone table.
//!
//! Output is always `DD/MM/YY HH:MM:SS.mmm` in the viewer's time zone, with
//! the year cut down to its last two digits (2024 → `24`, never rounded).

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use serde_json::Value;

use crate::error::{RenderError, Result};

/// Largest distance from the epoch a browser `Date` can hold (±100 000 000 days).
///
/// chrono stops earlier, around year ±262 000 (about ±8.2e15 ms), so values
/// between the two bounds are rejected as well.
const MAX_DATE_MILLIS: i64 = 8_640_000_000_000_000;

const DISPLAY_FORMAT: &str = "%d/%m/%y %H:%M:%S%.3f";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Format a timestamp value in the local time zone of the machine running the viewer.
pub fn format_timestamp(value: &Value) -> Result<String> {
    format_timestamp_in(value, &Local)
}

/// Format a timestamp value in an explicit time zone.
pub fn format_timestamp_in<Tz: TimeZone>(value: &Value, tz: &Tz) -> Result<String> {
    let instant = parse_timestamp(value, tz)?;
    Ok(instant
        .with_timezone(tz)
        .naive_local()
        .format(DISPLAY_FORMAT)
        .to_string())
}

/// Interpret a JSON value the way a browser's `new Date(value)` would for the
/// shapes the control plane emits.
///
/// - numbers are milliseconds since the Unix epoch (fraction dropped)
/// - RFC 3339 strings carry their own offset
/// - date-times without an offset are wall-clock time in `tz`; a time skipped
///   by a DST jump keeps the offset in force just before the jump
/// - bare dates are midnight UTC
pub fn parse_timestamp<Tz: TimeZone>(value: &Value, tz: &Tz) -> Result<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = match n.as_i64() {
                Some(ms) => Some(ms),
                None => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
            };
            millis
                .filter(|ms| ms.unsigned_abs() <= MAX_DATE_MILLIS as u64)
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .ok_or_else(|| invalid(value))
        }
        Value::String(s) => parse_timestamp_str(s.trim(), tz).ok_or_else(|| invalid(value)),
        _ => Err(invalid(value)),
    }
}

fn parse_timestamp_str<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return resolve_local(&naive, tz);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn resolve_local<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        // first reading of a wall-clock time repeated by a DST fold
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        // skipped by a forward jump: 02:30 in a 02:00 -> 03:00 gap lands on 03:30
        LocalResult::None => (1..=24).find_map(|hours| {
            let shift = TimeDelta::hours(hours);
            let before = naive.checked_sub_signed(shift)?;
            let dt = tz.from_local_datetime(&before).earliest()?;
            dt.with_timezone(&Utc).checked_add_signed(shift)
        }),
    }
}

fn invalid(value: &Value) -> RenderError {
    RenderError::InvalidTimestamp(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime};
    use serde_json::json;

    /// US Eastern around the 2024-03-10 spring-forward: 02:00 EST jumps to 03:00 EDT.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward2024;

    impl SpringForward2024 {
        fn est() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn edt() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn jump_local() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(2, 0, 0).unwrap()
        }
    }

    impl TimeZone for SpringForward2024 {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let jump = Self::jump_local();
            if *local < jump {
                LocalResult::Single(Self::est())
            } else if *local < jump + TimeDelta::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::edt())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            // 02:00 EST == 07:00 UTC
            if *utc < Self::jump_local() + TimeDelta::hours(5) {
                Self::est()
            } else {
                Self::edt()
            }
        }
    }

    #[test]
    fn test_rfc3339_in_utc() {
        let out = format_timestamp_in(&json!("2024-03-05T14:07:09.123Z"), &Utc).unwrap();
        assert_eq!(out, "05/03/24 14:07:09.123");
    }

    #[test]
    fn test_local_zone_shifts_wall_clock() {
        let paris = FixedOffset::east_opt(3600).unwrap();
        let out = format_timestamp_in(&json!("2024-03-05T23:30:00.000Z"), &paris).unwrap();
        assert_eq!(out, "06/03/24 00:30:00.000");

        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        let out = format_timestamp_in(&json!("2024-01-01T03:00:00Z"), &new_york).unwrap();
        assert_eq!(out, "31/12/23 22:00:00.000");
    }

    #[test]
    fn test_epoch_millis() {
        // 2024-03-05T14:07:09.123Z
        let out = format_timestamp_in(&json!(1709647629123i64), &Utc).unwrap();
        assert_eq!(out, "05/03/24 14:07:09.123");

        let out = format_timestamp_in(&json!(1709647629123.9), &Utc).unwrap();
        assert_eq!(out, "05/03/24 14:07:09.123");

        let out = format_timestamp_in(&json!(0), &Utc).unwrap();
        assert_eq!(out, "01/01/70 00:00:00.000");
    }

    #[test]
    fn test_year_truncated_not_rounded() {
        let out = format_timestamp_in(&json!("1999-12-31T23:59:59.999Z"), &Utc).unwrap();
        assert_eq!(out, "31/12/99 23:59:59.999");

        let out = format_timestamp_in(&json!("2005-07-04T01:02:03.004Z"), &Utc).unwrap();
        assert_eq!(out, "04/07/05 01:02:03.004");
    }

    #[test]
    fn test_naive_datetime_uses_viewer_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let out = format_timestamp_in(&json!("2024-03-05T14:07:09.5"), &tokyo).unwrap();
        assert_eq!(out, "05/03/24 14:07:09.500");

        let instant = parse_timestamp(&json!("2024-03-05T14:07"), &tokyo).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-03-05T05:07:00+00:00");
    }

    #[test]
    fn test_date_only_is_utc_midnight() {
        let instant = parse_timestamp(&json!("2024-01-01"), &Local).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        let out = format_timestamp_in(&json!("2024-01-01"), &new_york).unwrap();
        assert_eq!(out, "31/12/23 19:00:00.000");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for value in [
            json!(null),
            json!(true),
            json!("yesterday"),
            json!({"ts": 1}),
            json!([1, 2]),
            json!(""),
            json!(8_640_000_000_000_001i64),
        ] {
            let err = format_timestamp_in(&value, &Utc).unwrap_err();
            assert!(matches!(err, RenderError::InvalidTimestamp(_)), "{value} accepted");
        }
    }

    #[test]
    fn test_time_in_dst_gap_moves_forward() {
        let instant = parse_timestamp(&json!("2024-03-10T02:30:00"), &SpringForward2024).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-03-10T07:30:00+00:00");

        let out = format_timestamp_in(&json!("2024-03-10T02:30:00"), &SpringForward2024).unwrap();
        assert_eq!(out, "10/03/24 03:30:00.000");

        // either side of the gap is untouched
        let out = format_timestamp_in(&json!("2024-03-10T01:59:59.999"), &SpringForward2024).unwrap();
        assert_eq!(out, "10/03/24 01:59:59.999");
        let out = format_timestamp_in(&json!("2024-03-10T03:00"), &SpringForward2024).unwrap();
        assert_eq!(out, "10/03/24 03:00:00.000");
    }

    #[test]
    fn test_range_is_bounded_by_chrono() {
        // year 255 480: a valid DateTime
        assert!(format_timestamp_in(&json!(8_000_000_000_000_000i64), &Utc).is_ok());
        // a browser still accepts this one, chrono cannot represent it
        let err = format_timestamp_in(&json!(8_500_000_000_000_000i64), &Utc).unwrap_err();
        assert!(matches!(err, RenderError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_negative_year_keeps_two_digits() {
        // -0001-06-15T08:09:10.011Z, -1 mod 100 == 99
        let out = format_timestamp_in(&json!(-62184469849989i64), &Utc).unwrap();
        assert_eq!(out, "15/06/99 08:09:10.011");
    }

    #[test]
    fn test_local_formatting_has_fixed_shape() {
        let out = format_timestamp(&json!(1709647629123i64)).unwrap();
        assert_eq!(out.len(), "DD/MM/YY HH:MM:SS.mmm".len());
        assert!(out.ends_with(".123"));
    }
}
