//! Date parsing in the service's reference time zone.
//!
//! Inputs carrying an offset (RFC 3339) are taken as-is. Naive date-times and
//! bare dates are interpreted as wall-clock time in Asia/Kolkata.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const REFERENCE_TZ: Tz = chrono_tz::Asia::Kolkata;

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A parsed instant, remembering whether the input named a whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTime {
    pub instant: DateTime<Utc>,
    pub whole_day: bool,
}

impl ParsedTime {
    /// Last instant the input covers: end of day for bare dates, else the instant itself.
    pub fn last_instant(&self) -> DateTime<Utc> {
        if self.whole_day {
            self.instant + Duration::days(1) - Duration::microseconds(1)
        } else {
            self.instant
        }
    }
}

fn localize(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    REFERENCE_TZ
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn parse_time(raw: &str) -> Option<ParsedTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedTime {
            instant: dt.with_timezone(&Utc),
            whole_day: false,
        });
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return localize(naive).map(|instant| ParsedTime {
                instant,
                whole_day: false,
            });
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    localize(date.and_hms_opt(0, 0, 0)?).map(|instant| ParsedTime {
        instant,
        whole_day: true,
    })
}
