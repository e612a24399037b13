//! Daylight saving decisions and UTC to civil time conversion for a [`ZoneConfig`].
//!
//! The rule is evaluated on local readings: a UTC instant is first moved by the standard offset,
//! and only if that tentative reading lies in the daylight period is the daylight offset used
//! instead. This is exact around the spring-forward transition. During the repeated hour after
//! fall-back the reading still counts as daylight, so instants in that UTC hour come out one
//! hour late. Feeds only need wall-clock times for display, so this is accepted.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::zone::{Transition, ZoneConfig};

static UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
static CIVIL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Which variant of the zone an instant resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Standard,
    Daylight,
}

/// A civil reading together with the variant whose offset produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub local: NaiveDateTime,
    pub kind: VariantKind,
}

impl Resolution {
    /// Format as `YYYYMMDDTHHMMSS`, without a zone suffix.
    pub fn format(&self) -> String {
        format_civil(&self.local)
    }
}

/// Get the last day of a month which falls on `weekday`.
///
/// Returns `None` if `month` is not a calendar month.
pub fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let first_of_next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut day = first_of_next_month.pred_opt()?;
    while day.weekday() != weekday {
        day = day.pred_opt()?;
    }
    Some(day)
}

pub fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    last_weekday(year, month, Weekday::Sun)
}

/// The local date-time a transition happens in the given year.
pub fn onset(year: i32, transition: &Transition) -> Option<NaiveDateTime> {
    last_weekday(year, transition.month, transition.weekday)?.and_hms_opt(transition.hour, 0, 0)
}

/// Check whether a local reading lies in the daylight period of its year.
pub fn is_daylight(zone: &ZoneConfig, local: NaiveDateTime) -> bool {
    let year = local.year();
    let (Some(start), Some(end)) = (
        onset(year, &zone.daylight.onset),
        onset(year, &zone.standard.onset),
    ) else {
        return false;
    };
    if start <= end {
        start <= local && local < end
    } else {
        // southern hemisphere: the daylight period wraps around new year
        local >= start || local < end
    }
}

/// Convert a UTC instant to civil time of the zone.
pub fn utc_to_local(zone: &ZoneConfig, utc: NaiveDateTime) -> Resolution {
    let tentative = utc + zone.standard.offset.duration();
    if is_daylight(zone, tentative) {
        Resolution {
            local: utc + zone.daylight.offset.duration(),
            kind: VariantKind::Daylight,
        }
    } else {
        Resolution {
            local: tentative,
            kind: VariantKind::Standard,
        }
    }
}

/// Parse a `YYYYMMDDTHHMMSSZ` literal.
pub fn parse_utc(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, UTC_FORMAT).ok()
}

pub fn format_civil(local: &NaiveDateTime) -> String {
    local.format(CIVIL_FORMAT).to_string()
}

/// Check whether `YYYYMMDDTHHMMSS` can hold a reading: a four-digit year and no leap second.
pub fn is_representable(date_time: &NaiveDateTime) -> bool {
    (0..=9999).contains(&date_time.year()) && date_time.nanosecond() < 1_000_000_000
}
