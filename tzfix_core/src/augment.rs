//! Add the calendar-level timezone header and the `VTIMEZONE` block to a document.
//!
//! Both additions go directly after `BEGIN:VCALENDAR`, header first, and are only added when
//! missing. Without a `BEGIN:VCALENDAR` line they go to the very start of the document.
//!
//! The block counts as present only if a `VTIMEZONE` with the target `TZID` exists. A
//! `VTIMEZONE` for another zone, as Outlook feeds ship, is kept and the block is still added.

use chrono::Weekday;

use crate::{
    rule::{format_civil, onset},
    zone::{Variant, ZoneConfig},
};

static CALENDAR_BEGIN: &str = "BEGIN:VCALENDAR";
static TIMEZONE_BEGIN: &str = "BEGIN:VTIMEZONE";
static TIMEZONE_END: &str = "END:VTIMEZONE";
static HEADER_NAME: &str = "X-WR-TIMEZONE";
static BYTE_ORDER_MARK: char = '\u{feff}';

/// Year of the `DTSTART` onsets in the `VTIMEZONE` block; the `RRULE`s repeat them from there.
const ANCHOR_YEAR: i32 = 1970;

/// Add both the header and the block, each only if missing.
pub fn augment(lines: &mut Vec<String>, zone: &ZoneConfig) {
    ensure_timezone_header(lines, zone);
    ensure_timezone_block(lines, zone);
}

/// Add `X-WR-TIMEZONE` if no such header exists. Returns whether it was added.
pub fn ensure_timezone_header(lines: &mut Vec<String>, zone: &ZoneConfig) -> bool {
    if has_timezone_header(lines) {
        return false;
    }
    let index = insertion_index(lines);
    lines.insert(index, timezone_header(zone));
    tracing::debug!(index, "inserted timezone header");
    true
}

/// Add the `VTIMEZONE` block of the zone if no block with its `TZID` exists. Returns whether it
/// was added.
pub fn ensure_timezone_block(lines: &mut Vec<String>, zone: &ZoneConfig) -> bool {
    if has_timezone_block(lines, zone) {
        return false;
    }
    let mut index = insertion_index(lines);
    if lines.get(index).is_some_and(|line| is_timezone_header(line)) {
        index += 1;
    }
    lines.splice(index..index, timezone_block(zone));
    tracing::debug!(index, tzid = %zone.tzid, "inserted timezone block");
    true
}

pub fn timezone_header(zone: &ZoneConfig) -> String {
    format!("{HEADER_NAME}:{}", zone.tzid)
}

/// Build the `VTIMEZONE` block describing the zone's yearly rule.
pub fn timezone_block(zone: &ZoneConfig) -> Vec<String> {
    let mut block = vec![String::from(TIMEZONE_BEGIN), format!("TZID:{}", zone.tzid)];
    block.extend(observance("STANDARD", &zone.standard, &zone.daylight));
    block.extend(observance("DAYLIGHT", &zone.daylight, &zone.standard));
    block.push(String::from(TIMEZONE_END));
    block
}

fn observance(kind: &str, variant: &Variant, previous: &Variant) -> [String; 7] {
    let dtstart = onset(ANCHOR_YEAR, &variant.onset).unwrap_or_default();
    [
        format!("BEGIN:{kind}"),
        format!("DTSTART:{}", format_civil(&dtstart)),
        format!(
            "RRULE:FREQ=YEARLY;BYMONTH={};BYDAY=-1{}",
            variant.onset.month,
            weekday_code(variant.onset.weekday)
        ),
        format!("TZOFFSETFROM:{}", previous.offset),
        format!("TZOFFSETTO:{}", variant.offset),
        format!("TZNAME:{}", variant.name),
        format!("END:{kind}"),
    ]
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// The line without byte-order mark and surrounding whitespace.
fn marker(line: &str) -> &str {
    line.trim_start_matches(BYTE_ORDER_MARK).trim()
}

fn is_timezone_header(line: &str) -> bool {
    marker(line)
        .get(..HEADER_NAME.len())
        .is_some_and(|name| name.eq_ignore_ascii_case(HEADER_NAME))
}

pub fn has_timezone_header(lines: &[String]) -> bool {
    lines.iter().any(|line| is_timezone_header(line))
}

/// Check for a `VTIMEZONE` component whose `TZID` is the zone's identifier.
pub fn has_timezone_block(lines: &[String], zone: &ZoneConfig) -> bool {
    let mut in_timezone = false;
    for line in lines {
        let line = marker(line);
        if line.eq_ignore_ascii_case(TIMEZONE_BEGIN) {
            in_timezone = true;
        } else if line.eq_ignore_ascii_case(TIMEZONE_END) {
            in_timezone = false;
        } else if in_timezone {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.split(';').next().unwrap_or_default();
            if name.eq_ignore_ascii_case("TZID") && value.trim() == zone.tzid {
                return true;
            }
        }
    }
    false
}

/// The index directly after `BEGIN:VCALENDAR`, or the start of the document if there is none.
pub fn insertion_index(lines: &[String]) -> usize {
    match lines
        .iter()
        .position(|line| marker(line).eq_ignore_ascii_case(CALENDAR_BEGIN))
    {
        Some(position) => position + 1,
        None => {
            tracing::warn!("no {CALENDAR_BEGIN} line found, inserting at the start of the document");
            0
        }
    }
}
