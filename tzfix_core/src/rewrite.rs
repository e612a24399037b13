//! Rewrite `DTSTART` and `DTEND` property lines into civil time of the target zone.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

use crate::{
    rule::{is_representable, parse_utc, utc_to_local},
    zone::ZoneConfig,
};

/// `NAME` followed by optional `;PARAM=VALUE` parameters (quoted values may hold `:`) and the value.
static PROPERTY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?i:(DTSTART|DTEND))((?:;(?:[^:"]|"[^"]*")*)?):(.*)$"#).unwrap()
});
static PARAMETER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#";([^=;:"]+)=("[^"]*"|[^;:"]*)"#).unwrap());
static UTC_VALUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}T[0-9]{6}Z$").unwrap());
static DATE_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{8}$").unwrap());

static TIMEZONE_BEGIN: &str = "BEGIN:VTIMEZONE";
static TIMEZONE_END: &str = "END:VTIMEZONE";

/// Rewrite a single line.
///
/// Anything that is not a timed `DTSTART`/`DTEND` line comes back untouched. A UTC value is
/// converted to civil time and loses its `Z`, and a `TZID` parameter naming the zone is added
/// unless one is present already. A UTC value holding a leap second, or one whose civil time
/// falls past the year 9999, is left as it is.
pub fn rewrite_line<'a>(line: &'a str, zone: &ZoneConfig) -> Cow<'a, str> {
    let Some(captures) = PROPERTY_REGEX.captures(line) else {
        return Cow::Borrowed(line);
    };
    let (name, parameters, value) = (&captures[1], &captures[2], &captures[3]);
    if is_whole_day(parameters, value) {
        return Cow::Borrowed(line);
    }
    let converted = match UTC_VALUE_REGEX.is_match(value).then(|| parse_utc(value)).flatten() {
        Some(utc) => {
            let resolution = utc_to_local(zone, utc);
            // the civil value could not be written back in the same shape
            if !is_representable(&utc) || !is_representable(&resolution.local) {
                return Cow::Borrowed(line);
            }
            Some(resolution.format())
        }
        None => None,
    };
    let has_tzid = has_parameter(parameters, "TZID");
    if converted.is_none() && has_tzid {
        return Cow::Borrowed(line);
    }
    let value = converted.as_deref().unwrap_or(value);
    let tzid = if has_tzid {
        String::new()
    } else {
        format!(";TZID={}", parameter_value(&zone.tzid))
    };
    Cow::Owned(format!("{name}{parameters}{tzid}:{value}"))
}

/// Rewrite all lines of a document.
///
/// `DTSTART` lines inside `VTIMEZONE` components describe the zone itself and are kept as they
/// are.
pub fn rewrite_lines<'a, I>(lines: I, zone: &ZoneConfig) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut in_timezone = false;
    let mut rewritten = 0usize;
    let lines = lines
        .into_iter()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case(TIMEZONE_BEGIN) {
                in_timezone = true;
            } else if trimmed.eq_ignore_ascii_case(TIMEZONE_END) {
                in_timezone = false;
            } else if !in_timezone {
                if let Cow::Owned(line) = rewrite_line(line, zone) {
                    rewritten += 1;
                    return line;
                }
            }
            String::from(line)
        })
        .collect();
    tracing::debug!(rewritten, "rewrote date-time property lines");
    lines
}

fn is_whole_day(parameters: &str, value: &str) -> bool {
    parameters_of(parameters).any(|(key, value)| {
        key.eq_ignore_ascii_case("VALUE") && value.trim_matches('"').eq_ignore_ascii_case("DATE")
    }) || DATE_VALUE_REGEX.is_match(value)
}

fn has_parameter(parameters: &str, name: &str) -> bool {
    parameters_of(parameters).any(|(key, _)| key.trim().eq_ignore_ascii_case(name))
}

fn parameters_of(parameters: &str) -> impl Iterator<Item = (&str, &str)> {
    PARAMETER_REGEX.captures_iter(parameters).map(|captures| {
        let (_, [key, value]) = captures.extract();
        (key, value)
    })
}

/// Quote a parameter value if it contains characters with a meaning in the property syntax.
fn parameter_value(value: &str) -> Cow<'_, str> {
    if value.contains([':', ';', ',']) {
        Cow::Owned(format!("\"{value}\""))
    } else {
        Cow::Borrowed(value)
    }
}
