//! The zone a feed is repaired into and the yearly rule describing it.

use std::{fmt, fs::read_to_string, path::Path, str::FromStr};

use anyhow::{bail, Context, Result};
use chrono::Weekday;
use serde::Deserialize;

static DEFAULT_TZID: &str = "Europe/Amsterdam";

const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

/// Everything needed to turn UTC instants into civil time of one zone.
///
/// The zone has two variants. Each variant begins at its `onset` every year, so the daylight
/// period runs from the daylight onset up to the standard onset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoneConfig {
    /// the identifier written into `TZID` parameters and the `VTIMEZONE` block
    pub tzid: String,
    pub standard: Variant,
    pub daylight: Variant,
}

/// One of the two offsets a zone switches between.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variant {
    /// the display name, e.g. `CET`
    pub name: String,
    pub offset: UtcOffset,
    pub onset: Transition,
}

/// The yearly instant a variant takes effect: the last `weekday` of `month` at `hour` local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Transition {
    pub month: u32,
    #[serde(default = "default_weekday")]
    pub weekday: Weekday,
    pub hour: u32,
}

fn default_weekday() -> Weekday {
    Weekday::Sun
}

/// A fixed offset from UTC, written as `+HHMM` or `+HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct UtcOffset {
    seconds: i32,
}

impl UtcOffset {
    pub fn from_seconds(seconds: i32) -> Result<Self> {
        if seconds.abs() > MAX_OFFSET_SECONDS {
            bail!("UTC offset of {seconds} seconds is out of range");
        }
        Ok(Self { seconds })
    }

    pub fn from_hours(hours: i32) -> Result<Self> {
        Self::from_seconds(hours * 3600)
    }

    pub fn seconds(&self) -> i32 {
        self.seconds
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.seconds))
    }
}

impl FromStr for UtcOffset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (sign, rest) = match s.split_at_checked(1) {
            Some(("+", rest)) => (1, rest),
            Some(("-", rest)) => (-1, rest),
            _ => bail!("UTC offset {s:?} must start with '+' or '-'"),
        };
        let digits = rest.replace(':', "");
        if digits.len() != 4 || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            bail!("UTC offset {s:?} must look like +HHMM");
        }
        let hours: i32 = digits[0..2].parse()?;
        let minutes: i32 = digits[2..4].parse()?;
        if minutes >= 60 {
            bail!("UTC offset {s:?} has more than 59 minutes");
        }
        Self::from_seconds(sign * (hours * 3600 + minutes * 60))
    }
}

impl TryFrom<String> for UtcOffset {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds < 0 { '-' } else { '+' };
        let minutes = self.seconds.abs() / 60;
        write!(f, "{sign}{:02}{:02}", minutes / 60, minutes % 60)
    }
}

impl Default for ZoneConfig {
    /// Central European Time as observed in Amsterdam.
    fn default() -> Self {
        Self {
            tzid: String::from(DEFAULT_TZID),
            standard: Variant {
                name: String::from("CET"),
                offset: UtcOffset { seconds: 3600 },
                onset: Transition {
                    month: 10,
                    weekday: Weekday::Sun,
                    hour: 3,
                },
            },
            daylight: Variant {
                name: String::from("CEST"),
                offset: UtcOffset { seconds: 2 * 3600 },
                onset: Transition {
                    month: 3,
                    weekday: Weekday::Sun,
                    hour: 2,
                },
            },
        }
    }
}

impl ZoneConfig {
    /// Parse and validate a zone from TOML.
    pub fn from_toml(toml: &str) -> Result<Self> {
        let zone: Self = toml::from_str(toml)?;
        zone.validate()?;
        Ok(zone)
    }

    /// Load a zone from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml = read_to_string(path)
            .with_context(|| format!("could not read zone file {}", path.display()))?;
        Self::from_toml(&toml).with_context(|| format!("invalid zone file {}", path.display()))
    }

    /// Pick the zone the binaries run with: the zone file if given, the default zone otherwise,
    /// with the identifier optionally replaced.
    pub fn resolve(zone_file: Option<&Path>, tzid: Option<&str>) -> Result<Self> {
        let mut zone = match zone_file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(tzid) = tzid {
            zone.tzid = String::from(tzid);
            zone.validate()?;
        }
        tracing::debug!(tzid = %zone.tzid, "resolved target zone");
        Ok(zone)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tzid.trim().is_empty() {
            bail!("the zone identifier must not be empty");
        }
        if self.tzid.chars().any(|c| c.is_control() || c == '"') {
            bail!("the zone identifier {:?} contains forbidden characters", self.tzid);
        }
        for (label, variant) in [("standard", &self.standard), ("daylight", &self.daylight)] {
            variant
                .validate()
                .with_context(|| format!("invalid {label} variant"))?;
        }
        if self.standard.onset.month == self.daylight.onset.month {
            bail!("standard and daylight onsets must fall into different months");
        }
        Ok(())
    }
}

impl Variant {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("the display name must not be empty");
        }
        if !(1..=12).contains(&self.onset.month) {
            bail!("month {} is not a calendar month", self.onset.month);
        }
        if self.onset.hour > 23 {
            bail!("hour {} is not an hour of the day", self.onset.hour);
        }
        Ok(())
    }
}
