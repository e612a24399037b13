//! The whole repair, from raw feed text to wire-ready text.

use crate::{
    augment::augment, rewrite::rewrite_lines, serialize::serialize, unfold::unfold, zone::ZoneConfig,
};

/// Repair the timezone metadata of an iCalendar document.
///
/// The document is unfolded, its `DTSTART`/`DTEND` lines are moved into the zone, the
/// `X-WR-TIMEZONE` header and the `VTIMEZONE` block are added if missing and the lines are joined
/// with CRLF. Running it on its own output changes nothing.
pub fn transform(raw: &str, zone: &ZoneConfig) -> String {
    let unfolded = unfold(raw);
    let mut lines = rewrite_lines(unfolded.lines(), zone);
    augment(&mut lines, zone);
    tracing::info!(lines = lines.len(), tzid = %zone.tzid, "transformed calendar");
    serialize(&lines)
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor};

    use ical::IcalParser;

    use crate::{transform::transform, unfold::unfold, zone::ZoneConfig};

    static OUTLOOK_CALENDAR: &str = include_str!("transform/tests/outlook_calendar.ics");

    /// Lines added after `BEGIN:VCALENDAR`: the header and the 17 lines of the block.
    const ADDED_LINES: usize = 18;

    fn is_date_time_property(line: &str) -> bool {
        line.starts_with("DTSTART") || line.starts_with("DTEND")
    }

    #[test]
    fn test_transform() {
        let transformed = transform(OUTLOOK_CALENDAR, &ZoneConfig::default());
        let lines: Vec<&str> = transformed.lines().collect();
        assert_eq!(lines[0], "BEGIN:VCALENDAR");
        assert_eq!(lines[1], "X-WR-TIMEZONE:Europe/Amsterdam");
        assert_eq!(lines[2], "BEGIN:VTIMEZONE");
        assert_eq!(lines[3], "TZID:Europe/Amsterdam");
        assert_eq!(lines[18], "END:VTIMEZONE");
        assert_eq!(lines[19], "METHOD:PUBLISH");
        for expected in [
            "DTSTART;TZID=Europe/Amsterdam:20260315T110000",
            "DTEND;TZID=Europe/Amsterdam:20260315T120000",
            "DTSTART;TZID=Europe/Amsterdam:20260615T173000",
            "DTEND;TZID=Europe/Amsterdam:20260615T200000",
            "DTSTART;VALUE=DATE:20260427",
            "DTEND;VALUE=DATE:20260428",
            "DTSTART;TZID=W. Europe Standard Time:20261101T090000",
            "DTSTART:16010101T030000",
            "DTSTAMP:20260301T080000Z",
            "DESCRIPTION:Wekelijks overleg over de planning. Graag de notulen van vorige week doorlezen.\\n",
        ] {
            assert!(lines.contains(&expected), "missing line {expected:?}");
        }
        assert!(transformed.ends_with("END:VCALENDAR\r\n"));
        assert!(!transformed.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_transform_line_endings() {
        let zone = ZoneConfig::default();
        let crlf = OUTLOOK_CALENDAR.replace('\n', "\r\n");
        assert_eq!(transform(&crlf, &zone), transform(OUTLOOK_CALENDAR, &zone));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let zone = ZoneConfig::default();
        let once = transform(OUTLOOK_CALENDAR, &zone);
        let twice = transform(&once, &zone);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_transform_already_fixed() {
        let zone = ZoneConfig::default();
        let fixed = transform(OUTLOOK_CALENDAR, &zone).replace("\r\n", "\n");
        assert_eq!(transform(&fixed, &zone), fixed.replace('\n', "\r\n"));
    }

    #[test]
    fn test_transform_keeps_unrelated_lines() {
        let transformed = transform(OUTLOOK_CALENDAR, &ZoneConfig::default());
        let unfolded = unfold(OUTLOOK_CALENDAR);
        let original: Vec<&str> = unfolded.lines().collect();
        let mut lines: Vec<&str> = transformed.lines().collect();
        lines.drain(1..1 + ADDED_LINES);
        assert_eq!(lines.len(), original.len());
        for (line, original) in lines.iter().zip(original) {
            if !is_date_time_property(original) {
                assert_eq!(*line, original);
            }
        }
    }

    #[test]
    fn test_transform_single_tzid() {
        let transformed = transform(OUTLOOK_CALENDAR, &ZoneConfig::default());
        let mut in_timezone = false;
        for line in transformed.lines() {
            match line {
                "BEGIN:VTIMEZONE" => in_timezone = true,
                "END:VTIMEZONE" => in_timezone = false,
                _ if in_timezone || !is_date_time_property(line) => {}
                _ if line.contains("VALUE=DATE:") => {}
                _ => {
                    assert_eq!(line.matches("TZID=").count(), 1, "{line}");
                    assert!(!line.ends_with('Z'), "{line}");
                }
            }
        }
    }

    #[test]
    fn test_transform_minimal() {
        let raw = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nDTSTART:20260115T080000Z\nEND:VEVENT\nEND:VCALENDAR\n";
        let zone = ZoneConfig::from_toml(
            r#"
tzid = "Europe/London"
standard = { name = "GMT", offset = "+0000", onset = { month = 10, hour = 2 } }
daylight = { name = "BST", offset = "+0100", onset = { month = 3, hour = 1 } }
"#,
        )
        .unwrap();
        let expected = [
            "BEGIN:VCALENDAR",
            "X-WR-TIMEZONE:Europe/London",
            "BEGIN:VTIMEZONE",
            "TZID:Europe/London",
            "BEGIN:STANDARD",
            "DTSTART:19701025T020000",
            "RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU",
            "TZOFFSETFROM:+0100",
            "TZOFFSETTO:+0000",
            "TZNAME:GMT",
            "END:STANDARD",
            "BEGIN:DAYLIGHT",
            "DTSTART:19700329T010000",
            "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU",
            "TZOFFSETFROM:+0000",
            "TZOFFSETTO:+0100",
            "TZNAME:BST",
            "END:DAYLIGHT",
            "END:VTIMEZONE",
            "BEGIN:VEVENT",
            "DTSTART;TZID=Europe/London:20260115T080000",
            "END:VEVENT",
            "END:VCALENDAR",
            "",
        ]
        .join("\r\n");
        assert_eq!(transform(raw, &zone), expected);
    }

    /// Test whether an independent parser reads the output with zones on every event.
    #[test]
    fn test_transform_parses() {
        let transformed = transform(OUTLOOK_CALENDAR, &ZoneConfig::default());
        let parser = IcalParser::new(BufReader::new(Cursor::new(transformed)));
        let calendars = parser.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(calendars.len(), 1);
        let calendar = &calendars[0];
        assert_eq!(calendar.events.len(), 4);
        assert_eq!(calendar.timezones.len(), 2);
        assert!(calendar.properties.iter().any(|property| {
            property.name == "X-WR-TIMEZONE"
                && property.value.as_deref() == Some("Europe/Amsterdam")
        }));
        for event in &calendar.events {
            let dtstart = event
                .properties
                .iter()
                .find(|property| property.name == "DTSTART")
                .unwrap();
            let params = dtstart.params.as_ref().unwrap();
            assert!(params
                .iter()
                .any(|(name, _)| name == "TZID" || name == "VALUE"));
        }
    }
}
