//! Undo RFC 5545 line folding.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

static FOLD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n[ \t]").unwrap());

/// Join every continuation line with the line before it.
///
/// A continuation line starts with a space or a tab. The line break and that one whitespace
/// character are removed, everything else is kept as is.
pub fn unfold(text: &str) -> Cow<'_, str> {
    FOLD_REGEX.replace_all(text, "")
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use crate::unfold::unfold;

    #[test]
    fn test_unfold() {
        assert_eq!(
            unfold("DESCRIPTION:first\r\n second\r\n\tthird\r\nEND:VEVENT\r\n"),
            "DESCRIPTION:firstsecondthird\r\nEND:VEVENT\r\n"
        );
        assert_eq!(
            unfold("DESCRIPTION:bare\n  line feed\nEND:VEVENT"),
            "DESCRIPTION:bare line feed\nEND:VEVENT"
        );
    }

    #[test]
    fn test_unfold_without_folding() {
        let text = "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n";
        assert!(matches!(unfold(text), Cow::Borrowed(unfolded) if unfolded == text));
    }
}
