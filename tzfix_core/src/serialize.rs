//! Join lines into the iCalendar wire format.

pub static LINE_TERMINATOR: &str = "\r\n";

/// Terminate every line, the last one included, with CRLF.
///
/// Long lines are not folded again.
pub fn serialize<S: AsRef<str>>(lines: &[S]) -> String {
    let capacity = lines
        .iter()
        .map(|line| line.as_ref().len() + LINE_TERMINATOR.len())
        .sum();
    let mut text = String::with_capacity(capacity);
    for line in lines {
        text.push_str(line.as_ref());
        text.push_str(LINE_TERMINATOR);
    }
    text
}
