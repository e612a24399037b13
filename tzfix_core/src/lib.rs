//! This crate repairs the timezone metadata of iCalendar feeds.
//!
//! Calendar services like Outlook publish feeds whose event times are tagged as UTC or carry
//! no zone at all. The transformer rewrites `DTSTART`/`DTEND` to civil time in a configured zone
//! and adds the matching `X-WR-TIMEZONE` header and `VTIMEZONE` block, so importing clients show
//! the events at the right wall-clock time.

pub mod augment;
pub mod feed_client;
pub mod rewrite;
pub mod rule;
pub mod serialize;
pub mod transform;
pub mod unfold;
pub mod zone;

pub use transform::transform;
pub use zone::ZoneConfig;
