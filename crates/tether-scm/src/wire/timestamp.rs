//! The protocol's millisecond UTC timestamp format.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Human-readable form of the format, used in diagnostics.
pub const TIMESTAMP_PATTERN: &str = "yyyy-MM-dd'T'HH:mm:ss.SSS'Z'";

const FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Parses `2011-07-13T19:43:37.100Z`.
///
/// Returns `None` for anything else, including blank input.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(raw, FORMAT)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Renders a timestamp in UTC with millisecond precision.
///
/// # Errors
///
/// Returns the formatter error when the year cannot be represented.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, time::error::Format> {
    timestamp.to_offset(UtcOffset::UTC).format(FORMAT)
}
