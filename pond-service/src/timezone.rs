use chrono::{DateTime, FixedOffset, Utc};

/// Zone used for every client-facing timestamp.
pub const DISPLAY_ZONE: &str = "Asia/Kolkata";

/// Asia/Kolkata is a constant +05:30 with no daylight saving.
const DISPLAY_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).expect("+05:30 is a valid offset")
}

/// Converts a stored UTC instant to the display zone. The instant is unchanged,
/// only the wall-clock representation moves.
pub fn to_display_zone(utc: DateTime<Utc>) -> DateTime<FixedOffset> {
    utc.with_timezone(&display_offset())
}
