/// Timezone value meaning "local time, offset unknown".
pub const UNSPECIFIED_TIMEZONE: i16 = 0x07FF;

/// Time of day as reported by the firmware clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Offset from UTC in minutes, `None` if unspecified.
    pub timezone: Option<i16>,
}

impl WallClock {
    /// Builds a clock reading from raw firmware fields.
    #[must_use]
    pub const fn new(hour: u8, minute: u8, second: u8, timezone: i16) -> Self {
        Self {
            hour,
            minute,
            second,
            timezone: if timezone == UNSPECIFIED_TIMEZONE {
                None
            } else {
                Some(timezone)
            },
        }
    }
}
