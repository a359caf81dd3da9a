//! MS-DOS date/time encoding used by ZIP headers.
//!
//! ```text
//! time: bits 15-11 hour, bits 10-5 minute, bits 4-0 second / 2
//! date: bits 15-9 year - 1980, bits 8-5 month, bits 4-0 day
//! ```

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};

/// First year representable in the DOS date field.
const MIN_YEAR: i32 = 1980;

/// Last year representable in the DOS date field (7-bit offset).
const MAX_YEAR: i32 = 2107;

/// A packed DOS timestamp with 2-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// The earliest representable value, 1980-01-01 00:00:00.
    pub const EPOCH: DosDateTime = DosDateTime {
        time: 0,
        date: (1 << 5) | 1,
    };

    /// Pack a calendar date/time. Seconds are truncated to an even value.
    ///
    /// Dates before 1980 become [`DosDateTime::EPOCH`]; dates after 2107 are
    /// pinned to 2107-12-31 23:59:58.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        if dt.year() < MIN_YEAR {
            return Self::EPOCH;
        }
        if dt.year() > MAX_YEAR {
            return Self::pack(MAX_YEAR, 12, 31, 23, 59, 58);
        }

        Self::pack(
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
        )
    }

    /// Current local wall-clock time.
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    fn pack(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        // Leap seconds surface as 60 in some sources
        let second = second.min(59);
        let time = (hour << 11) | (minute << 5) | (second / 2);
        let date = (((year - MIN_YEAR) as u32) << 9) | (month << 5) | day;
        Self {
            time: time as u16,
            date: date as u16,
        }
    }

    /// Unpack back into a calendar value (used for diagnostics and tests).
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        let year = MIN_YEAR + (self.date >> 9) as i32;
        let month = ((self.date >> 5) & 0x0F) as u32;
        let day = (self.date & 0x1F) as u32;
        let hour = (self.time >> 11) as u32;
        let minute = ((self.time >> 5) & 0x3F) as u32;
        let second = ((self.time & 0x1F) * 2) as u32;

        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
    }
}
