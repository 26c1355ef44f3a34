use std::fmt;

use chrono::{DateTime, Utc};
use num_enum::TryFromPrimitive;

use crate::constants::NANOS_PER_SEC;

/// Extension payload layouts, keyed by their byte length.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum TimeLayout {
    /// `[ secs u32 BE ]`
    Secs32 = 4,
    /// `[ nanos:30 | secs:34 ]` packed into one u64 BE
    Packed64 = 8,
    /// `[ nanos u32 BE ][ secs u64 BE ]`
    Wide96 = 12,
}

impl TimeLayout {
    /// Dispatch on payload length only.
    pub fn from_len(len: usize) -> Result<Self, TimeError> {
        u8::try_from(len)
            .ok()
            .and_then(|l| TimeLayout::try_from(l).ok())
            .ok_or(TimeError::UnknownTimeEncoding { len })
    }

    #[inline(always)]
    pub const fn len(self) -> usize {
        self as usize
    }
}

/// Point in time: seconds since the unix epoch plus a nanosecond remainder.
///
/// `nanos` is always in `0..1_000_000_000`; negative instants carry the sign
/// in `secs` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    pub const UNIX_EPOCH: Timestamp = Timestamp { secs: 0, nanos: 0 };

    pub fn new(secs: i64, nanos: u32) -> Result<Self, TimeError> {
        if nanos >= NANOS_PER_SEC {
            return Err(TimeError::NanosOutOfRange { nanos });
        }
        Ok(Self { secs, nanos })
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self { secs, nanos: 0 }
    }

    /// Build from raw nanoseconds since epoch (the producer-side representation).
    pub fn from_unix_nanos(ns: i64) -> Self {
        let per_sec = NANOS_PER_SEC as i64;
        Self {
            secs: ns.div_euclid(per_sec),
            nanos: ns.rem_euclid(per_sec) as u32,
        }
    }

    /// Raw nanoseconds since epoch; `None` outside roughly 1677..2262.
    pub fn checked_unix_nanos(&self) -> Option<i64> {
        let ns = self.secs as i128 * NANOS_PER_SEC as i128 + self.nanos as i128;
        i64::try_from(ns).ok()
    }

    pub fn to_unix_nanos(&self) -> Result<i64, TimeError> {
        self.checked_unix_nanos()
            .ok_or(TimeError::OutOfRange { secs: self.secs })
    }

    #[inline]
    pub const fn secs(&self) -> i64 {
        self.secs
    }

    #[inline]
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.secs, self.nanos)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        // Leap seconds show up as nanos >= 1s; fold them into the next second.
        let nanos = dt.timestamp_subsec_nanos();
        Self {
            secs: dt.timestamp() + (nanos / NANOS_PER_SEC) as i64,
            nanos: nanos % NANOS_PER_SEC,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)),
            None => write!(f, "{}.{:09}s", self.secs, self.nanos),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Extension payload length is not one of 4, 8 or 12.
    UnknownTimeEncoding { len: usize },

    /// Nanosecond remainder is not below one second.
    NanosOutOfRange { nanos: u32 },

    /// Instant cannot be represented as i64 nanoseconds.
    OutOfRange { secs: i64 },
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TimeError::*;
        match self {
            UnknownTimeEncoding { len } =>
                write!(f, "unknown time message length: {}", len),
            NanosOutOfRange { nanos } =>
                write!(f, "nanosecond remainder out of range: {}", nanos),
            OutOfRange { secs } =>
                write!(f, "time out of nanosecond range: {}s", secs),
        }
    }
}

impl std::error::Error for TimeError {}
