use byteorder::{BigEndian, ByteOrder};
use rmpv::Value;

use crate::constants::TIME_EXT_TYPE;
use crate::time::types::{TimeError, TimeLayout, Timestamp};

const SECS_MASK_34: u64 = 0x0000_0003_FFFF_FFFF;

/// Decode a time extension payload (ext type -1) into a `Timestamp`.
///
/// Layouts, chosen by length only:
///
/// ```text
/// 4  : [ secs u32 ]
/// 8  : [ nanos:30 | secs:34 ]            (one u64)
/// 12 : [ nanos u32 ][ secs u64 ]
/// ```
///
/// All integers are big-endian. Full nanosecond precision is kept.
pub fn decode_time_ext(payload: &[u8]) -> Result<Timestamp, TimeError> {
    match TimeLayout::from_len(payload.len())? {
        TimeLayout::Secs32 => {
            let secs = BigEndian::read_u32(payload);
            Ok(Timestamp::from_secs(secs as i64))
        }
        TimeLayout::Packed64 => {
            let packed = BigEndian::read_u64(payload);
            let nanos = (packed >> 34) as u32;
            let secs = (packed & SECS_MASK_34) as i64;
            Timestamp::new(secs, nanos)
        }
        TimeLayout::Wide96 => {
            let nanos = BigEndian::read_u32(&payload[0..4]);
            // Producer writes the signed seconds through an unsigned field.
            let secs = BigEndian::read_u64(&payload[4..12]) as i64;
            Timestamp::new(secs, nanos)
        }
    }
}

/// Decode a schemaless value that should carry a time.
///
/// Returns `Ok(None)` when the value is not a time extension at all, so the
/// caller can report the type it actually found.
pub fn decode_time_value(value: &Value) -> Result<Option<Timestamp>, TimeError> {
    match value {
        Value::Ext(TIME_EXT_TYPE, payload) => decode_time_ext(payload).map(Some),
        _ => Ok(None),
    }
}
