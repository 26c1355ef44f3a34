use byteorder::{BigEndian, ByteOrder};

use crate::time::types::{TimeLayout, Timestamp};

/// Pick the smallest layout that holds `ts` without loss.
pub fn layout_for(ts: &Timestamp) -> TimeLayout {
    let secs = ts.secs();
    if secs >> 34 == 0 {
        if ts.nanos() == 0 && secs >> 32 == 0 {
            TimeLayout::Secs32
        } else {
            TimeLayout::Packed64
        }
    } else {
        TimeLayout::Wide96
    }
}

/// Encode a `Timestamp` into the legacy extension payload (ext type -1).
///
/// This is the reference encoder for the layouts `decode_time_ext` reads.
/// Messages never carry it: the write path sends raw i64 nanoseconds.
///
/// Layout:
///
/// ```text
/// [ secs u32 ]                 (4)
/// [ nanos:30 | secs:34 ]       (8)
/// [ nanos u32 ][ secs u64 ]    (12)
/// ```
pub fn encode_time_ext(ts: &Timestamp) -> Vec<u8> {
    let layout = layout_for(ts);
    let mut out = vec![0u8; layout.len()];

    match layout {
        TimeLayout::Secs32 => BigEndian::write_u32(&mut out, ts.secs() as u32),
        TimeLayout::Packed64 => {
            BigEndian::write_u64(&mut out, ((ts.nanos() as u64) << 34) | ts.secs() as u64)
        }
        TimeLayout::Wide96 => {
            BigEndian::write_u32(&mut out[0..4], ts.nanos());
            BigEndian::write_u64(&mut out[4..12], ts.secs() as u64);
        }
    }
    out
}
