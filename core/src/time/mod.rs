//! Time extension codec.
//!
//! Responsibilities:
//! - Define the nanosecond-precision `Timestamp`
//! - Decode the producer's legacy extension layouts (4, 8 and 12 bytes)
//! - Provide a reference encoder for those layouts
//!
//! Non-responsibilities:
//! - Column or message structure
//! - Choosing how times are written into messages (raw nanoseconds, see `message`)

pub mod types;
pub mod encode;
pub mod decode;

pub use types::{
    Timestamp,
    TimeLayout,
    TimeError,
};
pub use encode::{
    encode_time_ext,
    layout_for,
};
pub use decode::{
    decode_time_ext,
    decode_time_value,
};
