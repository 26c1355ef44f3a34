//! frames-core
//!
//! Pure Rust codec for columnar frame messages.
//! No network, no async.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Codec layers
pub mod time;
pub mod table;
pub mod message;

// Streams and observability
pub mod stream;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::message::{decode_message, decode_message_bytes, encode_table};
    pub use crate::stream::{encode_tables, read_tables, write_messages, MessageBody, MessageEncoder, TableReader};
    pub use crate::table::{Column, ColumnData, Table, Value, WireType};
    pub use crate::telemetry::{CodecCounters, TelemetrySnapshot};
    pub use crate::time::Timestamp;
    pub use crate::types::FramesError;
}
