//! Frame message codec.
//!
//! Responsibilities:
//! - Column payloads (slice vs label) and their field-key dispatch
//! - One table <-> one MessagePack map with `columns`, `slice_cols`, `label_cols`
//! - Skipping messages that declare no columns
//!
//! Non-responsibilities:
//! - Chunking and stream framing (see `stream`)
//! - Transport

pub mod types;
pub mod column;
pub mod encode;
pub mod decode;

pub use types::{
    ColumnPayload,
    LabelCol,
    MessageError,
    SliceCol,
    SliceData,
    SliceField,
    WireMessage,
    WireScalar,
};
pub use column::{
    decode_label_column,
    decode_slice_column,
    encode_column,
};
pub use encode::{
    build_message,
    encode_table,
    serialize_message,
};
pub use decode::{
    decode_message,
    decode_message_bytes,
    read_message,
};
