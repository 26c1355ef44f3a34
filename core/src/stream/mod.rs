//! Message streams.
//!
//! Responsibilities:
//! - Read path: back-to-back messages -> lazy sequence of tables
//! - Write path: tables -> row-bounded chunks -> encoded messages, as an
//!   iterator or as a `Read` body
//! - Per-stream telemetry
//!
//! Non-responsibilities:
//! - Outer framing (there is none; each message is self-delimiting)
//! - Retries

pub mod reader;
pub mod writer;

pub use reader::{
    read_tables,
    TableReader,
};
pub use writer::{
    encode_tables,
    write_messages,
    MessageBody,
    MessageEncoder,
};
