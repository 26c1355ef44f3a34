use std::io;
use crate::{
    message::MessageError,
    table::TableError,
    time::TimeError,
};


/// Unified codec error over the I/O, time, table and message layers.
/// - Ergonomic `From<T>` impls enable `?` across the layers.
/// - Messages aim to be stable and contextual for logs.
#[derive(Debug)]
pub enum FramesError {
    /// I/O error from the underlying byte stream.
    Io(io::Error),

    /// Time extension error (unknown layout, out-of-range remainder).
    Time(TimeError),

    /// Table-level error (unsupported type, mismatched column, bad shape).
    Table(TableError),

    /// Message-level error (missing column data, malformed structure, wire codec).
    Message(MessageError),
}

impl FramesError {
    /// Column named by a `MissingColumnData` failure, if that is what this is.
    pub fn missing_column(&self) -> Option<&str> {
        match self {
            FramesError::Message(MessageError::MissingColumnData { column }) => Some(column),
            _ => None,
        }
    }
}

impl std::fmt::Display for FramesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FramesError::Io(e) => write!(f, "I/O error: {}", e),
            FramesError::Time(e) => write!(f, "time error: {}", e),
            FramesError::Table(e) => write!(f, "table error: {}", e),
            FramesError::Message(e) => write!(f, "message error: {}", e),
        }
    }
}

impl std::error::Error for FramesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FramesError::Io(e) => Some(e),
            FramesError::Time(e) => Some(e),
            FramesError::Table(e) => Some(e),
            FramesError::Message(e) => Some(e),
        }
    }
}

impl From<io::Error> for FramesError {
    fn from(e: io::Error) -> Self {
        FramesError::Io(e)
    }
}

impl From<TimeError> for FramesError {
    fn from(e: TimeError) -> Self {
        FramesError::Time(e)
    }
}

impl From<TableError> for FramesError {
    fn from(e: TableError) -> Self {
        FramesError::Table(e)
    }
}

impl From<MessageError> for FramesError {
    fn from(e: MessageError) -> Self {
        FramesError::Message(e)
    }
}
