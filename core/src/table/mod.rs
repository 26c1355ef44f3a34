//! In-memory tables.
//!
//! Responsibilities:
//! - Typed cells, columns and tables
//! - Scalar type resolution at the schemaless boundary
//! - Row-bounded chunking for the write path
//!
//! Non-responsibilities:
//! - Wire layout
//! - IO

pub mod types;
pub mod resolve;
pub mod chunk;

pub use types::{
    Column,
    ColumnData,
    Table,
    TableError,
    Value,
    WireType,
};
pub use resolve::{
    dynamic_type_name,
    resolve_wire_type,
};
pub use chunk::{
    chunk_bounds,
    chunk_table,
    IntoTableChunks,
    TableChunks,
};
