/// MessagePack extension type used by the producer for timestamps.
pub const TIME_EXT_TYPE: i8 = -1;

/// Nanoseconds per second; a decoded remainder must stay below this.
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// `max_rows` value meaning "whole table in one message".
pub const NO_ROW_LIMIT: usize = 0;

/// Top-level message keys.
pub mod message_keys {
    pub const COLUMNS: &str = "columns";
    pub const SLICE_COLS: &str = "slice_cols";
    pub const LABEL_COLS: &str = "label_cols";
}

/// Per-column payload keys.
pub mod column_keys {
    pub const NAME: &str = "name";
    pub const DTYPE: &str = "dtype";
    pub const VALUE: &str = "value";
    pub const SIZE: &str = "size";

    pub const INTS: &str = "ints";
    pub const FLOATS: &str = "floats";
    pub const STRINGS: &str = "strings";
    /// Time extension blobs (Go producers).
    pub const TIMES: &str = "times";
    /// Raw i64 nanoseconds since epoch (what we emit).
    pub const NS_TIMES: &str = "ns_times";
}

/// Informational `dtype` strings, mirrored from the server.
pub mod dtypes {
    pub const INT: &str = "[]int";
    pub const FLOAT: &str = "[]float";
    pub const STRING: &str = "[]string";
    pub const TIME: &str = "[]time.Time";
}
