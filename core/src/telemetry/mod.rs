//! Codec telemetry: counters, stage timers and immutable snapshots.
//!
//! Counters are plain values owned by one reader or encoder; nothing here is
//! global or shared between streams. Merge them with `merge`/`+=` when a
//! caller drives several streams.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
