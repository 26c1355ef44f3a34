//! Mutable counters collected while encoding or decoding a message stream.
//!
//! Converted into an immutable `TelemetrySnapshot` at stream end.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::message::WireMessage;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecCounters {
    pub messages_encoded: u64,
    pub messages_decoded: u64,
    /// Messages that declared no columns.
    pub messages_skipped: u64,
    pub rows_encoded: u64,
    pub rows_decoded: u64,
    pub slice_columns: u64,
    pub label_columns: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
}

impl CodecCounters {
    /// Record one encoded message.
    ///
    /// - `rows`: rows of the chunk the message carries
    /// - `msg`: the assembled wire message (slice/label split)
    /// - `encoded_len`: serialized length in bytes
    pub fn add_encoded(&mut self, rows: usize, msg: &WireMessage<'_>, encoded_len: usize) {
        self.messages_encoded += 1;
        self.rows_encoded += rows as u64;
        self.slice_columns += msg.slice_cols.len() as u64;
        self.label_columns += msg.label_cols.len() as u64;
        self.bytes_encoded += encoded_len as u64;
    }

    /// Record one decoded, non-empty message.
    pub fn add_decoded(&mut self, rows: usize, encoded_len: usize) {
        self.messages_decoded += 1;
        self.rows_decoded += rows as u64;
        self.bytes_decoded += encoded_len as u64;
    }

    /// Record one message skipped for declaring no columns.
    pub fn add_skipped(&mut self, encoded_len: usize) {
        self.messages_skipped += 1;
        self.bytes_decoded += encoded_len as u64;
    }

    /// Share of encoded columns sent as labels, in `[0, 1]`.
    pub fn label_ratio(&self) -> f64 {
        let total = self.slice_columns + self.label_columns;
        if total == 0 {
            0.0
        } else {
            self.label_columns as f64 / total as f64
        }
    }

    pub fn merge(&mut self, other: &CodecCounters) {
        self.messages_encoded += other.messages_encoded;
        self.messages_decoded += other.messages_decoded;
        self.messages_skipped += other.messages_skipped;
        self.rows_encoded += other.rows_encoded;
        self.rows_decoded += other.rows_decoded;
        self.slice_columns += other.slice_columns;
        self.label_columns += other.label_columns;
        self.bytes_encoded += other.bytes_encoded;
        self.bytes_decoded += other.bytes_decoded;
    }
}

impl AddAssign for CodecCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
