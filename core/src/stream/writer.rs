use std::io::{self, Read, Write};
use std::time::Instant;

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::message::{build_message, serialize_message};
use crate::table::chunk::IntoTableChunks;
use crate::table::types::Table;
use crate::telemetry::{CodecCounters, Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::FramesError;
use crate::utils::fmt_prefix;

/// Lazy chunk -> encode pipeline over a sequence of tables.
///
/// Every chunk of at most `max_rows` rows (0 = no limit) becomes one
/// independently encoded message. Tables without rows produce nothing.
#[derive(Debug)]
pub struct MessageEncoder<I> {
    tables: I,
    current: Option<IntoTableChunks>,
    max_rows: usize,
    counters: CodecCounters,
    timer: TelemetryTimer,
    done: bool,
}

impl<I: Iterator<Item = Table>> MessageEncoder<I> {
    pub fn new(tables: I, max_rows: usize) -> Self {
        Self {
            tables,
            current: None,
            max_rows,
            counters: CodecCounters::default(),
            timer: TelemetryTimer::new(),
            done: false,
        }
    }

    pub fn counters(&self) -> &CodecCounters {
        &self.counters
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.counters, &self.timer)
    }

    pub(crate) fn record_stage(&mut self, stage: Stage, dur: std::time::Duration) {
        self.timer.record(stage, dur);
    }

    fn encode_chunk(&mut self, chunk: &Table) -> Result<Bytes, FramesError> {
        let t = Instant::now();
        let msg = build_message(chunk)?;
        let buf = serialize_message(&msg)?;
        self.timer.record(Stage::Encode, t.elapsed());

        self.counters.add_encoded(chunk.num_rows(), &msg, buf.len());
        trace!(
            rows = chunk.num_rows(),
            slice = msg.slice_cols.len(),
            label = msg.label_cols.len(),
            bytes = buf.len(),
            head = %fmt_prefix(&buf, 16),
            "message encoded"
        );
        Ok(buf)
    }

    fn next_chunk(&mut self) -> Option<Table> {
        loop {
            if let Some(chunks) = self.current.as_mut() {
                let t = Instant::now();
                let chunk = chunks.next();
                self.timer.record(Stage::Chunk, t.elapsed());
                match chunk {
                    Some(chunk) => return Some(chunk),
                    None => self.current = None,
                }
            }
            let table = self.tables.next()?;
            self.current = Some(table.into_chunks(self.max_rows));
        }
    }
}

impl<I: Iterator<Item = Table>> Iterator for MessageEncoder<I> {
    type Item = Result<Bytes, FramesError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(chunk) = self.next_chunk() else {
            self.done = true;
            self.timer.finish();
            return None;
        };
        let out = self.encode_chunk(&chunk);
        if out.is_err() {
            self.done = true;
            self.timer.finish();
        }
        Some(out)
    }
}

/// Encode `tables` into a lazy sequence of messages.
pub fn encode_tables<I>(tables: I, max_rows: usize) -> MessageEncoder<I::IntoIter>
where
    I: IntoIterator<Item = Table>,
{
    MessageEncoder::new(tables.into_iter(), max_rows)
}

/// `Read` view of a message stream: the concatenation of every encoded
/// message, produced one message at a time.
///
/// Codec failures surface as `io::ErrorKind::InvalidData` wrapping the
/// `FramesError`.
#[derive(Debug)]
pub struct MessageBody<I> {
    encoder: MessageEncoder<I>,
    pending: Bytes,
}

impl<I: Iterator<Item = Table>> MessageBody<I> {
    pub fn new(tables: I, max_rows: usize) -> Self {
        Self {
            encoder: MessageEncoder::new(tables, max_rows),
            pending: Bytes::new(),
        }
    }

    pub fn encoder(&self) -> &MessageEncoder<I> {
        &self.encoder
    }
}

impl<I: Iterator<Item = Table>> Read for MessageBody<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pending.is_empty() {
            match self.encoder.next() {
                None => return Ok(0),
                Some(Ok(msg)) => self.pending = msg,
                Some(Err(e)) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        Ok(n)
    }
}

/// Encode `tables` and write every message to `w`.
pub fn write_messages<W, I>(w: &mut W, tables: I, max_rows: usize) -> Result<TelemetrySnapshot, FramesError>
where
    W: Write,
    I: IntoIterator<Item = Table>,
{
    let mut encoder = encode_tables(tables, max_rows);
    while let Some(msg) = encoder.next() {
        let msg = msg?;
        let t = Instant::now();
        w.write_all(&msg)?;
        encoder.record_stage(Stage::Write, t.elapsed());
    }
    w.flush()?;
    Ok(encoder.snapshot())
}
