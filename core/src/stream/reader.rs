use std::io::{self, BufRead, Read};
use std::time::Instant;

use tracing::{debug, trace};

use crate::message::{decode_message, read_message};
use crate::table::types::Table;
use crate::telemetry::{CodecCounters, Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::FramesError;

/// Byte-counting view over a borrowed reader.
struct Counted<'r, R> {
    inner: &'r mut R,
    n: usize,
}

impl<R: Read> Read for Counted<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.n += n;
        Ok(n)
    }
}

/// True once `r` has no more bytes. Retries interrupted reads.
fn at_eof<R: BufRead>(r: &mut R) -> io::Result<bool> {
    loop {
        match r.fill_buf() {
            Ok(buf) => return Ok(buf.is_empty()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Lazy sequence of tables decoded from back-to-back messages.
///
/// - One message is read and decoded per step; nothing is read ahead.
/// - Messages that declare no columns are skipped.
/// - The first error is yielded once, then the iterator is fused.
/// - The byte stream is owned and dropped with the reader.
#[derive(Debug)]
pub struct TableReader<R> {
    inner: R,
    counters: CodecCounters,
    timer: TelemetryTimer,
    done: bool,
}

impl<R: BufRead> TableReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
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

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn finish(&mut self) {
        self.done = true;
        self.timer.finish();
    }

    /// Next non-empty table, or `Ok(None)` at a clean end of stream.
    fn next_table(&mut self) -> Result<Option<Table>, FramesError> {
        loop {
            if at_eof(&mut self.inner)? {
                return Ok(None);
            }

            let t = Instant::now();
            let mut counted = Counted { inner: &mut self.inner, n: 0 };
            let value = read_message(&mut counted)?;
            let len = counted.n;
            self.timer.record(Stage::Read, t.elapsed());

            match self.timer.time(Stage::Decode, || decode_message(&value))? {
                Some(table) => {
                    self.counters.add_decoded(table.num_rows(), len);
                    trace!(rows = table.num_rows(), columns = table.num_columns(), bytes = len, "message decoded");
                    return Ok(Some(table));
                }
                None => {
                    self.counters.add_skipped(len);
                    debug!(bytes = len, "skipping message without columns");
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for TableReader<R> {
    type Item = Result<Table, FramesError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_table() {
            Ok(Some(table)) => Some(Ok(table)),
            Ok(None) => {
                self.finish();
                None
            }
            Err(e) => {
                debug!(error = %e, "message stream failed");
                self.finish();
                Some(Err(e))
            }
        }
    }
}

/// Decode every table from an in-memory buffer of back-to-back messages.
pub fn read_tables(buf: &[u8]) -> Result<Vec<Table>, FramesError> {
    TableReader::new(buf).collect()
}
