use std::ops::Range;

use crate::constants::NO_ROW_LIMIT;
use crate::table::types::Table;

/// Row range of the chunk starting at `offset`, or `None` once the table is
/// covered. `max_rows == 0` means one chunk holding every row.
#[inline]
pub fn chunk_bounds(num_rows: usize, max_rows: usize, offset: usize) -> Option<Range<usize>> {
    if offset >= num_rows {
        return None;
    }
    let step = if max_rows == NO_ROW_LIMIT { num_rows } else { max_rows };
    Some(offset..num_rows.min(offset.saturating_add(step)))
}

/// Lazy row-contiguous chunks of a borrowed table.
#[derive(Debug, Clone)]
pub struct TableChunks<'a> {
    table: &'a Table,
    max_rows: usize,
    offset: usize,
}

impl Iterator for TableChunks<'_> {
    type Item = Table;

    fn next(&mut self) -> Option<Table> {
        let range = chunk_bounds(self.table.num_rows(), self.max_rows, self.offset)?;
        self.offset = range.end;
        Some(self.table.slice_rows_unchecked(range))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = chunk_count(self.table.num_rows().saturating_sub(self.offset), self.max_rows);
        (n, Some(n))
    }
}

impl ExactSizeIterator for TableChunks<'_> {}

/// Split `table` into chunks of at most `max_rows` rows (0 = no limit).
///
/// A table without rows yields no chunks.
pub fn chunk_table(table: &Table, max_rows: usize) -> TableChunks<'_> {
    TableChunks {
        table,
        max_rows,
        offset: 0,
    }
}

/// Owned variant used by the streaming encoder.
///
/// When a single chunk covers the whole table it is handed out without copying.
#[derive(Debug)]
pub struct IntoTableChunks {
    table: Option<Table>,
    max_rows: usize,
    offset: usize,
}

impl IntoTableChunks {
    pub fn new(table: Table, max_rows: usize) -> Self {
        Self {
            table: Some(table),
            max_rows,
            offset: 0,
        }
    }
}

impl Iterator for IntoTableChunks {
    type Item = Table;

    fn next(&mut self) -> Option<Table> {
        let table = self.table.as_ref()?;
        let num_rows = table.num_rows();

        let Some(range) = chunk_bounds(num_rows, self.max_rows, self.offset) else {
            self.table = None;
            return None;
        };
        self.offset = range.end;

        if range.start == 0 && range.end == num_rows {
            return self.table.take();
        }
        let chunk = table.slice_rows_unchecked(range);
        if self.offset >= num_rows {
            self.table = None;
        }
        Some(chunk)
    }
}

impl Table {
    pub fn chunks(&self, max_rows: usize) -> TableChunks<'_> {
        chunk_table(self, max_rows)
    }

    pub fn into_chunks(self, max_rows: usize) -> IntoTableChunks {
        IntoTableChunks::new(self, max_rows)
    }
}

fn chunk_count(rows: usize, max_rows: usize) -> usize {
    match (rows, max_rows) {
        (0, _) => 0,
        (_, NO_ROW_LIMIT) => 1,
        (r, m) => r.div_ceil(m),
    }
}
