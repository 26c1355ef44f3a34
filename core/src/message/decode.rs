use std::io::Read;

use rmpv::Value as DynValue;

use crate::constants::message_keys;
use crate::message::column::{decode_slice_column, label_parts};
use crate::message::types::MessageError;
use crate::table::dynamic_type_name;
use crate::table::types::{Column, Table, TableError, Value};
use crate::types::FramesError;
use crate::utils::map_get;

/// Read exactly one MessagePack value from `r`.
pub fn read_message<R: Read>(r: &mut R) -> Result<DynValue, FramesError> {
    rmpv::decode::read_value(r).map_err(|e| MessageError::Decode(e).into())
}

type Entries = [(DynValue, DynValue)];

fn sub_map<'v>(entries: &'v Entries, key: &str) -> Result<&'v Entries, MessageError> {
    match map_get(entries, key) {
        None => Ok(&[]),
        Some(DynValue::Map(m)) => Ok(m),
        Some(other) => Err(MessageError::Malformed(format!(
            "{:?} is {}, expected map",
            key,
            dynamic_type_name(other)
        ))),
    }
}

fn column_list(entries: &Entries) -> Result<Vec<&str>, MessageError> {
    let Some(DynValue::Array(items)) = map_get(entries, message_keys::COLUMNS) else {
        return Err(MessageError::Malformed(format!(
            "{:?} missing or not an array",
            message_keys::COLUMNS
        )));
    };
    items
        .iter()
        .map(|v| {
            v.as_str().ok_or_else(|| {
                MessageError::Malformed(format!("column name is {}, expected string", dynamic_type_name(v)))
            })
        })
        .collect()
}

/// A declared column before label rows are materialized.
enum Pending {
    Slice(Column),
    Label { cell: Value, size: usize },
}

impl Pending {
    fn rows(&self) -> usize {
        match self {
            Pending::Slice(column) => column.len(),
            Pending::Label { size, .. } => *size,
        }
    }
}

/// Decode one message into a table.
///
/// Declared columns are resolved in order, slice map first; a nil entry counts
/// as absent. Slice columns are decoded before any label is expanded, and
/// every label `size` must agree with the row count they establish (or with
/// the first label when there are no slices). `Ok(None)` means the message
/// declared no columns and should be skipped.
pub fn decode_message(value: &DynValue) -> Result<Option<Table>, FramesError> {
    let DynValue::Map(entries) = value else {
        return Err(MessageError::Malformed(format!(
            "message is {}, expected map",
            dynamic_type_name(value)
        ))
        .into());
    };

    let names = column_list(entries)?;
    let slice_cols = sub_map(entries, message_keys::SLICE_COLS)?;
    let label_cols = sub_map(entries, message_keys::LABEL_COLS)?;

    let mut pending = Vec::with_capacity(names.len());
    for name in &names {
        let column = if let Some(payload) = map_get(slice_cols, name) {
            Pending::Slice(decode_slice_column(name, payload)?)
        } else if let Some(payload) = map_get(label_cols, name) {
            let (cell, size) = label_parts(name, payload)?;
            Pending::Label { cell, size }
        } else {
            return Err(MessageError::MissingColumnData { column: (*name).to_owned() }.into());
        };
        pending.push(column);
    }

    if pending.is_empty() {
        return Ok(None);
    }

    let num_rows = pending
        .iter()
        .find(|p| matches!(p, Pending::Slice(_)))
        .unwrap_or(&pending[0])
        .rows();

    let mut columns = Vec::with_capacity(pending.len());
    for (name, column) in names.into_iter().zip(pending) {
        let column = match column {
            Pending::Slice(column) => column,
            Pending::Label { cell, size } if size == num_rows => Column::repeat(name, &cell, size)?,
            Pending::Label { size, .. } => {
                return Err(TableError::LengthMismatch {
                    column: name.to_owned(),
                    expected: num_rows,
                    actual: size,
                }
                .into());
            }
        };
        columns.push(column);
    }

    Ok(Some(Table::new(columns)?))
}

/// Decode a buffer holding exactly one message.
pub fn decode_message_bytes(buf: &[u8]) -> Result<Option<Table>, FramesError> {
    let mut cursor = buf;
    let value = read_message(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(MessageError::Malformed(format!(
            "{} trailing bytes after message",
            cursor.len()
        ))
        .into());
    }
    decode_message(&value)
}
