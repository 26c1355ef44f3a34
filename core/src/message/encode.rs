use bytes::Bytes;

use crate::message::column::encode_column;
use crate::message::types::{MessageError, WireMessage};
use crate::table::types::Table;
use crate::types::FramesError;

/// Assemble the wire message for one table, preserving column order.
pub fn build_message(table: &Table) -> Result<WireMessage<'_>, FramesError> {
    let mut msg = WireMessage::default();
    for column in table.columns() {
        msg.push(encode_column(column)?);
    }
    Ok(msg)
}

/// Encode one table as one self-delimiting MessagePack map.
///
/// Layout:
/// ```text
/// { "columns":    [name, ...],
///   "slice_cols": { name: { name, dtype, ints|floats|strings|ns_times: [...] } },
///   "label_cols": { name: { name, dtype, value, size } } }
/// ```
pub fn encode_table(table: &Table) -> Result<Bytes, FramesError> {
    serialize_message(&build_message(table)?)
}

/// Serialize an assembled message with named map keys.
pub fn serialize_message(msg: &WireMessage<'_>) -> Result<Bytes, FramesError> {
    let buf = rmp_serde::to_vec_named(msg).map_err(MessageError::from)?;
    Ok(Bytes::from(buf))
}
