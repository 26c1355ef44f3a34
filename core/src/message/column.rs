use rmpv::Value as DynValue;

use crate::constants::column_keys;
use crate::message::types::{
    ColumnPayload, LabelCol, MessageError, SliceCol, SliceData, SliceField, WireScalar,
};
use crate::table::resolve::{column_from_dynamic_typed, resolve_wire_type, scalar_from_dynamic};
use crate::table::types::{uniform, Column, ColumnData, Value, WireType};
use crate::time::Timestamp;
use crate::types::FramesError;
use crate::utils::{map_get, map_get_str};

// ===== Encode =====

/// Encode one column as a label (all rows equal, at least one row) or a
/// slice payload. Times are written as raw i64 nanoseconds.
pub fn encode_column(column: &Column) -> Result<ColumnPayload<'_>, FramesError> {
    let name = column.name();
    let dtype = column.wire_type().dtype();
    let size = column.len() as u64;

    let label = |value| ColumnPayload::Label(LabelCol { name, dtype, value, size });
    let slice = |data| ColumnPayload::Slice(SliceCol { name, dtype, data });

    let payload = match column.data() {
        ColumnData::Ints(v) => match uniform(v) {
            Some(x) => label(WireScalar::Int(*x)),
            None => slice(SliceData::Ints(v)),
        },
        ColumnData::Floats(v) => match uniform(v) {
            Some(x) => label(WireScalar::Float(*x)),
            None => slice(SliceData::Floats(v)),
        },
        ColumnData::Strings(v) => match uniform(v) {
            Some(x) => label(WireScalar::String(x)),
            None => slice(SliceData::Strings(v)),
        },
        ColumnData::Times(v) => match uniform(v) {
            Some(x) => label(WireScalar::NsTime(x.to_unix_nanos()?)),
            None => slice(SliceData::NsTimes(
                v.iter()
                    .map(Timestamp::to_unix_nanos)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        },
    };
    Ok(payload)
}

// ===== Decode =====

fn as_map<'v>(column: &str, payload: &'v DynValue) -> Result<&'v [(DynValue, DynValue)], MessageError> {
    match payload {
        DynValue::Map(entries) => Ok(entries),
        other => Err(MessageError::Malformed(format!(
            "column {:?}: payload is {}, expected map",
            column,
            crate::table::dynamic_type_name(other)
        ))),
    }
}

/// Rebuild a column from a slice payload.
///
/// Known data fields are tried in `SliceField::DECODE_PRIORITY` order and the
/// first present one wins.
pub fn decode_slice_column(name: &str, payload: &DynValue) -> Result<Column, FramesError> {
    let entries = as_map(name, payload)?;

    for field in SliceField::DECODE_PRIORITY {
        let Some(values) = map_get(entries, field.key()) else {
            continue;
        };
        let DynValue::Array(values) = values else {
            return Err(MessageError::Malformed(format!(
                "column {:?}: field {:?} is not an array",
                name,
                field.key()
            ))
            .into());
        };
        return column_from_dynamic_typed(name, field.wire_type(), values);
    }

    Err(MessageError::MissingColumnData { column: name.to_owned() }.into())
}

/// Rebuild a column from a label payload: `size` copies of `value`.
pub fn decode_label_column(name: &str, payload: &DynValue) -> Result<Column, FramesError> {
    let (cell, size) = label_parts(name, payload)?;
    Ok(Column::repeat(name, &cell, size)?)
}

/// Repeated cell and declared row count of a label payload, before any rows
/// are allocated.
pub(crate) fn label_parts(name: &str, payload: &DynValue) -> Result<(Value, usize), FramesError> {
    let entries = as_map(name, payload)?;

    let value = map_get(entries, column_keys::VALUE)
        .ok_or_else(|| MessageError::MissingColumnData { column: name.to_owned() })?;

    let size = match map_get(entries, column_keys::SIZE) {
        Some(DynValue::Integer(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        None => Some(0),
        Some(_) => None,
    }
    .ok_or_else(|| {
        MessageError::Malformed(format!("column {:?}: label size is not a non-negative integer", name))
    })?;

    // dtype only matters for integer time labels
    let hinted_time = map_get_str(entries, column_keys::DTYPE)
        .and_then(WireType::from_dtype)
        == Some(WireType::Time);

    let wire_type = match value {
        DynValue::Integer(_) if hinted_time => WireType::Time,
        other => resolve_wire_type(other)?,
    };
    let cell = scalar_from_dynamic(name, 0, value, wire_type)?;

    Ok((cell, size))
}
