//! Scalar type resolution for schemaless values.
//!
//! Typed `Value`s resolve through `Value::wire_type` and cannot fail. This is
//! the boundary where loosely typed MessagePack values enter a typed column.

use rmpv::Value as DynValue;

use crate::constants::TIME_EXT_TYPE;
use crate::table::types::{Column, ColumnData, Table, TableError, Value, WireType};
use crate::time::{decode_time_value, TimeError, Timestamp};
use crate::types::FramesError;

/// Runtime kind of a schemaless value, for error messages.
pub fn dynamic_type_name(value: &DynValue) -> String {
    match value {
        DynValue::Nil          => "nil".into(),
        DynValue::Boolean(_)   => "bool".into(),
        DynValue::Integer(_)   => "int".into(),
        DynValue::F32(_)       => "float32".into(),
        DynValue::F64(_)       => "float64".into(),
        DynValue::String(_)    => "string".into(),
        DynValue::Binary(_)    => "binary".into(),
        DynValue::Array(_)     => "array".into(),
        DynValue::Map(_)       => "map".into(),
        DynValue::Ext(code, _) => format!("ext({})", code),
    }
}

/// Classify one representative value.
///
/// Integer is checked before float, string is exact, and time is the
/// timestamp extension. Anything else is `UnsupportedType`.
pub fn resolve_wire_type(value: &DynValue) -> Result<WireType, TableError> {
    match value {
        DynValue::Integer(_) => Ok(WireType::Int),
        DynValue::F32(_) | DynValue::F64(_) => Ok(WireType::Float),
        DynValue::String(_) => Ok(WireType::String),
        DynValue::Ext(TIME_EXT_TYPE, _) => Ok(WireType::Time),
        other => Err(TableError::UnsupportedType {
            type_name: dynamic_type_name(other),
        }),
    }
}

/// Convert one element into a cell of `wire_type`.
///
/// `Ok(None)` means the element is of another kind; the caller owns the
/// column/row context for the mismatch error. Time cells accept both the
/// extension blob and raw i64 nanoseconds.
pub(crate) fn convert_scalar(
    value: &DynValue,
    wire_type: WireType,
) -> Result<Option<Value>, ScalarFault> {
    let cell = match (wire_type, value) {
        (WireType::Int, DynValue::Integer(i)) => match i.as_i64() {
            Some(v) => Value::Int(v),
            None => return Err(ScalarFault::Overflow(i.as_u64().unwrap_or(u64::MAX))),
        },
        (WireType::Float, DynValue::F64(v)) => Value::Float(*v),
        (WireType::Float, DynValue::F32(v)) => Value::Float(*v as f64),
        (WireType::String, DynValue::String(s)) => match s.as_str() {
            Some(v) => Value::String(v.to_owned()),
            None => return Ok(None),
        },
        (WireType::Time, DynValue::Integer(i)) => match i.as_i64() {
            Some(ns) => Value::Time(Timestamp::from_unix_nanos(ns)),
            None => return Err(ScalarFault::Overflow(i.as_u64().unwrap_or(u64::MAX))),
        },
        (WireType::Time, ext @ DynValue::Ext(..)) => match decode_time_value(ext)? {
            Some(ts) => Value::Time(ts),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };
    Ok(Some(cell))
}

/// Element-level failure that is not a plain kind mismatch.
#[derive(Debug)]
pub(crate) enum ScalarFault {
    Overflow(u64),
    Time(TimeError),
}

impl From<TimeError> for ScalarFault {
    fn from(e: TimeError) -> Self {
        ScalarFault::Time(e)
    }
}

/// Convert one element with column/row context for the error.
pub(crate) fn scalar_from_dynamic(
    column: &str,
    index: usize,
    value: &DynValue,
    wire_type: WireType,
) -> Result<Value, FramesError> {
    match convert_scalar(value, wire_type) {
        Ok(Some(cell)) => Ok(cell),
        Ok(None) => Err(TableError::TypeMismatch {
            column: column.to_owned(),
            index,
            expected: wire_type,
            found: dynamic_type_name(value),
        }
        .into()),
        Err(ScalarFault::Overflow(v)) => Err(TableError::IntegerOverflow {
            column: column.to_owned(),
            index,
            value: v,
        }
        .into()),
        Err(ScalarFault::Time(e)) => Err(e.into()),
    }
}

/// Convert every element of `values` into a column of `wire_type`.
pub(crate) fn column_from_dynamic_typed<'a>(
    name: &str,
    wire_type: WireType,
    values: impl IntoIterator<Item = &'a DynValue>,
) -> Result<Column, FramesError> {
    let values = values.into_iter();
    let mut column = Column::new(name, ColumnData::with_capacity(wire_type, values.size_hint().0));

    for (index, value) in values.enumerate() {
        column.push(scalar_from_dynamic(name, index, value, wire_type)?)?;
    }

    Ok(column)
}

impl Column {
    /// Build a typed column from schemaless values.
    ///
    /// The type comes from the first value; every other value is checked
    /// against it, so a mixed column fails fast instead of truncating.
    pub fn from_dynamic(name: impl Into<String>, values: &[DynValue]) -> Result<Self, FramesError> {
        let name = name.into();
        let first = values
            .first()
            .ok_or_else(|| TableError::EmptyColumn { column: name.clone() })?;
        let wire_type = resolve_wire_type(first)?;
        column_from_dynamic_typed(&name, wire_type, values)
    }
}

impl Table {
    /// Build a table from named columns of schemaless values.
    pub fn from_dynamic<N: Into<String>>(
        columns: impl IntoIterator<Item = (N, Vec<DynValue>)>,
    ) -> Result<Self, FramesError> {
        let columns = columns
            .into_iter()
            .map(|(name, values)| Column::from_dynamic(name, &values))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table::new(columns)?)
    }
}
