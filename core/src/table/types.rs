use std::collections::TryReserveError;
use std::fmt;
use std::ops::Range;

use crate::constants::{column_keys, dtypes};
use crate::time::Timestamp;

/// Wire type tag of a column.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Int    = 0x01,
    Float  = 0x02,
    String = 0x03,
    Time   = 0x04,
}

impl WireType {
    /// Informational `dtype` string sent with every column payload.
    pub const fn dtype(self) -> &'static str {
        match self {
            WireType::Int    => dtypes::INT,
            WireType::Float  => dtypes::FLOAT,
            WireType::String => dtypes::STRING,
            WireType::Time   => dtypes::TIME,
        }
    }

    /// Slice payload key used when encoding.
    pub const fn slice_key(self) -> &'static str {
        match self {
            WireType::Int    => column_keys::INTS,
            WireType::Float  => column_keys::FLOATS,
            WireType::String => column_keys::STRINGS,
            WireType::Time   => column_keys::NS_TIMES,
        }
    }

    pub fn from_dtype(dtype: &str) -> Option<Self> {
        match dtype {
            dtypes::INT    => Some(WireType::Int),
            dtypes::FLOAT  => Some(WireType::Float),
            dtypes::STRING => Some(WireType::String),
            dtypes::TIME   => Some(WireType::Time),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dtype())
    }
}

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Time(Timestamp),
}

impl Value {
    /// Pure tag -> wire category mapping.
    pub const fn wire_type(&self) -> WireType {
        match self {
            Value::Int(_)    => WireType::Int,
            Value::Float(_)  => WireType::Float,
            Value::String(_) => WireType::String,
            Value::Time(_)   => WireType::Time,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Time(v)
    }
}

/// Typed column storage. The element type is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Strings(Vec<String>),
    Times(Vec<Timestamp>),
}

impl ColumnData {
    pub fn with_capacity(wire_type: WireType, capacity: usize) -> Self {
        match wire_type {
            WireType::Int    => ColumnData::Ints(Vec::with_capacity(capacity)),
            WireType::Float  => ColumnData::Floats(Vec::with_capacity(capacity)),
            WireType::String => ColumnData::Strings(Vec::with_capacity(capacity)),
            WireType::Time   => ColumnData::Times(Vec::with_capacity(capacity)),
        }
    }

    /// `n` copies of `value`. Fails instead of aborting when `n` rows cannot
    /// be allocated.
    pub fn try_repeat(value: &Value, n: usize) -> Result<Self, TryReserveError> {
        Ok(match value {
            Value::Int(v)    => ColumnData::Ints(filled(v, n)?),
            Value::Float(v)  => ColumnData::Floats(filled(v, n)?),
            Value::String(v) => ColumnData::Strings(filled(v, n)?),
            Value::Time(v)   => ColumnData::Times(filled(v, n)?),
        })
    }

    pub const fn wire_type(&self) -> WireType {
        match self {
            ColumnData::Ints(_)    => WireType::Int,
            ColumnData::Floats(_)  => WireType::Float,
            ColumnData::Strings(_) => WireType::String,
            ColumnData::Times(_)   => WireType::Time,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Ints(v)    => v.len(),
            ColumnData::Floats(v)  => v.len(),
            ColumnData::Strings(v) => v.len(),
            ColumnData::Times(v)   => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            ColumnData::Ints(v)    => v.get(index).copied().map(Value::Int),
            ColumnData::Floats(v)  => v.get(index).copied().map(Value::Float),
            ColumnData::Strings(v) => v.get(index).cloned().map(Value::String),
            ColumnData::Times(v)   => v.get(index).copied().map(Value::Time),
        }
    }

    /// Caller guarantees `range` lies within `0..len`.
    pub(crate) fn slice_unchecked(&self, range: Range<usize>) -> Self {
        match self {
            ColumnData::Ints(v)    => ColumnData::Ints(v[range].to_vec()),
            ColumnData::Floats(v)  => ColumnData::Floats(v[range].to_vec()),
            ColumnData::Strings(v) => ColumnData::Strings(v[range].to_vec()),
            ColumnData::Times(v)   => ColumnData::Times(v[range].to_vec()),
        }
    }

    /// Append a value of the matching type; hands the value back otherwise.
    pub fn push(&mut self, value: Value) -> Result<(), Value> {
        match (self, value) {
            (ColumnData::Ints(v), Value::Int(x))       => v.push(x),
            (ColumnData::Floats(v), Value::Float(x))   => v.push(x),
            (ColumnData::Strings(v), Value::String(x)) => v.push(x),
            (ColumnData::Times(v), Value::Time(x))     => v.push(x),
            (_, other) => return Err(other),
        }
        Ok(())
    }

    /// The single repeated value, if there is at least one row and every row
    /// compares equal to the first (NaN never does).
    pub fn uniform_value(&self) -> Option<Value> {
        match self {
            ColumnData::Ints(v)    => uniform(v).copied().map(Value::Int),
            ColumnData::Floats(v)  => uniform(v).copied().map(Value::Float),
            ColumnData::Strings(v) => uniform(v).cloned().map(Value::String),
            ColumnData::Times(v)   => uniform(v).copied().map(Value::Time),
        }
    }
}

fn filled<T: Clone>(value: &T, n: usize) -> Result<Vec<T>, TryReserveError> {
    let mut out = Vec::new();
    out.try_reserve_exact(n)?;
    out.resize(n, value.clone());
    Ok(out)
}

/// First element, if every element compares equal to it.
pub(crate) fn uniform<T: PartialEq>(v: &[T]) -> Option<&T> {
    let (first, rest) = v.split_first()?;
    rest.iter().all(|x| x == first).then_some(first)
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self { name: name.into(), data }
    }

    pub fn ints(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(name, ColumnData::Ints(values))
    }

    pub fn floats(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, ColumnData::Floats(values))
    }

    pub fn strings<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(name, ColumnData::Strings(values.into_iter().map(Into::into).collect()))
    }

    pub fn times(name: impl Into<String>, values: Vec<Timestamp>) -> Self {
        Self::new(name, ColumnData::Times(values))
    }

    /// Label reconstruction: `size` copies of `value`.
    pub fn repeat(name: impl Into<String>, value: &Value, size: usize) -> Result<Self, TableError> {
        let name = name.into();
        match ColumnData::try_repeat(value, size) {
            Ok(data) => Ok(Self::new(name, data)),
            Err(_) => Err(TableError::TooManyRows { column: name, rows: size }),
        }
    }

    /// Build from typed cells; every cell must share the first cell's type.
    pub fn from_values(name: impl Into<String>, values: Vec<Value>) -> Result<Self, TableError> {
        let name = name.into();
        let wire_type = match values.first() {
            Some(v) => v.wire_type(),
            None => return Err(TableError::EmptyColumn { column: name }),
        };

        let mut column = Self::new(name, ColumnData::with_capacity(wire_type, values.len()));
        for value in values {
            column.push(value)?;
        }
        Ok(column)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn into_data(self) -> ColumnData {
        self.data
    }

    #[inline]
    pub fn wire_type(&self) -> WireType {
        self.data.wire_type()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.data.get(index)
    }

    pub fn is_uniform(&self) -> bool {
        self.data.uniform_value().is_some()
    }

    /// Type-checked append.
    pub fn push(&mut self, value: Value) -> Result<(), TableError> {
        let index = self.len();
        self.data.push(value).map_err(|rejected| TableError::TypeMismatch {
            column: self.name.clone(),
            index,
            expected: self.data.wire_type(),
            found: rejected.wire_type().dtype().to_owned(),
        })
    }

    /// Copy of rows `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<Self, TableError> {
        validate_range(&range, self.len())?;
        Ok(self.slice_unchecked(range))
    }

    pub(crate) fn slice_unchecked(&self, range: Range<usize>) -> Self {
        Self {
            name: self.name.clone(),
            data: self.data.slice_unchecked(range),
        }
    }
}

fn validate_range(range: &Range<usize>, len: usize) -> Result<(), TableError> {
    if range.start > range.end || range.end > len {
        return Err(TableError::RowRange {
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(())
}

/// Ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for (i, col) in columns.iter().enumerate() {
                if col.len() != expected {
                    return Err(TableError::LengthMismatch {
                        column: col.name().to_owned(),
                        expected,
                        actual: col.len(),
                    });
                }
                if columns[..i].iter().any(|c| c.name() == col.name()) {
                    return Err(TableError::DuplicateColumn {
                        column: col.name().to_owned(),
                    });
                }
            }
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Sub-table of rows `range`, all columns.
    pub fn slice_rows(&self, range: Range<usize>) -> Result<Self, TableError> {
        validate_range(&range, self.num_rows())?;
        Ok(self.slice_rows_unchecked(range))
    }

    pub(crate) fn slice_rows_unchecked(&self, range: Range<usize>) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| c.slice_unchecked(range.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Value kind outside {int, float, string, time}.
    UnsupportedType { type_name: String },

    /// Element does not match the column's declared type.
    TypeMismatch {
        column: String,
        index: usize,
        expected: WireType,
        found: String,
    },

    /// Unsigned integer above `i64::MAX`.
    IntegerOverflow { column: String, index: usize, value: u64 },

    /// Sibling columns of different lengths.
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    DuplicateColumn { column: String },

    /// No value to take the column type from.
    EmptyColumn { column: String },

    RowRange { start: usize, end: usize, len: usize },

    /// Row count that cannot be allocated.
    TooManyRows { column: String, rows: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TableError::*;
        match self {
            UnsupportedType { type_name } =>
                write!(f, "unsupported type - {}", type_name),
            TypeMismatch { column, index, expected, found } =>
                write!(f, "column {:?} row {}: expected {}, found {}", column, index, expected, found),
            IntegerOverflow { column, index, value } =>
                write!(f, "column {:?} row {}: integer {} overflows i64", column, index, value),
            LengthMismatch { column, expected, actual } =>
                write!(f, "column {:?} length mismatch: expected {}, got {}", column, expected, actual),
            DuplicateColumn { column } =>
                write!(f, "duplicate column {:?}", column),
            EmptyColumn { column } =>
                write!(f, "column {:?} has no values to infer a type from", column),
            RowRange { start, end, len } =>
                write!(f, "row range {}..{} out of bounds for {} rows", start, end, len),
            TooManyRows { column, rows } =>
                write!(f, "column {:?}: cannot allocate {} rows", column, rows),
        }
    }
}

impl std::error::Error for TableError {}
