use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::constants::column_keys;
use crate::table::WireType;

/// Slice payload data: exactly one typed array per column.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceData<'a> {
    Ints(&'a [i64]),
    Floats(&'a [f64]),
    Strings(&'a [String]),
    /// Times as raw i64 nanoseconds since epoch.
    NsTimes(Vec<i64>),
}

impl SliceData<'_> {
    pub fn key(&self) -> &'static str {
        match self {
            SliceData::Ints(_)    => column_keys::INTS,
            SliceData::Floats(_)  => column_keys::FLOATS,
            SliceData::Strings(_) => column_keys::STRINGS,
            SliceData::NsTimes(_) => column_keys::NS_TIMES,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SliceData::Ints(v)    => v.len(),
            SliceData::Floats(v)  => v.len(),
            SliceData::Strings(v) => v.len(),
            SliceData::NsTimes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slice data fields a decoder understands, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceField {
    Ints,
    Floats,
    Strings,
    /// Time extension blobs.
    Times,
    /// Raw i64 nanoseconds.
    NsTimes,
}

impl SliceField {
    /// First present field wins.
    pub const DECODE_PRIORITY: [SliceField; 5] = [
        SliceField::Ints,
        SliceField::Floats,
        SliceField::Strings,
        SliceField::Times,
        SliceField::NsTimes,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            SliceField::Ints    => column_keys::INTS,
            SliceField::Floats  => column_keys::FLOATS,
            SliceField::Strings => column_keys::STRINGS,
            SliceField::Times   => column_keys::TIMES,
            SliceField::NsTimes => column_keys::NS_TIMES,
        }
    }

    pub const fn wire_type(self) -> WireType {
        match self {
            SliceField::Ints    => WireType::Int,
            SliceField::Floats  => WireType::Float,
            SliceField::Strings => WireType::String,
            SliceField::Times | SliceField::NsTimes => WireType::Time,
        }
    }
}

/// Wire-native scalar of a label column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireScalar<'a> {
    Int(i64),
    Float(f64),
    String(&'a str),
    NsTime(i64),
}

impl Serialize for WireScalar<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            WireScalar::Int(v) | WireScalar::NsTime(v) => s.serialize_i64(*v),
            WireScalar::Float(v) => s.serialize_f64(*v),
            WireScalar::String(v) => s.serialize_str(v),
        }
    }
}

/// `{ name, dtype, <ints|floats|strings|ns_times>: [...] }`
#[derive(Debug, Clone, PartialEq)]
pub struct SliceCol<'a> {
    pub name: &'a str,
    pub dtype: &'static str,
    pub data: SliceData<'a>,
}

impl Serialize for SliceCol<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut st = s.serialize_struct("SliceCol", 3)?;
        st.serialize_field(column_keys::NAME, self.name)?;
        st.serialize_field(column_keys::DTYPE, self.dtype)?;
        match &self.data {
            SliceData::Ints(v)    => st.serialize_field(column_keys::INTS, v)?,
            SliceData::Floats(v)  => st.serialize_field(column_keys::FLOATS, v)?,
            SliceData::Strings(v) => st.serialize_field(column_keys::STRINGS, v)?,
            SliceData::NsTimes(v) => st.serialize_field(column_keys::NS_TIMES, v)?,
        }
        st.end()
    }
}

/// `{ name, dtype, value, size }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCol<'a> {
    pub name: &'a str,
    pub dtype: &'static str,
    pub value: WireScalar<'a>,
    pub size: u64,
}

/// One encoded column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPayload<'a> {
    Slice(SliceCol<'a>),
    Label(LabelCol<'a>),
}

impl<'a> ColumnPayload<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            ColumnPayload::Slice(c) => c.name,
            ColumnPayload::Label(c) => c.name,
        }
    }
}

/// One wire message. Maps are ordered by name so equal tables encode to
/// equal bytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WireMessage<'a> {
    pub columns: Vec<&'a str>,
    pub slice_cols: BTreeMap<&'a str, SliceCol<'a>>,
    pub label_cols: BTreeMap<&'a str, LabelCol<'a>>,
}

impl<'a> WireMessage<'a> {
    /// Append a column, keeping declared order.
    pub fn push(&mut self, payload: ColumnPayload<'a>) {
        let name = payload.name();
        self.columns.push(name);
        match payload {
            ColumnPayload::Slice(c) => {
                self.slice_cols.insert(name, c);
            }
            ColumnPayload::Label(c) => {
                self.label_cols.insert(name, c);
            }
        }
    }
}

#[derive(Debug)]
pub enum MessageError {
    /// Declared column resolves in neither map, or carries no data field.
    MissingColumnData { column: String },

    /// Structurally invalid message.
    Malformed(String),

    /// MessagePack decoding failed.
    Decode(rmpv::decode::Error),

    /// MessagePack encoding failed.
    Encode(rmp_serde::encode::Error),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MessageError::*;
        match self {
            MissingColumnData { column } =>
                write!(f, "no data for column {:?}", column),
            Malformed(msg) =>
                write!(f, "malformed message: {}", msg),
            Decode(e) =>
                write!(f, "msgpack decode failed: {}", e),
            Encode(e) =>
                write!(f, "msgpack encode failed: {}", e),
        }
    }
}

impl std::error::Error for MessageError {}

impl From<rmpv::decode::Error> for MessageError {
    fn from(e: rmpv::decode::Error) -> Self {
        MessageError::Decode(e)
    }
}

impl From<rmp_serde::encode::Error> for MessageError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        MessageError::Encode(e)
    }
}
