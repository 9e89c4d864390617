use std::fmt;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Column storage type as tagged on the wire (MySQL `enum_field_types`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireType {
    Decimal,
    Tiny,
    Short,
    Long,
    Float,
    Double,
    Null,
    Timestamp,
    LongLong,
    Int24,
    Date,
    Time,
    DateTime,
    Year,
    NewDate,
    VarChar,
    Bit,
    Timestamp2,
    DateTime2,
    Time2,
    Json,
    NewDecimal,
    Enum,
    Set,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Blob,
    VarString,
    String,
    Geometry,
    /// A tag this crate does not know about; kept so metadata is never rejected for it.
    Other(u32),
}

impl WireType {
    #[must_use]
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            0 => WireType::Decimal,
            1 => WireType::Tiny,
            2 => WireType::Short,
            3 => WireType::Long,
            4 => WireType::Float,
            5 => WireType::Double,
            6 => WireType::Null,
            7 => WireType::Timestamp,
            8 => WireType::LongLong,
            9 => WireType::Int24,
            10 => WireType::Date,
            11 => WireType::Time,
            12 => WireType::DateTime,
            13 => WireType::Year,
            14 => WireType::NewDate,
            15 => WireType::VarChar,
            16 => WireType::Bit,
            17 => WireType::Timestamp2,
            18 => WireType::DateTime2,
            19 => WireType::Time2,
            245 => WireType::Json,
            246 => WireType::NewDecimal,
            247 => WireType::Enum,
            248 => WireType::Set,
            249 => WireType::TinyBlob,
            250 => WireType::MediumBlob,
            251 => WireType::LongBlob,
            252 => WireType::Blob,
            253 => WireType::VarString,
            254 => WireType::String,
            255 => WireType::Geometry,
            other => WireType::Other(other),
        }
    }

    #[must_use]
    pub fn tag(self) -> u32 {
        match self {
            WireType::Decimal => 0,
            WireType::Tiny => 1,
            WireType::Short => 2,
            WireType::Long => 3,
            WireType::Float => 4,
            WireType::Double => 5,
            WireType::Null => 6,
            WireType::Timestamp => 7,
            WireType::LongLong => 8,
            WireType::Int24 => 9,
            WireType::Date => 10,
            WireType::Time => 11,
            WireType::DateTime => 12,
            WireType::Year => 13,
            WireType::NewDate => 14,
            WireType::VarChar => 15,
            WireType::Bit => 16,
            WireType::Timestamp2 => 17,
            WireType::DateTime2 => 18,
            WireType::Time2 => 19,
            WireType::Json => 245,
            WireType::NewDecimal => 246,
            WireType::Enum => 247,
            WireType::Set => 248,
            WireType::TinyBlob => 249,
            WireType::MediumBlob => 250,
            WireType::LongBlob => 251,
            WireType::Blob => 252,
            WireType::VarString => 253,
            WireType::String => 254,
            WireType::Geometry => 255,
            WireType::Other(tag) => tag,
        }
    }

    /// Date, time, datetime and timestamp columns.
    #[must_use]
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            WireType::Date
                | WireType::NewDate
                | WireType::DateTime
                | WireType::DateTime2
                | WireType::Time
                | WireType::Time2
                | WireType::Timestamp
                | WireType::Timestamp2
        )
    }
}

/// Metadata for one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub wire_type: WireType,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, wire_type: WireType) -> Self {
        Self {
            name: name.into(),
            wire_type,
        }
    }

    #[must_use]
    pub fn is_temporal(&self) -> bool {
        self.wire_type.is_temporal()
    }
}

/// One cell of a fetched row.
///
/// Bytes are copied out of the transport buffer, so a value outlives the row it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Raw(Vec<u8>),
    /// Text of a temporal column, paired with the zone it is to be read in.
    Temporal { text: String, time_zone: FixedOffset },
}

impl FieldValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text of the cell.
    ///
    /// # Errors
    /// Returns `QueryError::ResultParse` for `Null` or for raw bytes that are not UTF-8.
    pub fn string(&self) -> Result<&str, QueryError> {
        match self {
            FieldValue::Null => Err(QueryError::ResultParse {
                message: "the field is not string.".to_string(),
                result: "null".to_string(),
            }),
            FieldValue::Temporal { text, .. } => Ok(text),
            FieldValue::Raw(bytes) => {
                std::str::from_utf8(bytes).map_err(|_| QueryError::ResultParse {
                    message: "invalid utf8 string bytes.".to_string(),
                    result: String::new(),
                })
            }
        }
    }

    /// Raw bytes of the cell; `None` for `Null`.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Null => None,
            FieldValue::Raw(bytes) => Some(bytes),
            FieldValue::Temporal { text, .. } => Some(text.as_bytes()),
        }
    }

    /// Lossy text used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            FieldValue::Null => "NULL".to_string(),
            FieldValue::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            FieldValue::Temporal { text, .. } => text.clone(),
        }
    }
}

/// Side effects of an executed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryStatus {
    /// `None` when the statement does not affect rows (SELECT) or the count is unknown.
    pub affected_rows: Option<u64>,
    pub inserted_id: u64,
}

impl QueryStatus {
    /// Affected-row counter value that means "not applicable".
    pub const UNKNOWN_AFFECTED_ROWS: u64 = u64::MAX;

    #[must_use]
    pub fn from_counters(affected_rows: u64, inserted_id: u64) -> Self {
        let affected_rows = if affected_rows == Self::UNKNOWN_AFFECTED_ROWS {
            None
        } else {
            Some(affected_rows)
        };
        Self {
            affected_rows,
            inserted_id,
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.affected_rows {
            Some(rows) => write!(f, "insertedID:{}, affectedRows:{rows}", self.inserted_id),
            None => write!(f, "insertedID:{}, affectedRows:nil", self.inserted_id),
        }
    }
}
