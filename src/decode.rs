//! Decoding rows into caller-defined records.
//!
//! A record implements [`FromRow`] by looking its members up by column name; each member
//! type implements [`FromField`] to convert one cell. [`query_record!`](crate::query_record)
//! writes the `FromRow` impl for plain structs.

use std::fmt;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::error::QueryError;
use crate::numeric::Numeric;
use crate::results::RowResult;
use crate::types::FieldValue;

/// Why a single cell could not be converted. The row decoder adds the column and raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecodeError(String);

impl FieldDecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for FieldDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for FieldDecodeError {}

/// A type one cell can be converted into.
pub trait FromField: Sized {
    /// # Errors
    /// Returns `FieldDecodeError` for `Null` (unless `Self` is optional) and for values that do
    /// not parse as `Self`.
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError>;
}

/// A record that can be built from a row by named column lookup.
pub trait FromRow: Sized {
    /// # Errors
    /// Returns `QueryError::Decode` when a column is missing or does not convert.
    fn from_row(row: &RowResult) -> Result<Self, QueryError>;
}

/// Record with no members; decoding it ignores the row entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyRow;

impl FromRow for EmptyRow {
    fn from_row(_row: &RowResult) -> Result<Self, QueryError> {
        Ok(EmptyRow)
    }
}

impl FromRow for RowResult {
    fn from_row(row: &RowResult) -> Result<Self, QueryError> {
        Ok(row.clone())
    }
}

fn text(value: &FieldValue) -> Result<&str, FieldDecodeError> {
    match value {
        FieldValue::Null => Err(FieldDecodeError::new(
            "NULL in a non-optional member",
        )),
        other => other
            .string()
            .map_err(|_| FieldDecodeError::new("value is not valid UTF-8 text")),
    }
}

impl<T: FromField> FromField for Option<T> {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field(other).map(Some),
        }
    }
}

impl FromField for FieldValue {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        Ok(value.clone())
    }
}

impl FromField for String {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        text(value).map(str::to_string)
    }
}

impl FromField for Vec<u8> {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        value
            .bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| FieldDecodeError::new("NULL in a non-optional member"))
    }
}

impl FromField for bool {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        // BIT(1) columns arrive as a single raw byte.
        if let FieldValue::Raw(bytes) = value
            && let [b @ (0 | 1)] = bytes.as_slice()
        {
            return Ok(*b == 1);
        }
        match text(value)?.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            s if s.eq_ignore_ascii_case("true") => Ok(true),
            s if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(FieldDecodeError::new("not a boolean")),
        }
    }
}

macro_rules! from_field_parse {
    ($($t:ty => $what:literal),* $(,)?) => {
        $(
            impl FromField for $t {
                fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
                    text(value)?
                        .trim()
                        .parse::<$t>()
                        .map_err(|e| FieldDecodeError::new(format!(concat!("not ", $what, ": {}"), e)))
                }
            }
        )*
    };
}

from_field_parse!(
    i8 => "an i8",
    i16 => "an i16",
    i32 => "an i32",
    i64 => "an i64",
    i128 => "an i128",
    u8 => "a u8",
    u16 => "a u16",
    u32 => "a u32",
    u64 => "a u64",
    u128 => "a u128",
    f32 => "an f32",
    f64 => "an f64",
    Numeric => "a decimal",
);

impl FromField for Decimal {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        let numeric = Numeric::from_field(value)?;
        Decimal::try_from(&numeric).map_err(FieldDecodeError::new)
    }
}

impl FromField for JsonValue {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        serde_json::from_str(text(value)?)
            .map_err(|e| FieldDecodeError::new(format!("not JSON: {e}")))
    }
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Zone the cell is read in; raw (non-temporal) text columns are taken as UTC.
fn cell_time_zone(value: &FieldValue) -> FixedOffset {
    match value {
        FieldValue::Temporal { time_zone, .. } => *time_zone,
        _ => Utc.fix(),
    }
}

fn parse_naive_datetime(s: &str) -> Result<NaiveDateTime, FieldDecodeError> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    // DATE columns decoded into a datetime member start at midnight.
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| FieldDecodeError::new("not a datetime"))
}

impl FromField for NaiveDateTime {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        parse_naive_datetime(text(value)?)
    }
}

impl FromField for NaiveDate {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        let s = text(value)?.trim();
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| parse_naive_datetime(s).map(|dt| dt.date()))
            .map_err(|_| FieldDecodeError::new("not a date"))
    }
}

impl FromField for NaiveTime {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        NaiveTime::parse_from_str(text(value)?.trim(), "%H:%M:%S%.f")
            .map_err(|_| FieldDecodeError::new("not a time of day"))
    }
}

impl FromField for DateTime<FixedOffset> {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        let naive = NaiveDateTime::from_field(value)?;
        cell_time_zone(value)
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| FieldDecodeError::new("datetime does not exist in the time zone"))
    }
}

impl FromField for DateTime<Utc> {
    fn from_field(value: &FieldValue) -> Result<Self, FieldDecodeError> {
        DateTime::<FixedOffset>::from_field(value).map(|dt| dt.with_timezone(&Utc))
    }
}
