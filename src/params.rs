use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::numeric::Numeric;

/// A value bound to a template placeholder.
///
/// `?` placeholders accept every variant; `??` placeholders accept only `Text`, which is
/// then quoted as an identifier:
/// ```rust
/// use wirequery::prelude::*;
///
/// let params: Vec<QueryParameter> = vec!["users".into(), 42.into(), None::<i64>.into()];
/// assert!(params[2].is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParameter {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Numeric(Numeric),
    Text(String),
    Bytes(Vec<u8>),
    /// Instant rendered in the call's time zone.
    DateTime(DateTime<Utc>),
    /// Wall-clock value rendered as is.
    NaiveDateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Json(JsonValue),
    /// `column = value` pairs, expanded for `UPDATE … SET ?` and `INSERT … SET ?`.
    Set(Vec<(String, QueryParameter)>),
}

impl QueryParameter {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Build a `Set` parameter from a record.
    #[must_use]
    pub fn set<R: SetRecord + ?Sized>(record: &R) -> Self {
        Self::Set(record.set_parameters())
    }

    /// Short name of the variant, used in format errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Numeric(_) => "numeric",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::DateTime(_) | Self::NaiveDateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Json(_) => "json",
            Self::Set(_) => "set",
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Self::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

/// Conversion from a borrowed Rust value into a parameter.
pub trait ToQueryParameter {
    fn to_query_parameter(&self) -> QueryParameter;
}

/// A record whose members can be assigned as a `SET` list.
pub trait SetRecord {
    /// Column/value pairs in declaration order.
    fn set_parameters(&self) -> Vec<(String, QueryParameter)>;
}

impl<T: ToQueryParameter + ?Sized> ToQueryParameter for &T {
    fn to_query_parameter(&self) -> QueryParameter {
        (**self).to_query_parameter()
    }
}

impl<T: ToQueryParameter> ToQueryParameter for Option<T> {
    fn to_query_parameter(&self) -> QueryParameter {
        match self {
            Some(value) => value.to_query_parameter(),
            None => QueryParameter::Null,
        }
    }
}

impl ToQueryParameter for QueryParameter {
    fn to_query_parameter(&self) -> QueryParameter {
        self.clone()
    }
}

impl ToQueryParameter for str {
    fn to_query_parameter(&self) -> QueryParameter {
        QueryParameter::Text(self.to_string())
    }
}

impl ToQueryParameter for DateTime<FixedOffset> {
    fn to_query_parameter(&self) -> QueryParameter {
        QueryParameter::DateTime(self.with_timezone(&Utc))
    }
}

impl ToQueryParameter for Decimal {
    fn to_query_parameter(&self) -> QueryParameter {
        QueryParameter::Numeric(Numeric::from(*self))
    }
}

macro_rules! to_param_clone {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToQueryParameter for $t {
                fn to_query_parameter(&self) -> QueryParameter {
                    QueryParameter::$variant(self.clone())
                }
            }
        )*
    };
}

to_param_clone!(
    bool => Bool,
    i64 => Int,
    u64 => UInt,
    f64 => Float,
    Numeric => Numeric,
    String => Text,
    Vec<u8> => Bytes,
    DateTime<Utc> => DateTime,
    NaiveDateTime => NaiveDateTime,
    NaiveDate => Date,
    NaiveTime => Time,
    JsonValue => Json,
);

macro_rules! to_param_widen {
    ($($t:ty => $variant:ident($wide:ty)),* $(,)?) => {
        $(
            impl ToQueryParameter for $t {
                fn to_query_parameter(&self) -> QueryParameter {
                    QueryParameter::$variant(<$wide>::from(*self))
                }
            }
        )*
    };
}

to_param_widen!(
    i8 => Int(i64),
    i16 => Int(i64),
    i32 => Int(i64),
    u8 => UInt(u64),
    u16 => UInt(u64),
    u32 => UInt(u64),
    f32 => Float(f64),
);

impl<T: ToQueryParameter> From<Option<T>> for QueryParameter {
    fn from(value: Option<T>) -> Self {
        value.to_query_parameter()
    }
}

impl From<&str> for QueryParameter {
    fn from(value: &str) -> Self {
        QueryParameter::Text(value.to_string())
    }
}

impl From<&[u8]> for QueryParameter {
    fn from(value: &[u8]) -> Self {
        QueryParameter::Bytes(value.to_vec())
    }
}

macro_rules! param_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for QueryParameter {
                fn from(value: $t) -> Self {
                    value.to_query_parameter()
                }
            }
        )*
    };
}

param_from!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    Numeric,
    Decimal,
    String,
    Vec<u8>,
    DateTime<Utc>,
    DateTime<FixedOffset>,
    NaiveDateTime,
    NaiveDate,
    NaiveTime,
    JsonValue,
);
