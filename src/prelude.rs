//! One-line import for writing queries.
//!
//! `use wirequery::prelude::*;` brings in the connection and wire traits, the query builder,
//! parameter and option types, row decoding traits, and the standalone formatter and
//! `execute` entry points.

pub use crate::connection::{Connection, RawField, RawRow, StreamingResult, WireConnection};
pub use crate::decode::{EmptyRow, FieldDecodeError, FromField, FromRow};
pub use crate::error::{QueryError, WireError};
pub use crate::formatter::{Placeholder, escape_identifier, escape_string, format_query};
pub use crate::numeric::Numeric;
pub use crate::options::{ConnectionOption, QueryParameterOption, parse_time_zone};
pub use crate::params::{QueryParameter, SetRecord, ToQueryParameter};
pub use crate::query_builder::QueryBuilder;
pub use crate::results::{RowResult, execute};
pub use crate::types::{FieldDescriptor, FieldValue, QueryStatus, WireType};
