//! Query formatting, result fetching and typed row decoding over a MySQL-style wire
//! connection.
//!
//! A template such as `SELECT * FROM ?? WHERE id = ?` is filled with escaped parameters,
//! sent through a [`WireConnection`](connection::WireConnection), streamed back row by row,
//! and decoded into records that implement [`FromRow`](decode::FromRow).

pub mod connection;
pub mod decode;
pub mod error;
pub mod formatter;
pub mod numeric;
pub mod options;
pub mod params;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod types;

mod macros;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use connection::{Connection, WireConnection};
pub use error::QueryError;
pub use types::QueryStatus;
