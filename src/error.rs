use thiserror::Error;

/// Maximum number of characters of a command or raw value carried in an error.
pub const ERROR_DETAIL_LIMIT: usize = 1000;

/// Failure reported by the wire collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct WireError {
    pub message: String,
}

impl WireError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Every way a query can fail, from template formatting to row decoding.
///
/// No variant is recovered from inside the crate; the first failing stage decides which one
/// reaches the caller.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query format error: {0}")]
    Format(String),

    #[error("Query execution error: {message} (query: {query})")]
    QueryExecution { message: String, query: String },

    #[error("Result fetch error: {message} (query: {query})")]
    ResultFetch { message: String, query: String },

    #[error("Result has no fields (query: {query})")]
    ResultNoField { query: String },

    #[error("Result field fetch error (query: {query})")]
    ResultFieldFetch { query: String },

    #[error("Result row fetch error: {message} (query: {query})")]
    ResultRowFetch { message: String, query: String },

    #[error("Result parse error: {message} (result: {result})")]
    ResultParse { message: String, result: String },

    #[error("Decode error on column `{column}`: {message} (value: {value})")]
    Decode {
        column: String,
        message: String,
        value: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    pub(crate) fn decode(
        column: impl Into<String>,
        message: impl Into<String>,
        value: &str,
    ) -> Self {
        QueryError::Decode {
            column: column.into(),
            message: message.into(),
            value: truncate_chars(value, ERROR_DETAIL_LIMIT).to_string(),
        }
    }
}

/// Prefix of `s` holding at most `max` characters, cut on a char boundary.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
