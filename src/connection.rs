//! The wire collaborator this crate executes against.
//!
//! Connection establishment, pooling and transactions live elsewhere; a query only needs a
//! handle that can run a command string and stream back its result.

use std::borrow::Cow;

use crate::error::{QueryError, WireError};
use crate::formatter::format_query;
use crate::options::{ConnectionOption, QueryParameterOption};
use crate::params::QueryParameter;
use crate::query_builder::QueryBuilder;

/// Column metadata as reported by the wire; the name is undecoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// `None` when the server sent no name at all.
    pub name: Option<Vec<u8>>,
    pub type_tag: u32,
}

/// One row as borrowed from the transport buffer; `None` marks a NULL cell.
///
/// The slices are only valid until the next `fetch_row` call.
pub type RawRow<'a> = Vec<Option<&'a [u8]>>;

/// An established connection that can run one command at a time.
pub trait WireConnection {
    type Result: StreamingResult;

    /// Send a command.
    ///
    /// # Errors
    /// Returns the wire's error when the command could not be sent or was rejected.
    fn send_command(&mut self, command: &str) -> Result<(), WireError>;

    /// Message for the most recent failure on this connection.
    fn last_error_message(&self) -> String;

    /// Rows affected by the last command; `u64::MAX` when not applicable.
    fn affected_rows(&self) -> u64;

    fn last_insert_id(&self) -> u64;

    /// Columns the last command produced, whether or not a result set was acquired.
    fn field_count(&self) -> u32;

    /// Start streaming the last command's result; `None` if there is none to stream.
    fn use_result(&mut self) -> Option<Self::Result>;

    /// Release a result handle acquired through `use_result`.
    fn free_result(&mut self, result: Self::Result);
}

/// A result set read row by row.
pub trait StreamingResult {
    fn num_fields(&self) -> usize;

    /// Metadata of every column, or `None` if the wire could not supply it.
    fn fetch_fields(&mut self) -> Option<Vec<RawField>>;

    /// Next row; `Ok(None)` at the end of the result.
    ///
    /// # Errors
    /// Returns the wire's error when a row could not be read.
    fn fetch_row(&mut self) -> Result<Option<RawRow<'_>>, WireError>;
}

/// A wire connection paired with its default options.
///
/// ```rust,no_run
/// use wirequery::prelude::*;
///
/// wirequery::query_record! {
///     #[derive(Debug)]
///     pub struct User {
///         pub id: i64,
///         pub name: String,
///     }
/// }
///
/// fn load<C: WireConnection>(conn: &mut Connection<C>) -> Result<Vec<User>, QueryError> {
///     conn.query("SELECT * FROM ?? WHERE id = ?")
///         .params(&["users".into(), 42.into()])
///         .rows::<User>()
/// }
/// ```
#[derive(Debug)]
pub struct Connection<C> {
    wire: C,
    option: ConnectionOption,
}

impl<C: WireConnection> Connection<C> {
    /// Wrap a wire connection
    ///
    /// # Arguments
    ///
    /// * `wire` - The established wire connection
    /// * `option` - Defaults applied to every query unless overridden per call
    ///
    /// # Returns
    ///
    /// A new `Connection` owning `wire`
    #[must_use]
    pub fn new(wire: C, option: ConnectionOption) -> Self {
        Self { wire, option }
    }

    #[must_use]
    pub fn option(&self) -> &ConnectionOption {
        &self.option
    }

    pub fn set_option(&mut self, option: ConnectionOption) {
        self.option = option;
    }

    #[must_use]
    pub fn wire(&self) -> &C {
        &self.wire
    }

    pub fn wire_mut(&mut self) -> &mut C {
        &mut self.wire
    }

    /// Give back the wire connection.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.wire
    }

    /// Start a query against this connection
    ///
    /// # Arguments
    ///
    /// * `template` - Statement text with `?` value and `??` identifier placeholders
    ///
    /// # Returns
    ///
    /// A `QueryBuilder` to bind parameters and run the statement
    pub fn query<'q>(&mut self, template: &'q str) -> QueryBuilder<'_, 'q, C> {
        QueryBuilder::new(self, template)
    }

    /// Format a template with the connection's time zone without executing it.
    ///
    /// # Errors
    /// Returns `QueryError::Format` on placeholder/parameter mismatches.
    pub fn format<'a>(
        &self,
        template: &'a str,
        params: &[QueryParameter],
    ) -> Result<Cow<'a, str>, QueryError> {
        format_query(template, params, &self.option.parameter_option())
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut C, &ConnectionOption) {
        (&mut self.wire, &self.option)
    }

    /// Per-call option, falling back to the connection's zone.
    pub(crate) fn resolve_option(
        &self,
        call: Option<QueryParameterOption>,
    ) -> QueryParameterOption {
        call.unwrap_or_else(|| self.option.parameter_option())
    }
}
