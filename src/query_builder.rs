use std::borrow::Cow;

use crate::connection::{Connection, WireConnection};
use crate::decode::{EmptyRow, FromRow};
use crate::error::QueryError;
use crate::formatter::format_query;
use crate::options::QueryParameterOption;
use crate::params::QueryParameter;
use crate::results::{RowResult, execute};
use crate::types::QueryStatus;

/// Fluent builder for one query: template, parameters, optional per-call option, then one of
/// the terminal operations.
pub struct QueryBuilder<'conn, 'q, C> {
    conn: &'conn mut Connection<C>,
    template: &'q str,
    params: Cow<'q, [QueryParameter]>,
    option: Option<QueryParameterOption>,
}

impl<'conn, 'q, C: WireConnection> QueryBuilder<'conn, 'q, C> {
    pub(crate) fn new(conn: &'conn mut Connection<C>, template: &'q str) -> Self {
        Self {
            conn,
            template,
            params: Cow::Borrowed(&[]),
            option: None,
        }
    }

    /// Provide parameters for this statement, in placeholder order.
    #[must_use]
    pub fn params(mut self, params: &'q [QueryParameter]) -> Self {
        self.params = Cow::Borrowed(params);
        self
    }

    /// Append one parameter.
    #[must_use]
    pub fn bind(mut self, param: impl Into<QueryParameter>) -> Self {
        self.params.to_mut().push(param.into());
        self
    }

    /// Override the connection's time zone for this call only.
    #[must_use]
    pub fn option(mut self, option: QueryParameterOption) -> Self {
        self.option = Some(option);
        self
    }

    /// Execute and return raw rows with the status.
    ///
    /// # Errors
    /// Returns the error of whichever stage failed; no rows are returned alongside an error.
    pub fn raw(self) -> Result<(Vec<RowResult>, QueryStatus), QueryError> {
        let option = self.conn.resolve_option(self.option);
        let command = format_query(self.template, &self.params, &option)?;
        let (wire, conn_option) = self.conn.parts_mut();
        execute(
            wire,
            &command,
            option.time_zone,
            conn_option.omit_details_on_error,
        )
    }

    /// Execute and decode every row into `R`, returning the status too.
    ///
    /// # Errors
    /// Returns the error of whichever stage failed, including `QueryError::Decode`.
    pub fn fetch<R: FromRow>(self) -> Result<(Vec<R>, QueryStatus), QueryError> {
        let (rows, status) = self.raw()?;
        let records = rows
            .iter()
            .map(R::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, status))
    }

    /// Execute and decode every row into `R`.
    ///
    /// # Errors
    /// Same as [`fetch`](Self::fetch).
    pub fn rows<R: FromRow>(self) -> Result<Vec<R>, QueryError> {
        self.fetch().map(|(rows, _)| rows)
    }

    /// Execute for side effects only; any rows are read and discarded.
    ///
    /// # Errors
    /// Same as [`fetch`](Self::fetch).
    pub fn status(self) -> Result<QueryStatus, QueryError> {
        self.fetch::<EmptyRow>().map(|(_, status)| status)
    }

    /// The command this builder would send, without executing it.
    ///
    /// # Errors
    /// Returns `QueryError::Format` on placeholder/parameter mismatches.
    pub fn to_command(&self) -> Result<String, QueryError> {
        let option = self.conn.resolve_option(self.option);
        format_query(self.template, &self.params, &option).map(Cow::into_owned)
    }
}
