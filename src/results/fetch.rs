use std::sync::Arc;

use chrono::FixedOffset;

use super::row::{RowResult, build_column_index};
use crate::connection::{StreamingResult, WireConnection};
use crate::error::{ERROR_DETAIL_LIMIT, QueryError, truncate_chars};
use crate::types::{FieldDescriptor, FieldValue, QueryStatus, WireType};

/// Command text included in error messages: a bounded prefix, or nothing when details are
/// suppressed.
#[must_use]
pub fn query_prefix(command: &str, omit_details_on_error: bool) -> String {
    if omit_details_on_error {
        String::new()
    } else {
        truncate_chars(command, ERROR_DETAIL_LIMIT).to_string()
    }
}

/// Run an already formatted command and collect its rows.
///
/// Statements without a result set (INSERT, UPDATE, …) return no rows and their status.
/// Any failure discards the rows read so far. An acquired result handle is released before
/// this function returns, on success and on every error.
///
/// # Errors
/// Returns the `QueryError` kind matching the stage that failed: `QueryExecution` when the
/// command is rejected, then `ResultFetch`, `ResultNoField`, `ResultFieldFetch`,
/// `ResultRowFetch` or `ResultParse` while reading the result.
pub fn execute<C: WireConnection>(
    wire: &mut C,
    command: &str,
    time_zone: FixedOffset,
    omit_details_on_error: bool,
) -> Result<(Vec<RowResult>, QueryStatus), QueryError> {
    let prefix = || query_prefix(command, omit_details_on_error);

    tracing::debug!(query = %prefix(), "sending command");
    if let Err(e) = wire.send_command(command) {
        tracing::warn!(error = %e, "command rejected");
        return Err(QueryError::QueryExecution {
            message: e.message,
            query: prefix(),
        });
    }
    let status = QueryStatus::from_counters(wire.affected_rows(), wire.last_insert_id());

    let Some(mut result) = wire.use_result() else {
        if wire.field_count() == 0 {
            tracing::debug!(%status, "command returned no result set");
            return Ok((Vec::new(), status));
        }
        return Err(QueryError::ResultFetch {
            message: wire.last_error_message(),
            query: prefix(),
        });
    };
    let outcome = read_result(&mut result, command, time_zone, omit_details_on_error);
    wire.free_result(result);

    let rows = outcome?;
    tracing::debug!(rows = rows.len(), %status, "result fetched");
    Ok((rows, status))
}

/// Read field metadata and every row from an acquired result. The caller releases the
/// handle whatever this returns.
fn read_result<R: StreamingResult>(
    result: &mut R,
    command: &str,
    time_zone: FixedOffset,
    omit_details_on_error: bool,
) -> Result<Vec<RowResult>, QueryError> {
    let prefix = || query_prefix(command, omit_details_on_error);

    let field_count = result.num_fields();
    if field_count == 0 {
        return Err(QueryError::ResultNoField { query: prefix() });
    }

    let fields = Arc::new(read_fields(result, field_count).ok_or_else(|| {
        QueryError::ResultFieldFetch { query: prefix() }
    })?);
    tracing::trace!(fields = ?fields, "fetched field metadata");
    let column_index = build_column_index(&fields);

    let mut rows = Vec::new();
    loop {
        let raw = match result.fetch_row() {
            Ok(Some(raw)) => raw,
            Ok(None) => break,
            Err(e) => {
                return Err(QueryError::ResultRowFetch {
                    message: e.message,
                    query: prefix(),
                });
            }
        };
        if raw.len() != field_count {
            return Err(QueryError::ResultParse {
                message: "invalid fetched column count".to_string(),
                result: format!("{} of {field_count} columns", raw.len()),
            });
        }

        let mut values = Vec::with_capacity(field_count);
        for (field, cell) in fields.iter().zip(raw) {
            values.push(field_value(field, cell, time_zone)?);
        }
        rows.push(RowResult::with_index(
            Arc::clone(&fields),
            Arc::clone(&column_index),
            values,
        )?);
    }
    Ok(rows)
}

/// Descriptors for every column; `None` if any name is missing or not UTF-8.
fn read_fields<R: StreamingResult>(result: &mut R, field_count: usize) -> Option<Vec<FieldDescriptor>> {
    let raw_fields = result.fetch_fields()?;
    if raw_fields.len() < field_count {
        return None;
    }
    raw_fields
        .into_iter()
        .take(field_count)
        .map(|raw| {
            let name = String::from_utf8(raw.name?).ok()?;
            Some(FieldDescriptor::new(name, WireType::from_tag(raw.type_tag)))
        })
        .collect()
}

fn field_value(
    field: &FieldDescriptor,
    cell: Option<&[u8]>,
    time_zone: FixedOffset,
) -> Result<FieldValue, QueryError> {
    let Some(bytes) = cell else {
        return Ok(FieldValue::Null);
    };
    let raw = FieldValue::Raw(bytes.to_vec());
    if !field.is_temporal() {
        return Ok(raw);
    }
    let text = raw.string()?.to_string();
    Ok(FieldValue::Temporal { text, time_zone })
}
