//! Scripted wire connection for tests.
//!
//! `MockWire` answers each sent command with the next queued `MockResponse`, records every
//! command, and counts acquired and released result handles.

use std::collections::VecDeque;

use crate::connection::{RawField, RawRow, StreamingResult, WireConnection};
use crate::error::WireError;
use crate::types::{QueryStatus, WireType};

/// A result set to stream back.
#[derive(Debug, Clone, Default)]
pub struct MockResult {
    fields: Vec<RawField>,
    num_fields: Option<usize>,
    metadata_missing: bool,
    rows: Vec<Vec<Option<Vec<u8>>>>,
    fail_at_row: Option<usize>,
}

impl MockResult {
    #[must_use]
    pub fn new(fields: &[(&str, WireType)]) -> Self {
        Self::with_raw_fields(
            fields
                .iter()
                .map(|(name, wire_type)| RawField {
                    name: Some(name.as_bytes().to_vec()),
                    type_tag: wire_type.tag(),
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn with_raw_fields(fields: Vec<RawField>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Append a text row; `None` is NULL.
    #[must_use]
    pub fn row(mut self, cells: &[Option<&str>]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|cell| cell.map(|s| s.as_bytes().to_vec()))
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn raw_row(mut self, cells: Vec<Option<Vec<u8>>>) -> Self {
        self.rows.push(cells);
        self
    }

    /// Report this many fields instead of the number of descriptors.
    #[must_use]
    pub fn num_fields(mut self, n: usize) -> Self {
        self.num_fields = Some(n);
        self
    }

    /// Make `fetch_fields` fail.
    #[must_use]
    pub fn without_metadata(mut self) -> Self {
        self.metadata_missing = true;
        self
    }

    /// Fail when row `index` (zero-based) is requested.
    #[must_use]
    pub fn fail_at_row(mut self, index: usize) -> Self {
        self.fail_at_row = Some(index);
        self
    }
}

/// What the wire does with the next command.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reject the command with this message.
    Reject(String),
    /// Succeed without a result set.
    Status { affected_rows: u64, insert_id: u64 },
    /// Succeed with a result set; the affected-row counter reads as the unknown sentinel.
    Rows(MockResult),
    /// Succeed, claim `field_count` columns, but fail to hand out a result handle.
    MissingResult { field_count: u32, message: String },
}

/// Streaming handle produced by [`MockWire`].
#[derive(Debug)]
pub struct MockStream {
    result: MockResult,
    cursor: usize,
}

impl StreamingResult for MockStream {
    fn num_fields(&self) -> usize {
        self.result.num_fields.unwrap_or(self.result.fields.len())
    }

    fn fetch_fields(&mut self) -> Option<Vec<RawField>> {
        if self.result.metadata_missing {
            None
        } else {
            Some(self.result.fields.clone())
        }
    }

    fn fetch_row(&mut self) -> Result<Option<RawRow<'_>>, WireError> {
        if self.result.fail_at_row == Some(self.cursor) {
            return Err(WireError::new("Lost connection to server during query"));
        }
        let Some(row) = self.result.rows.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        Ok(Some(row.iter().map(|cell| cell.as_deref()).collect()))
    }
}

#[derive(Debug, Default)]
pub struct MockWire {
    responses: VecDeque<MockResponse>,
    pending: Option<MockResponse>,
    sent: Vec<String>,
    affected_rows: u64,
    insert_id: u64,
    field_count: u32,
    last_error: String,
    acquired: usize,
    released: usize,
}

impl MockWire {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, response: MockResponse) -> &mut Self {
        self.responses.push_back(response);
        self
    }

    pub fn respond_rows(&mut self, result: MockResult) -> &mut Self {
        self.push(MockResponse::Rows(result))
    }

    pub fn respond_status(&mut self, affected_rows: u64, insert_id: u64) -> &mut Self {
        self.push(MockResponse::Status {
            affected_rows,
            insert_id,
        })
    }

    pub fn reject(&mut self, message: &str) -> &mut Self {
        self.push(MockResponse::Reject(message.to_string()))
    }

    /// Commands sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    #[must_use]
    pub fn acquired(&self) -> usize {
        self.acquired
    }

    #[must_use]
    pub fn released(&self) -> usize {
        self.released
    }
}

impl WireConnection for MockWire {
    type Result = MockStream;

    fn send_command(&mut self, command: &str) -> Result<(), WireError> {
        self.sent.push(command.to_string());
        self.pending = None;
        let response = self
            .responses
            .pop_front()
            .ok_or_else(|| WireError::new("no scripted response"))?;

        match &response {
            MockResponse::Reject(message) => {
                self.last_error.clone_from(message);
                return Err(WireError::new(message.clone()));
            }
            MockResponse::Status {
                affected_rows,
                insert_id,
            } => {
                self.affected_rows = *affected_rows;
                self.insert_id = *insert_id;
                self.field_count = 0;
            }
            MockResponse::Rows(result) => {
                self.affected_rows = QueryStatus::UNKNOWN_AFFECTED_ROWS;
                self.insert_id = 0;
                self.field_count = u32::try_from(result.fields.len()).unwrap_or(u32::MAX);
            }
            MockResponse::MissingResult {
                field_count,
                message,
            } => {
                self.affected_rows = QueryStatus::UNKNOWN_AFFECTED_ROWS;
                self.insert_id = 0;
                self.field_count = *field_count;
                self.last_error.clone_from(message);
            }
        }
        self.pending = Some(response);
        Ok(())
    }

    fn last_error_message(&self) -> String {
        self.last_error.clone()
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    fn last_insert_id(&self) -> u64 {
        self.insert_id
    }

    fn field_count(&self) -> u32 {
        self.field_count
    }

    fn use_result(&mut self) -> Option<MockStream> {
        match self.pending.take()? {
            MockResponse::Rows(result) => {
                self.acquired += 1;
                Some(MockStream { result, cursor: 0 })
            }
            _ => None,
        }
    }

    fn free_result(&mut self, _result: MockStream) {
        self.released += 1;
    }
}
