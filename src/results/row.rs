use std::collections::HashMap;
use std::sync::Arc;

use crate::decode::FromField;
use crate::error::QueryError;
use crate::types::{FieldDescriptor, FieldValue};

/// Column name to position, shared by every row of one result.
pub(crate) type ColumnIndex = Arc<HashMap<String, usize>>;

pub(crate) fn build_column_index(fields: &[FieldDescriptor]) -> ColumnIndex {
    let mut index = HashMap::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        // First occurrence wins for duplicated names, e.g. `SELECT a.id, b.id`.
        index.entry(field.name.clone()).or_insert(i);
    }
    Arc::new(index)
}

/// A row from a query result
///
/// Pairs the result's field descriptors with one row's values. Both always have the same
/// length.
#[derive(Debug, Clone)]
pub struct RowResult {
    fields: Arc<Vec<FieldDescriptor>>,
    values: Vec<FieldValue>,
    column_index: ColumnIndex,
}

impl RowResult {
    /// Create a row
    ///
    /// # Arguments
    ///
    /// * `fields` - Descriptors shared by every row of the result
    /// * `values` - This row's values, in field order
    ///
    /// # Errors
    ///
    /// Returns `QueryError::ResultParse` if `values` and `fields` differ in length.
    pub fn new(
        fields: Arc<Vec<FieldDescriptor>>,
        values: Vec<FieldValue>,
    ) -> Result<Self, QueryError> {
        let column_index = build_column_index(&fields);
        Self::with_index(fields, column_index, values)
    }

    pub(crate) fn with_index(
        fields: Arc<Vec<FieldDescriptor>>,
        column_index: ColumnIndex,
        values: Vec<FieldValue>,
    ) -> Result<Self, QueryError> {
        if fields.len() != values.len() {
            return Err(QueryError::ResultParse {
                message: "invalid fetched column count".to_string(),
                result: format!("{} fields, {} values", fields.len(), values.len()),
            });
        }
        Ok(Self {
            fields,
            values,
            column_index,
        })
    }

    /// Field descriptors of the result this row belongs to
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the position of a column by name
    ///
    /// # Arguments
    ///
    /// * `column_name` - The name of the column
    ///
    /// # Returns
    ///
    /// The position of the first column with that name, or None if not found
    #[must_use]
    pub fn column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name
    ///
    /// # Arguments
    ///
    /// * `column_name` - The name of the column
    ///
    /// # Returns
    ///
    /// The value at the column, or None if the result has no such column
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&FieldValue> {
        self.column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by position
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based column position
    ///
    /// # Returns
    ///
    /// The value at the position, or None if out of bounds
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    /// Decode the named column into `T`.
    ///
    /// # Errors
    /// Returns `QueryError::Decode` if the column is missing or its value does not convert.
    pub fn decode<T: FromField>(&self, column_name: &str) -> Result<T, QueryError> {
        let value = self
            .get(column_name)
            .ok_or_else(|| QueryError::decode(column_name, "no such column in result", ""))?;
        T::from_field(value)
            .map_err(|e| QueryError::decode(column_name, e.to_string(), &value.describe()))
    }
}
