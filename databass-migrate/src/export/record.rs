// One row of an export file
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ParseError;
use crate::models::{AttributeValue, Attributes, ColumnKind, EntityType};

/// A parsed export row: column name to raw cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    file: Arc<str>,
    line: u64,
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new(file: Arc<str>, line: u64, fields: HashMap<String, String>) -> Self {
        Self { file, line, fields }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line of the row in its export file (the header is line 1).
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Cell value, with empty cells read as null.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn required(&self, column: &str) -> Result<&str, ParseError> {
        self.get(column).ok_or_else(|| ParseError::MissingValue {
            file: self.file.to_string(),
            line: self.line,
            column: column.to_string(),
        })
    }

    /// Legacy primary key of the row.
    pub fn id(&self) -> Result<&str, ParseError> {
        self.required("id")
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// Node properties for this row: every non-empty cell, typed by the
    /// column layout of `entity`.
    pub fn to_attributes(&self, entity: EntityType) -> Result<Attributes, ParseError> {
        for column in entity.columns().iter().filter(|c| c.required) {
            self.required(column.name)?;
        }

        let mut attributes = Attributes::new();
        for (column, value) in &self.fields {
            if value.is_empty() {
                continue;
            }

            let kind = entity
                .column(column)
                .map(|spec| spec.kind)
                .unwrap_or(ColumnKind::Text);

            let value = match kind {
                ColumnKind::Text => AttributeValue::Text(value.clone()),
                ColumnKind::Integer => {
                    let parsed = value.trim().parse::<i64>().map_err(|_| {
                        ParseError::InvalidInteger {
                            file: self.file.to_string(),
                            line: self.line,
                            column: column.clone(),
                            value: value.clone(),
                        }
                    })?;
                    AttributeValue::Integer(parsed)
                }
            };
            attributes.insert(column.clone(), value);
        }

        Ok(attributes)
    }
}
