/*!
 * Record tables.
 *
 * A `RecordTable` is an ordered list of JSON objects loaded from a `.json`
 * array or a `.jsonl`/`.ndjson` file. The translator reads one text column
 * out of it and writes a same-length column back, row for row.
 */

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

use crate::errors::TableError;

/// On-disk layout of a record file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// A single JSON array of objects
    Json,
    /// One JSON object per line
    JsonLines,
}

impl RecordFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            _ => Err(TableError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Ordered collection of records
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    rows: Vec<Map<String, Value>>,
    format: RecordFormat,
}

impl RecordTable {
    /// Create a table from already-built rows
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        Self {
            rows,
            format: RecordFormat::Json,
        }
    }

    /// Create a single-column table from texts
    pub fn from_texts(field: &str, texts: &[String]) -> Self {
        let rows = texts
            .iter()
            .map(|text| {
                let mut row = Map::new();
                row.insert(field.to_string(), Value::String(text.clone()));
                row
            })
            .collect();
        Self::from_rows(rows)
    }

    /// Parse records in the given format
    pub fn parse(content: &str, format: RecordFormat) -> Result<Self, TableError> {
        let rows = match format {
            RecordFormat::Json => {
                let value: Value =
                    serde_json::from_str(content).map_err(|e| TableError::Parse(e.to_string()))?;
                match value {
                    Value::Array(items) => items
                        .into_iter()
                        .enumerate()
                        .map(|(row, item)| into_object(row, item))
                        .collect::<Result<Vec<_>, _>>()?,
                    _ => return Err(TableError::Parse("expected a JSON array of objects".to_string())),
                }
            }
            RecordFormat::JsonLines => content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(index, line)| -> Result<Map<String, Value>, TableError> {
                    let line_number = index + 1;
                    let item: Value = serde_json::from_str(line)
                        .map_err(|e| TableError::Parse(format!("line {}: {}", line_number, e)))?;
                    match item {
                        Value::Object(map) => Ok(map),
                        _ => Err(TableError::Parse(format!("line {}: record is not an object", line_number))),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self { rows, format })
    }

    /// Load a record file, choosing the format from its extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = RecordFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read records from {}", path.display()))?;

        Self::parse(&content, format)
            .with_context(|| format!("Failed to parse records from {}", path.display()))
    }

    /// Render the table in its format
    pub fn render(&self) -> Result<String, TableError> {
        match self.format {
            RecordFormat::Json => serde_json::to_string_pretty(&self.rows)
                .map_err(|e| TableError::Parse(e.to_string())),
            RecordFormat::JsonLines => {
                let mut out = String::new();
                for row in &self.rows {
                    let line = serde_json::to_string(row).map_err(|e| TableError::Parse(e.to_string()))?;
                    out.push_str(&line);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }

    /// Write the table to `path`, using the format of that path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut table = self.clone();
        table.format = RecordFormat::from_path(path)?;

        let content = table.render()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write records to {}", path.display()))
    }

    /// Format the table was loaded from
    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The records
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Read a string column, one value per record
    pub fn text_column(&self, field: &str) -> Result<Vec<String>, TableError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row, record)| match record.get(field) {
                Some(Value::String(text)) => Ok(text.clone()),
                Some(_) => Err(TableError::InvalidValue {
                    row,
                    field: field.to_string(),
                }),
                None => Err(TableError::MissingField {
                    row,
                    field: field.to_string(),
                }),
            })
            .collect()
    }

    /// Write a column, value `i` into record `i`
    pub fn set_column(&mut self, field: &str, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        for (record, value) in self.rows.iter_mut().zip(values) {
            record.insert(field.to_string(), value);
        }
        Ok(())
    }

    /// Write a string column, value `i` into record `i`
    pub fn set_text_column(&mut self, field: &str, values: Vec<String>) -> Result<(), TableError> {
        self.set_column(field, values.into_iter().map(Value::String).collect())
    }
}

fn into_object(row: usize, item: Value) -> Result<Map<String, Value>, TableError> {
    match item {
        Value::Object(map) => Ok(map),
        _ => Err(TableError::Parse(format!("record {} is not an object", row))),
    }
}
