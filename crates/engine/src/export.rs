//! Export/import model. Encoding to bytes and parsing files live in the io
//! crate; this module decides what goes into a table.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use datagrid_core::{Record, Value};

use crate::column::ColumnDescriptor;
use crate::error::GridError;
use crate::format::{format_value, DisplayOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    /// Recognised so it can be listed, but no encoder exists for it.
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, ExportFormat::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Pdf => "pdf",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(GridError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub only_selected: bool,
    pub visible_columns_only: bool,
    /// Without extension. Defaults to `{title}-{date}`.
    pub file_name: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            only_selected: false,
            visible_columns_only: true,
            file_name: None,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn only_selected(mut self) -> Self {
        self.only_selected = true;
        self
    }

    pub fn all_columns(mut self) -> Self {
        self.visible_columns_only = false;
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// Header row plus formatted cells, ready for an encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    pub fields: Vec<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn build<'a, I>(columns: &[&ColumnDescriptor], rows: I, options: &DisplayOptions) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        Self {
            fields: columns.iter().map(|c| c.field.clone()).collect(),
            headers: columns.iter().map(|c| c.label.clone()).collect(),
            rows: rows
                .into_iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|c| format_value(c, row.get(&c.field), options))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub format: ExportFormat,
    /// Including extension
    pub file_name: String,
    pub table: ExportTable,
}

/// `{title|data}-{YYYY-MM-DD}.{ext}`
pub fn default_file_name(title: Option<&str>, date: NaiveDate, format: ExportFormat) -> String {
    let title = title.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("data");
    format!("{}-{}.{}", title, date.format("%Y-%m-%d"), format.extension())
}

pub(crate) fn with_extension(name: &str, format: ExportFormat) -> String {
    let ext = format.extension();
    if name
        .rsplit_once('.')
        .is_some_and(|(_, e)| e.eq_ignore_ascii_case(ext))
    {
        name.to_string()
    } else {
        format!("{name}.{ext}")
    }
}

/// A parsed tabular file waiting for the user to confirm it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub file_name: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ImportPreview {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            file_name: None,
            headers,
            rows,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows keyed by header. Short rows get blanks; extra cells are dropped.
    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| {
                        let value = row
                            .get(i)
                            .filter(|cell| !cell.is_empty())
                            .map(|cell| Value::Text(cell.clone()))
                            .unwrap_or(Value::Null);
                        (h.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}
