// Excel export (xlsx only)
//
// Export is a presentation snapshot: every cell is written as the grid's
// formatted display text under a bold, frozen header row.

use std::path::Path;

use datagrid_engine::export::ExportTable;
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};

use crate::IoError;

/// Excel limits worksheet names to 31 characters.
const MAX_SHEET_NAME: usize = 31;
const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 60;

/// Encode the table as an in-memory .xlsx workbook with a single sheet.
pub fn encode(table: &ExportTable, sheet_name: Option<&str>) -> Result<Vec<u8>, IoError> {
    let mut workbook = build(table, sheet_name)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn export(table: &ExportTable, sheet_name: Option<&str>, path: &Path) -> Result<(), IoError> {
    let mut workbook = build(table, sheet_name)?;
    workbook.save(path)?;
    Ok(())
}

fn build(table: &ExportTable, sheet_name: Option<&str>) -> Result<Workbook, IoError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sanitize_sheet_name(sheet_name.unwrap_or("Data")))?;
    write_table(worksheet, table)?;
    Ok(workbook)
}

fn write_table(worksheet: &mut Worksheet, table: &ExportTable) -> Result<(), IoError> {
    let header_format = Format::new().set_bold().set_border_bottom(FormatBorder::Thin);

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = row_idx as u32 + 1;
        for (col, text) in row.iter().enumerate() {
            if !text.is_empty() {
                worksheet.write_string(row_num, col as u16, text)?;
            }
        }
    }

    // Size each column to its widest cell, within sane bounds
    for col in 0..table.headers.len() {
        let widest = std::iter::once(&table.headers[col])
            .chain(table.rows.iter().filter_map(|r| r.get(col)))
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);
        let width = (widest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Replace characters Excel rejects in sheet names and truncate to the limit.
pub(crate) fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    if cleaned.is_empty() {
        "Data".to_string()
    } else {
        cleaned.to_string()
    }
}
