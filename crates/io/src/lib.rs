// File I/O operations

pub mod csv;
pub mod xlsx;

use std::path::{Path, PathBuf};

use datagrid_engine::export::{ExportFormat, ExportPayload};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("file is empty")]
    EmptyInput,

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(ExportFormat),
}

/// Encode an export payload into the bytes of its file.
pub fn encode_payload(payload: &ExportPayload) -> Result<Vec<u8>, IoError> {
    match payload.format {
        ExportFormat::Csv => csv::encode(&payload.table),
        ExportFormat::Excel => xlsx::encode(&payload.table, Some(sheet_name(&payload.file_name))),
        ExportFormat::Pdf => Err(IoError::UnsupportedFormat(payload.format)),
    }
}

/// Write an export payload into `dir` under its file name. Returns the path written.
pub fn write_payload(payload: &ExportPayload, dir: &Path) -> Result<PathBuf, IoError> {
    let bytes = encode_payload(payload)?;
    let path = dir.join(&payload.file_name);
    std::fs::write(&path, &bytes)?;
    log::info!(
        "exported {} rows to {} ({} bytes)",
        payload.table.row_count(),
        path.display(),
        bytes.len()
    );
    Ok(path)
}

fn sheet_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}
