// CSV/TSV export and import parsing

use std::io::Read;
use std::path::Path;

use datagrid_engine::export::{ExportTable, ImportPreview};

use crate::IoError;

/// Encode an export table as comma-separated text: one header line, then
/// one line per row.
pub fn encode(table: &ExportTable) -> Result<Vec<u8>, IoError> {
    encode_with_delimiter(table, b',')
}

pub fn encode_tsv(table: &ExportTable) -> Result<Vec<u8>, IoError> {
    encode_with_delimiter(table, b'\t')
}

fn encode_with_delimiter(table: &ExportTable, delimiter: u8) -> Result<Vec<u8>, IoError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| IoError::Io(e.into_error()))
}

/// Parse an uploaded file into an import preview. The file name is kept on
/// the preview.
pub fn import(path: &Path) -> Result<ImportPreview, IoError> {
    let content = read_file_as_utf8(path)?;
    let preview = parse_import(&content)?;
    Ok(match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => preview.with_file_name(name),
        None => preview,
    })
}

/// Parse delimited text. The first non-blank line is the header row;
/// blank lines are skipped and cells are trimmed.
pub fn parse_import(content: &str) -> Result<ImportPreview, IoError> {
    let delimiter = sniff_delimiter(content);
    parse_with_delimiter(content, delimiter)
}

pub fn parse_with_delimiter(content: &str, delimiter: u8) -> Result<ImportPreview, IoError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut lines = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        lines.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let mut lines = lines.into_iter();
    let headers = lines.next().ok_or(IoError::EmptyInput)?;
    let rows: Vec<Vec<String>> = lines.collect();
    log::debug!(
        "parsed import: {} columns, {} rows, delimiter {:?}",
        headers.len(),
        rows.len(),
        delimiter as char
    );
    Ok(ImportPreview::new(headers, rows))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// Each candidate (tab, semicolon, comma, pipe) is scored by how many sample
/// lines share the first line's field count, weighted by that count.
pub(crate) fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| field_count(line, delim))
            .collect();

        let Some(&target) = counts.first() else { break };
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Read a file as text, falling back to Windows-1252 when it is not UTF-8
/// (Excel-exported CSVs often are not).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
