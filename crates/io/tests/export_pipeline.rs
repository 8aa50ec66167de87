// Grid export and import through the file encoders.

use datagrid_core::Record;
use datagrid_engine::export::{ExportFormat, ExportOptions};
use datagrid_engine::filter::FilterOperator;
use datagrid_engine::{ColumnDescriptor, DataGrid, GridConfig, GridEvent};
use datagrid_io::{csv, encode_payload, write_payload};
use tempfile::tempdir;

fn grid() -> DataGrid {
    let columns = vec![
        ColumnDescriptor::number("id", "ID"),
        ColumnDescriptor::text("name", "Name"),
        ColumnDescriptor::text("email", "E-mail").hidden(),
    ];
    let rows = (1..=6)
        .map(|i| {
            Record::new()
                .with("id", i as i64)
                .with("name", format!("User, {i}"))
                .with("email", format!("u{i}@example.com"))
        })
        .collect();
    let mut grid = DataGrid::new(GridConfig::client().with_title("users"), columns).unwrap();
    grid.set_rows(rows).unwrap();
    grid
}

#[test]
fn test_filtered_export_encodes_to_csv() {
    let mut grid = grid();
    grid.set_filter("id", FilterOperator::InRange, 5, None).unwrap();

    let payload = grid.export(&ExportOptions::new(ExportFormat::Csv)).unwrap();
    let text = String::from_utf8(encode_payload(&payload).unwrap()).unwrap();

    assert_eq!(text, "ID,Name\n5,\"User, 5\"\n6,\"User, 6\"\n");
}

#[test]
fn test_export_file_parses_back_as_import() {
    let mut grid = grid();
    let payload = grid
        .export(&ExportOptions::new(ExportFormat::Csv).all_columns())
        .unwrap();

    let dir = tempdir().unwrap();
    let path = write_payload(&payload, dir.path()).unwrap();
    let preview = csv::import(&path).unwrap();

    assert_eq!(preview.headers, vec!["ID", "Name", "E-mail"]);
    assert_eq!(preview.row_count(), 6);
    assert_eq!(preview.rows[0], vec!["1", "User, 1", "u1@example.com"]);

    let records = preview.to_records();
    assert_eq!(records[5].get("E-mail").to_text(), "u6@example.com");
}

#[test]
fn test_excel_export_has_default_name() {
    let mut grid = grid();
    let payload = grid.export(&ExportOptions::new(ExportFormat::Excel)).unwrap();
    assert!(payload.file_name.starts_with("users-"));
    assert!(payload.file_name.ends_with(".xlsx"));

    let bytes = encode_payload(&payload).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_parsed_import_is_staged_then_confirmed() {
    let mut grid = grid();
    let preview = csv::parse_import("name;email\nAda;ada@example.com\n").unwrap();
    grid.stage_import(preview);
    grid.drain_events();

    assert_eq!(grid.pending_import().map(|p| p.row_count()), Some(1));
    let confirmed = grid.confirm_import().unwrap();
    assert_eq!(confirmed.headers, vec!["name", "email"]);

    let events = grid.drain_events();
    assert!(matches!(events.as_slice(), [GridEvent::ImportParsed(p)] if p.row_count() == 1));
    assert_eq!(grid.rows().len(), 6);
}

#[test]
fn test_parse_failure_is_reported() {
    let mut grid = grid();
    grid.drain_events();
    let err = csv::parse_import("").unwrap_err();
    grid.report_import_error(err.to_string());
    let events = grid.drain_events();
    assert!(matches!(events.as_slice(), [GridEvent::ImportFailed(msg)] if msg == "file is empty"));
}
