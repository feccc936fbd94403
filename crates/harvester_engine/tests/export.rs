use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use harvester_core::{
    columns_for, flatten, Column, FieldValue, HarvestResult, HarvestStats, ItemUrl, Price, Record,
    Row, TransactionType,
};
use harvester_engine::{
    ensure_dir, export_harvest, sheet_cells, workbook_filename, ExportSummary, PersistError,
    SinkError, TabularSink, WorkbookSink, MAX_SHEET_COLUMNS,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn record(url: &str, details: &[(&str, &str)]) -> Record {
    let mut record = Record::empty(ItemUrl::parse(url).unwrap());
    record.details = details.iter().copied().collect();
    record
}

fn harvest(records: Vec<Record>) -> HarvestResult {
    HarvestResult {
        source_url: "https://listing.test/alquiler".into(),
        records,
        failures: Vec::new(),
        stats: HarvestStats::default(),
    }
}

#[derive(Default)]
struct RecordingSink {
    writes: RefCell<Vec<(PathBuf, Vec<Vec<String>>)>>,
}

impl TabularSink for RecordingSink {
    fn write(&self, path: &Path, rows: &[Row], columns: &[Column]) -> Result<ExportSummary, SinkError> {
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), sheet_cells(rows, columns)));
        Ok(ExportSummary {
            row_count: rows.len(),
            column_count: columns.len(),
            output_path: path.to_path_buf(),
        })
    }
}

#[test]
fn workbook_name_is_derived_from_listing_url() {
    assert_eq!(
        workbook_filename("https://www.infocasas.com.bo/alquiler"),
        "https___www_infocasas_com_bo_alquiler.xlsx"
    );
    assert_eq!(workbook_filename("HTTPS://A.b/C?d=1"), "https___a_b_c_d_1.xlsx");
}

#[test]
fn heterogeneous_records_share_one_header() {
    let mut first = record(
        "https://listing.test/inmueble/1",
        &[("Dormitorios", "2"), ("Price", "650")],
    );
    first.name = "Casa".into();
    first.price = Price::Listed("US$ 650".into());
    first.transaction_type = TransactionType::Sale;
    first.extras = BTreeMap::from([(
        "Amenities".to_string(),
        FieldValue::List(vec!["Piscina".into(), "Gimnasio".into()]),
    )]);
    let second = record("https://listing.test/inmueble/2", &[("Garaje", "1")]);

    let sink = RecordingSink::default();
    let out = TempDir::new().unwrap();
    let summary = export_harvest(&sink, &harvest(vec![first, second]), out.path()).unwrap();

    assert_eq!(summary.row_count, 2);
    assert_eq!(
        summary.output_path,
        out.path().join("https___listing_test_alquiler.xlsx")
    );

    let writes = sink.writes.borrow();
    let cells = &writes[0].1;
    assert_eq!(
        cells[0],
        vec![
            "URL",
            "Name",
            "Description",
            "Address",
            "Price",
            "Property Type",
            "Area",
            "Transaction Type",
            "Latitude",
            "Longitude",
            "Dormitorios",
            "Price (detail)",
            "Amenities",
            "Garaje",
        ]
    );
    assert_eq!(
        cells[1],
        vec![
            "https://listing.test/inmueble/1",
            "Casa",
            "",
            "",
            "US$ 650",
            "",
            "",
            "sale",
            "",
            "",
            "2",
            "650",
            "Piscina; Gimnasio",
            "",
        ]
    );
    assert_eq!(cells[2][4], "ask");
    assert_eq!(cells[2][7], "rent");
    assert_eq!(cells[2][13], "1");
}

#[test]
fn workbook_is_written_with_parent_dirs_and_replaced() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("output").join("nested").join("listing.xlsx");
    let rows = vec![flatten(&record("https://listing.test/inmueble/1", &[("Baños", "1")]))];
    let columns = columns_for(&rows);

    let sink = WorkbookSink::default();
    let first = sink.write(&path, &rows, &columns).unwrap();
    assert_eq!(first.output_path, path);
    assert_eq!(first.column_count, 11);
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let second = sink.write(&path, &[], &columns).unwrap();
    assert_eq!(second.row_count, 0);
    assert!(path.is_file());
    assert_ne!(fs::read(&path).unwrap(), bytes);

    let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["listing.xlsx"]);
}

#[test]
fn unwritable_destination_reports_attempted_path() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("output");
    fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("listing.xlsx");

    let err = WorkbookSink::default()
        .write(&path, &[], &columns_for(&[]))
        .unwrap_err();
    assert!(matches!(
        err,
        SinkError::Persist {
            source: PersistError::Directory { .. },
            ..
        }
    ));
    assert_eq!(err.path(), path.as_path());
    assert!(blocker.is_file());
}

#[test]
fn output_dir_is_created_once_and_must_be_a_directory() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("output");
    ensure_dir(&output).unwrap();
    ensure_dir(&output).unwrap();
    assert!(output.is_dir());

    let blocker = temp.path().join("blocked");
    fs::write(&blocker, "x").unwrap();
    assert!(matches!(
        ensure_dir(&blocker),
        Err(PersistError::Directory { .. })
    ));
}

#[test]
fn columns_beyond_sheet_width_are_refused_before_writing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wide.xlsx");
    let columns: Vec<Column> = (0..=MAX_SHEET_COLUMNS)
        .map(|i| Column::new(format!("Field {i}"), format!("field_{i}")))
        .collect();

    let err = WorkbookSink::default()
        .write(&path, &[], &columns)
        .unwrap_err();
    match &err {
        SinkError::TooLarge { rows, columns, .. } => {
            assert_eq!(*rows, 0);
            assert_eq!(*columns, MAX_SHEET_COLUMNS + 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.path(), path.as_path());
    assert!(!path.exists());
}
