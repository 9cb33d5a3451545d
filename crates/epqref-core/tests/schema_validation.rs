//! Schema-enforcement coverage against the shipped module schemas: every
//! violation class must fail with a `SchemaViolation` naming the column.

use epqref_core::domain::{BridgeErrorCategory, RawTable};
use epqref_core::modules::{ELEMENT_SCHEMA, XRAY_TRANSITION_SCHEMA};
use epqref_core::schema::validate_table;

fn element_header() -> Vec<String> {
    ELEMENT_SCHEMA
        .header()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn element_row() -> Vec<String> {
    vec![
        "26".to_string(),
        "Fe".to_string(),
        "Iron".to_string(),
        "5.584500000000e+01".to_string(),
        "9.273260200000e-26".to_string(),
        "1.266716000000e-18".to_string(),
        "4.517784120000e-17".to_string(),
    ]
}

#[test]
fn conforming_table_validates_every_declared_field() {
    let table =
        RawTable::from_parts(element_header(), vec![element_row()]).expect("table should build");
    let records = validate_table(&ELEMENT_SCHEMA, &table).expect("validation should succeed");

    assert_eq!(records.len(), 1);
    for column in ELEMENT_SCHEMA.columns {
        assert!(
            records[0].get(column.name).is_some(),
            "field '{}' should be present",
            column.name
        );
    }
}

#[test]
fn missing_column_names_the_column() {
    let mut header = element_header();
    let mut row = element_row();
    header.remove(1);
    row.remove(1);
    let table = RawTable::from_parts(header, vec![row]).expect("table should build");

    let error = validate_table(&ELEMENT_SCHEMA, &table).expect_err("missing column should fail");
    assert_eq!(error.category(), BridgeErrorCategory::SchemaViolation);
    assert_eq!(error.placeholder(), "SCHEMA.MISSING_COLUMN");
    assert!(error.message().contains("symbol"));
}

#[test]
fn extra_column_is_rejected() {
    let mut header = element_header();
    let mut row = element_row();
    header.push("density".to_string());
    row.push("7.874".to_string());
    let table = RawTable::from_parts(header, vec![row]).expect("table should build");

    let error = validate_table(&ELEMENT_SCHEMA, &table).expect_err("extra column should fail");
    assert_eq!(error.placeholder(), "SCHEMA.EXTRA_COLUMN");
    assert!(error.message().contains("density"));
}

#[test]
fn reordered_header_is_rejected() {
    let mut header = element_header();
    let mut row = element_row();
    header.swap(0, 1);
    row.swap(0, 1);
    let table = RawTable::from_parts(header, vec![row]).expect("table should build");

    let error = validate_table(&ELEMENT_SCHEMA, &table).expect_err("column order must match");
    assert_eq!(error.placeholder(), "SCHEMA.COLUMN_ORDER");
}

#[test]
fn non_numeric_double_cell_names_column_and_row() {
    let mut bad_row = element_row();
    bad_row[3] = "heavy".to_string();
    let table = RawTable::from_parts(element_header(), vec![element_row(), bad_row])
        .expect("table should build");

    let error = validate_table(&ELEMENT_SCHEMA, &table).expect_err("bad double should fail");
    assert_eq!(error.category(), BridgeErrorCategory::SchemaViolation);
    assert_eq!(error.placeholder(), "SCHEMA.CELL_PARSE");
    assert!(error.message().contains("atomic_weight"));
    assert!(error.message().contains("row 1"));
}

#[test]
fn empty_cell_in_non_nullable_column_is_rejected() {
    let mut bad_row = element_row();
    bad_row[0] = "".to_string();
    let table =
        RawTable::from_parts(element_header(), vec![bad_row]).expect("table should build");

    let error = validate_table(&ELEMENT_SCHEMA, &table).expect_err("null Z should fail");
    assert_eq!(error.placeholder(), "SCHEMA.NULL_CELL");
    assert!(error.message().contains("'Z'"));
}

#[test]
fn empty_cell_in_nullable_column_is_null() {
    let mut row = element_row();
    row[5] = "".to_string();
    let table = RawTable::from_parts(element_header(), vec![row]).expect("table should build");

    let records = validate_table(&ELEMENT_SCHEMA, &table).expect("nullable cell may be empty");
    assert_eq!(
        records[0]
            .optional_double("ionization_energy")
            .expect("field should be readable"),
        None
    );
}

#[test]
fn malformed_bool_cell_is_rejected() {
    let header: Vec<String> = XRAY_TRANSITION_SCHEMA
        .header()
        .into_iter()
        .map(str::to_string)
        .collect();
    let row = vec![
        "26".to_string(),
        "1".to_string(),
        "Ka1".to_string(),
        "LIII".to_string(),
        "K".to_string(),
        "K".to_string(),
        "yes".to_string(), // not a wire boolean
        "true".to_string(),
        "6.403840000000e+03".to_string(),
        "7.112000000000e+03".to_string(),
        "5.796560000000e-01".to_string(),
        "5.796560000000e-01".to_string(),
        "1.000000000000e+00".to_string(),
        "1.000000000000e+00".to_string(),
    ];
    let table = RawTable::from_parts(header, vec![row]).expect("table should build");

    let error =
        validate_table(&XRAY_TRANSITION_SCHEMA, &table).expect_err("'yes' is not a bool");
    assert_eq!(error.placeholder(), "SCHEMA.CELL_PARSE");
    assert!(error.message().contains("is_well_known"));
}

#[test]
fn whitespace_around_cells_is_tolerated() {
    let row: Vec<String> = element_row()
        .into_iter()
        .map(|cell| format!(" {cell} "))
        .collect();
    let table = RawTable::from_parts(element_header(), vec![row]).expect("table should build");

    let records = validate_table(&ELEMENT_SCHEMA, &table).expect("padded cells should validate");
    assert_eq!(records[0].require_text("symbol").expect("symbol"), "Fe");
}
