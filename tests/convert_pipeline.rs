mod common;

use std::process::Command;

use payment_advice_to_csv::{
    AmountErrorPolicy, ExtractError, ExtractOptions, ExtractWarningCode, OutputLayout,
    convert_pdf_to_csv, format_amount,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const MERGED_HEADER: &str = "Supplier,Supplier No.,Date,Payment Document,Currency,\
                             Invoice Document,Invoice Number,Invoice Date,Gross Amount,\
                             Discount Amount,Net Amount";

#[test]
fn converts_advice_pdf_to_merged_csv() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("advice.pdf");
    let output = dir.path().join("advice.csv");
    common::write_text_pdf(&input, &[common::ADVICE_PAGE]).expect("PDF fixture should be created");

    let report = convert_pdf_to_csv(&input, &output, &ExtractOptions::default())
        .expect("conversion should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    let lines = csv.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            MERGED_HEADER,
            "Acme Co,SUP-001,2024-01-01,PD-9,USD,INV-1,INV-100,2024-01-02,\"1,000.00\",0.00,\"1,000.00\"",
            "Acme Co,SUP-001,2024-01-01,PD-9,USD,INV-2,INV-101,2024-01-03,250.50,0.50,250.00",
            ",,,,,,,Total Sum,1250.50",
        ],
        "report: {report:?}"
    );
    assert_eq!(report.row_count, 2);
    assert!(report.supplier_found && report.payment_found);
}

#[test]
fn continues_line_items_across_pages() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("two-pages.pdf");
    let output = dir.path().join("two-pages.csv");
    common::write_text_pdf(&input, &[common::ADVICE_PAGE, common::CONTINUATION_PAGE])
        .expect("PDF fixture should be created");

    let report = convert_pdf_to_csv(&input, &output, &ExtractOptions::default())
        .expect("conversion should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert_eq!(report.row_count, 3, "unexpected CSV output: {csv:?}");
    assert_eq!(format_amount(report.total), "1350.00");
    assert!(!csv.to_lowercase().contains("carry forward"));
    assert!(csv.ends_with(",,,,,,,Total Sum,1350.00\n"), "csv: {csv:?}");
}

#[test]
fn page_selection_limits_the_scan() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("two-pages.pdf");
    let output = dir.path().join("page-two.csv");
    common::write_text_pdf(&input, &[common::ADVICE_PAGE, common::CONTINUATION_PAGE])
        .expect("PDF fixture should be created");

    let options = ExtractOptions {
        pages: Some("2".parse().expect("selection should parse")),
        ..ExtractOptions::default()
    };
    let report = convert_pdf_to_csv(&input, &output, &options).expect("conversion should succeed");

    assert_eq!(report.row_count, 1);
    assert_eq!(format_amount(report.total), "99.50");
    assert!(!report.payment_found);
}

#[test]
fn repeated_conversions_write_identical_files() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("advice.pdf");
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    common::write_text_pdf(&input, &[common::ADVICE_PAGE]).expect("PDF fixture should be created");

    convert_pdf_to_csv(&input, &first, &ExtractOptions::default()).expect("first run");
    convert_pdf_to_csv(&input, &second, &ExtractOptions::default()).expect("second run");

    let first = std::fs::read(first).expect("first CSV should be readable");
    let second = std::fs::read(second).expect("second CSV should be readable");
    assert_eq!(first, second);
}

#[test]
fn tabula_json_grid_feeds_the_same_pipeline() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("advice.json");
    let output = dir.path().join("advice.csv");
    std::fs::write(&input, common::ADVICE_TABULA_JSON).expect("grid fixture should be written");

    let report = convert_pdf_to_csv(&input, &output, &ExtractOptions::default())
        .expect("conversion should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    let lines = csv.lines().collect::<Vec<_>>();
    assert_eq!(
        lines[1],
        "Acme Co,SUP-001,2024-01-01,PD-9,USD,INV-1,INV-100,2024-01-02,100.00,0,100.00"
    );
    assert_eq!(
        lines[2],
        "Acme Co,SUP-001,2024-01-01,PD-9,USD,INV-2,INV-101,2024-01-03,oops,0,5.00"
    );
    assert_eq!(lines[3], ",,,,,,,Total Sum,100.00");
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.code == ExtractWarningCode::InvalidAmount)
    );
}

#[test]
fn abort_policy_rejects_bad_amounts() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("advice.json");
    let output = dir.path().join("advice.csv");
    std::fs::write(&input, common::ADVICE_TABULA_JSON).expect("grid fixture should be written");

    let options = ExtractOptions {
        amount_errors: AmountErrorPolicy::Abort,
        ..ExtractOptions::default()
    };
    let error = convert_pdf_to_csv(&input, &output, &options).expect_err("bad amount should abort");

    assert!(matches!(error, ExtractError::InvalidAmount { row: 4, .. }), "{error:?}");
    assert!(!output.exists());
}

#[test]
fn separate_layout_writes_record_rows_first() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("advice.json");
    let output = dir.path().join("advice.csv");
    std::fs::write(&input, common::ADVICE_TABULA_JSON).expect("grid fixture should be written");

    let options = ExtractOptions {
        layout: OutputLayout::Separate,
        ..ExtractOptions::default()
    };
    convert_pdf_to_csv(&input, &output, &options).expect("conversion should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    let lines = csv.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "Acme Co,SUP-001,2024-01-01",
            "PD-9,USD",
            "Invoice Document,Invoice Number,Invoice Date,Gross Amount,Discount Amount,Net Amount",
            "INV-1,INV-100,2024-01-02,100.00,0,100.00",
            "INV-2,INV-101,2024-01-03,oops,0,5.00",
            ",,Total Sum,100.00",
        ]
    );
}

#[test]
fn missing_input_is_a_resource_error() {
    let dir = tempdir().expect("tempdir should be created");
    let error = convert_pdf_to_csv(
        &dir.path().join("missing.pdf"),
        &dir.path().join("out.csv"),
        &ExtractOptions::default(),
    )
    .expect_err("missing PDF should fail");

    assert!(matches!(error, ExtractError::PdfLoad(_) | ExtractError::Io(_)), "{error:?}");
}

#[test]
fn cli_converts_and_confirms() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("advice.json");
    let output = dir.path().join("advice.csv");
    std::fs::write(&input, common::ADVICE_TABULA_JSON).expect("grid fixture should be written");

    let result = Command::new(env!("CARGO_BIN_EXE_pdf2csv"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Table data successfully converted to CSV"), "{stdout}");
    assert!(output.exists());
}

#[test]
fn cli_exits_with_code_1_when_input_is_missing() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("missing.pdf");
    let output = dir.path().join("out.csv");

    let result = Command::new(env!("CARGO_BIN_EXE_pdf2csv"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("error:"));
}

#[test]
fn cli_grid_dumps_tabula_json() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("advice.pdf");
    common::write_text_pdf(&input, &[common::ADVICE_PAGE]).expect("PDF fixture should be created");

    let result = Command::new(env!("CARGO_BIN_EXE_pdf2csv"))
        .args(["grid", "-i", &input.to_string_lossy()])
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(0));
    let tables: serde_json::Value =
        serde_json::from_slice(&result.stdout).expect("grid dump should be JSON");
    let tables = tables.as_array().expect("grid dump should be an array");
    assert_eq!(tables.len(), 3);
    assert_eq!(tables[0]["page_number"], 1);
    assert_eq!(tables[1]["data"][0][2]["text"], "USD");
}
