mod csv_out;
mod error;
mod grid;
mod grid_json;
mod line_items;
mod merge;
mod model;
mod options;
mod payment;
mod pdf_reader;
mod supplier;
mod warning;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::csv_out::{write_csv, write_csv_to_string};
use crate::line_items::extract_line_items;
use crate::merge::merge;
use crate::payment::extract_payment;
use crate::supplier::extract_supplier;
use crate::warning::WarningCode;

pub use error::ExtractError;
pub use grid::load_document;
pub use merge::format_amount;
pub use model::{
    Document, LineItemRow, MergedOutput, Page, PaymentRecord, SupplierRecord, Table,
};
pub use options::{
    AmountErrorPolicy, ExtractOptions, FieldPresence, GridFormat, OutputLayout, PageSelection,
};
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub row_count: usize,
    pub table_count: usize,
    pub total: Decimal,
    pub supplier_found: bool,
    pub payment_found: bool,
    pub warnings: Vec<ExtractWarning>,
}

/// Runs the three extraction passes over one shared document and merges the
/// results into output rows.
pub fn convert_document(
    document: &Document,
    options: &ExtractOptions,
) -> Result<(MergedOutput, Vec<ExtractWarning>), ExtractError> {
    let mut warnings = Vec::new();

    let supplier = extract_supplier(document, options, &mut warnings);
    let payment = extract_payment(document, options, &mut warnings);
    let items = extract_line_items(document, options);
    debug!(
        supplier = supplier.is_some(),
        payment = payment.is_some(),
        line_items = items.len(),
        "extraction passes finished"
    );

    if items.is_empty() {
        warnings.push(ExtractWarning::new(
            WarningCode::NoLineItems,
            "no line-item rows survived filtering",
        ));
    }

    let merged = merge(
        supplier.as_ref(),
        payment.as_ref(),
        &items,
        options,
        &mut warnings,
    )?;

    Ok((merged, warnings))
}

fn report_for(
    document: &Document,
    merged: &MergedOutput,
    warnings: Vec<ExtractWarning>,
) -> ConversionReport {
    let reported = |code: WarningCode| warnings.iter().any(|warning| warning.code == code);

    ConversionReport {
        row_count: merged.row_count,
        table_count: document.table_count(),
        total: merged.total,
        supplier_found: !reported(WarningCode::SupplierNotFound),
        payment_found: !reported(WarningCode::PaymentNotFound),
        warnings,
    }
}

pub fn convert_document_to_csv_string(
    document: &Document,
    options: &ExtractOptions,
) -> Result<(String, ConversionReport), ExtractError> {
    let (merged, warnings) = convert_document(document, options)?;
    let csv = write_csv_to_string(&merged)?;
    Ok((csv, report_for(document, &merged, warnings)))
}

pub fn convert_pdf_to_csv(
    input: &Path,
    output_csv: &Path,
    options: &ExtractOptions,
) -> Result<ConversionReport, ExtractError> {
    let document = load_document(input, options)?;
    let (merged, warnings) = convert_document(&document, options)?;
    write_csv(output_csv, &merged)?;
    info!(
        rows = merged.row_count,
        total = %format_amount(merged.total),
        output = %output_csv.display(),
        "wrote CSV"
    );

    Ok(report_for(&document, &merged, warnings))
}

/// Writes the detected grid as tabula-style JSON.
pub fn dump_grid<W: std::io::Write>(document: &Document, writer: W) -> Result<(), ExtractError> {
    grid_json::write_tabula_json(writer, document)
}

pub fn dump_grid_to_path(document: &Document, path: &Path) -> Result<(), ExtractError> {
    let writer = BufWriter::new(File::create(path)?);
    dump_grid(document, writer)
}

/// Cleans up a path typed or dropped into a terminal prompt: surrounding
/// whitespace and quotes are removed, as is a `file://` scheme.
#[must_use]
pub fn normalize_path_input(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|quote| {
            trimmed
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(trimmed);
    let without_scheme = unquoted
        .strip_prefix("file://localhost")
        .or_else(|| unquoted.strip_prefix("file://"))
        .unwrap_or(unquoted);

    // `file:///C:/x` keeps a slash before the drive letter.
    let bytes = without_scheme.as_bytes();
    let is_drive_path = bytes.len() >= 3
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b':';
    if is_drive_path {
        PathBuf::from(&without_scheme[1..])
    } else {
        PathBuf::from(without_scheme)
    }
}
