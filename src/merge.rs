use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::error::ExtractError;
use crate::model::{LineItemRow, MergedOutput, PaymentRecord, SupplierRecord};
use crate::options::{AmountErrorPolicy, ExtractOptions, OutputLayout};
use crate::warning::{ExtractWarning, WarningCode};

const SUPPLIER_HEADERS: [&str; 3] = ["Supplier", "Supplier No.", "Date"];
const PAYMENT_HEADERS: [&str; 2] = ["Payment Document", "Currency"];
const LINE_ITEM_HEADERS: [&str; 6] = [
    "Invoice Document",
    "Invoice Number",
    "Invoice Date",
    "Gross Amount",
    "Discount Amount",
    "Net Amount",
];

/// Position of the gross amount within an aligned line item.
const GROSS_AMOUNT_COL: usize = 3;
const TOTAL_LABEL: &str = "Total Sum";

static DATE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Date:\s*").expect("hardcoded date label regex is valid"));

fn strip_label(value: &str, label: &str) -> String {
    value.replace(label, "").trim().to_string()
}

fn supplier_cells(supplier: Option<&SupplierRecord>) -> Vec<String> {
    match supplier {
        Some(record) => vec![
            record.name.clone(),
            record.number.clone(),
            DATE_LABEL.replace(&record.date, "").trim().to_string(),
        ],
        None => vec![String::new(); SUPPLIER_HEADERS.len()],
    }
}

fn payment_cells(payment: Option<&PaymentRecord>) -> Vec<String> {
    match payment {
        Some(record) => vec![
            strip_label(&record.document, "Payment Document:"),
            strip_label(&record.currency, "Currency:"),
        ],
        None => vec![String::new(); PAYMENT_HEADERS.len()],
    }
}

/// Fits a line item onto the six line-item columns.
///
/// Grid extraction can add empty leading columns; those are dropped while the
/// row is too wide. Short rows are padded on the right.
pub(crate) fn align_line_item(item: &LineItemRow, warnings: &mut Vec<ExtractWarning>) -> LineItemRow {
    let width = LINE_ITEM_HEADERS.len();
    let surplus = item.fields.len().saturating_sub(width);
    let leading_blanks = item
        .fields
        .iter()
        .take(surplus)
        .take_while(|cell| cell.is_empty())
        .count();

    let mut fields = item.fields[leading_blanks..].to_vec();
    if fields.len() < width {
        warnings.push(
            ExtractWarning::new(
                WarningCode::ShapeMismatch,
                format!(
                    "line item has {} columns, expected {width}; padding with blanks",
                    fields.len()
                ),
            )
            .with_page(item.page)
            .with_table_id(item.table_id)
            .with_row(item.row),
        );
        fields.resize(width, String::new());
    }

    LineItemRow {
        page: item.page,
        table_id: item.table_id,
        row: item.row,
        fields,
    }
}

/// Parses an amount such as `1,234.50`. Empty cells yield `Ok(None)`.
pub(crate) fn parse_amount(value: &str) -> Result<Option<Decimal>, rust_decimal::Error> {
    let digits = value.trim().replace(',', "");
    if digits.is_empty() {
        return Ok(None);
    }

    Decimal::from_str(&digits)
        .or_else(|_| Decimal::from_scientific(&digits))
        .map(Some)
}

#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Sums the gross amount column of aligned line items.
pub(crate) fn sum_gross_amounts(
    items: &[LineItemRow],
    policy: AmountErrorPolicy,
    warnings: &mut Vec<ExtractWarning>,
) -> Result<Decimal, ExtractError> {
    let mut total = Decimal::ZERO;

    for item in items {
        let value = item.fields.get(GROSS_AMOUNT_COL).map_or("", String::as_str);
        let reason = match parse_amount(value) {
            Ok(None) => continue,
            Ok(Some(amount)) => match total.checked_add(amount) {
                Some(sum) => {
                    total = sum;
                    continue;
                }
                None => "total exceeds the decimal range".to_string(),
            },
            Err(error) => error.to_string(),
        };

        match policy {
            AmountErrorPolicy::Abort => {
                return Err(ExtractError::InvalidAmount {
                    page: item.page,
                    table_id: item.table_id,
                    row: item.row,
                    value: value.to_string(),
                });
            }
            AmountErrorPolicy::SkipAndWarn => {
                warn!(
                    page = item.page,
                    table_id = item.table_id,
                    row = item.row,
                    value,
                    %reason,
                    "invalid gross amount; excluded from total"
                );
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::InvalidAmount,
                        format!("invalid gross amount '{value}' excluded from total: {reason}"),
                    )
                    .with_page(item.page)
                    .with_table_id(item.table_id)
                    .with_row(item.row),
                );
            }
        }
    }

    Ok(total)
}

/// Total row: blanks, then the label just left of the gross amount column,
/// then the formatted sum in that column.
fn total_row(gross_col: usize, total: Decimal) -> Vec<String> {
    let mut row = vec![String::new(); gross_col.saturating_sub(1)];
    row.push(TOTAL_LABEL.to_string());
    row.push(format_amount(total));
    row
}

pub(crate) fn merge(
    supplier: Option<&SupplierRecord>,
    payment: Option<&PaymentRecord>,
    items: &[LineItemRow],
    options: &ExtractOptions,
    warnings: &mut Vec<ExtractWarning>,
) -> Result<MergedOutput, ExtractError> {
    let aligned = items
        .iter()
        .map(|item| align_line_item(item, warnings))
        .collect::<Vec<_>>();
    let total = sum_gross_amounts(&aligned, options.amount_errors, warnings)?;

    let (preamble, headers, prefix) = match options.layout {
        OutputLayout::Merged => {
            let mut prefix = supplier_cells(supplier);
            prefix.extend(payment_cells(payment));
            let headers = SUPPLIER_HEADERS
                .iter()
                .chain(PAYMENT_HEADERS.iter())
                .chain(LINE_ITEM_HEADERS.iter())
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            (Vec::new(), headers, prefix)
        }
        OutputLayout::Separate => {
            let preamble = [
                supplier.map(|record| supplier_cells(Some(record))),
                payment.map(|record| payment_cells(Some(record))),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
            let headers = LINE_ITEM_HEADERS.iter().map(ToString::to_string).collect();
            (preamble, headers, Vec::new())
        }
    };

    let mut rows = aligned
        .into_iter()
        .map(|item| {
            let mut row = prefix.clone();
            row.extend(item.fields);
            row
        })
        .collect::<Vec<_>>();
    let row_count = rows.len();
    rows.push(total_row(prefix.len() + GROSS_AMOUNT_COL, total));

    Ok(MergedOutput {
        preamble,
        headers,
        rows,
        row_count,
        total,
    })
}
