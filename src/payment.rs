use tracing::debug;

use crate::model::{Document, PaymentRecord};
use crate::options::ExtractOptions;
use crate::warning::{ExtractWarning, WarningCode};

pub(crate) const PAYMENT_MARKER: &str = "payment document";

const LABEL_COL: usize = 0;
const CURRENCY_COL: usize = 2;

/// Returns the first row whose label mentions the payment document. Later
/// occurrences are repeats and never override the first.
pub(crate) fn extract_payment(
    document: &Document,
    options: &ExtractOptions,
    warnings: &mut Vec<ExtractWarning>,
) -> Option<PaymentRecord> {
    for (table_id, table) in document.tables() {
        if table.col_count() <= CURRENCY_COL {
            debug!(
                page = table.page,
                table_id,
                cols = table.col_count(),
                "table too narrow for payment details; skipping"
            );
            warnings.push(
                ExtractWarning::new(
                    WarningCode::ShapeMismatch,
                    "table has too few columns for payment details",
                )
                .with_page(table.page)
                .with_table_id(table_id),
            );
            continue;
        }

        for row in 0..table.row_count() {
            let label = table.cell(row, LABEL_COL);
            let currency = table.cell(row, CURRENCY_COL);

            if !label.to_lowercase().contains(PAYMENT_MARKER) {
                continue;
            }
            if options.is_strict() && (label.is_empty() || currency.is_empty()) {
                debug!(page = table.page, table_id, row, "payment row has no currency");
                continue;
            }

            return Some(PaymentRecord {
                document: label.to_string(),
                currency: currency.to_string(),
            });
        }
    }

    warnings.push(ExtractWarning::new(
        WarningCode::PaymentNotFound,
        "no payment document row found; payment columns are left blank",
    ));
    None
}
