use tracing::debug;

use crate::model::{Document, LineItemRow};
use crate::options::ExtractOptions;
use crate::payment::PAYMENT_MARKER;

/// First-column phrases marking recap and label rows rather than invoice data.
pub(crate) const NOISE_MARKERS: [&str; 4] = [
    "sum total",
    "balance carry forward",
    "invoice document",
    PAYMENT_MARKER,
];

pub(crate) fn is_noise_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    NOISE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Collects line-item rows from every table in document order.
///
/// The first `options.header_rows` rows of each table are skipped by
/// position, then recap rows are dropped by their first-column label. In
/// strict mode a row with any empty cell is dropped as well.
pub(crate) fn extract_line_items(document: &Document, options: &ExtractOptions) -> Vec<LineItemRow> {
    let mut items = Vec::new();

    for (table_id, table) in document.tables() {
        for (row, cells) in table.rows().enumerate().skip(options.header_rows) {
            let label = cells.first().map_or("", String::as_str);
            if is_noise_label(label) {
                debug!(page = table.page, table_id, row, label, "skipping recap row");
                continue;
            }

            if options.is_strict() && cells.iter().any(String::is_empty) {
                debug!(page = table.page, table_id, row, "skipping incomplete row");
                continue;
            }

            items.push(LineItemRow {
                page: table.page,
                table_id,
                row,
                fields: cells.to_vec(),
            });
        }
    }

    items
}
