use tracing::debug;

use crate::model::{Document, SupplierRecord};
use crate::options::ExtractOptions;
use crate::warning::{ExtractWarning, WarningCode};

const VALUE_ROW: usize = 1;
const NAME_COL: usize = 1;
const NUMBER_COL: usize = 3;
const DATE_COL: usize = 4;

/// Finds the supplier block. Only the first non-empty table of each page is
/// a candidate; it must have more than one row and column and is read at
/// fixed coordinates on its second row.
pub(crate) fn extract_supplier(
    document: &Document,
    options: &ExtractOptions,
    warnings: &mut Vec<ExtractWarning>,
) -> Option<SupplierRecord> {
    let mut first_table_id = 1;
    for page in &document.pages {
        let page_first_id = first_table_id;
        first_table_id += page.tables.len();

        let Some((index, table)) = page
            .tables
            .iter()
            .enumerate()
            .find(|(_, table)| !table.is_empty())
        else {
            continue;
        };
        let table_id = page_first_id + index;

        if table.row_count() <= 1 || table.col_count() <= 1 {
            continue;
        }

        if table.col_count() <= DATE_COL {
            warnings.push(
                ExtractWarning::new(
                    WarningCode::ShapeMismatch,
                    format!(
                        "supplier table has {} columns; missing fields read as empty",
                        table.col_count()
                    ),
                )
                .with_page(table.page)
                .with_table_id(table_id),
            );
        }

        let record = SupplierRecord {
            name: table.cell(VALUE_ROW, NAME_COL).to_string(),
            number: table.cell(VALUE_ROW, NUMBER_COL).to_string(),
            date: table.cell(VALUE_ROW, DATE_COL).to_string(),
        };

        let complete =
            !record.name.is_empty() && !record.number.is_empty() && !record.date.is_empty();
        if options.is_strict() && !complete {
            debug!(
                page = table.page,
                table_id, "supplier candidate has empty fields; trying next page"
            );
            continue;
        }

        return Some(record);
    }

    warnings.push(ExtractWarning::new(
        WarningCode::SupplierNotFound,
        "no table matched the supplier layout; supplier columns are left blank",
    ));
    None
}
