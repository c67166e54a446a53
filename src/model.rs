use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// A rectangular grid of trimmed text cells detected on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub page: u32,
    rows: Vec<Vec<String>>,
    col_count: usize,
}

impl Table {
    /// Trims every cell and pads short rows so the grid is rectangular.
    #[must_use]
    pub fn new(page: u32, rows: Vec<Vec<String>>) -> Self {
        let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells = row
                    .into_iter()
                    .map(|cell| cell.trim().to_string())
                    .collect::<Vec<_>>();
                cells.resize(col_count, String::new());
                cells
            })
            .collect();

        Self {
            page,
            rows,
            col_count,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn col_count(&self) -> usize {
        self.col_count
    }

    /// Text at `(row, col)`; coordinates outside the grid read as empty.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.col_count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    #[must_use]
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Every table in document order, paired with its 1-based document-wide id.
    pub fn tables(&self) -> impl Iterator<Item = (usize, &Table)> {
        self.pages
            .iter()
            .flat_map(|page| page.tables.iter())
            .enumerate()
            .map(|(index, table)| (index + 1, table))
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|page| page.tables.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierRecord {
    pub name: String,
    pub number: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub document: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRow {
    pub page: u32,
    pub table_id: usize,
    pub row: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedOutput {
    /// Rows written ahead of the header in the separate layout.
    pub preamble: Vec<Vec<String>>,
    pub headers: Vec<String>,
    /// Line-item rows followed by the total row.
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::{Document, Page, Table};

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn pads_ragged_rows_and_trims_cells() {
        let table = Table::new(1, vec![cells(&[" a ", "b"]), cells(&["c"])]);
        assert_eq!(table.col_count(), 2);
        assert_eq!(table.cell(0, 0), "a");
        assert_eq!(table.cell(1, 0), "c");
        assert_eq!(table.cell(1, 1), "");
        assert_eq!(table.rows().nth(1).map(<[String]>::len), Some(2));
    }

    #[test]
    fn out_of_range_cells_read_empty() {
        let table = Table::new(1, vec![cells(&["a"])]);
        assert_eq!(table.cell(0, 5), "");
        assert_eq!(table.cell(9, 0), "");
    }

    #[test]
    fn numbers_tables_across_pages_in_order() {
        let document = Document::new(vec![
            Page {
                number: 1,
                tables: vec![Table::new(1, vec![cells(&["x"])])],
            },
            Page {
                number: 2,
                tables: vec![
                    Table::new(2, vec![cells(&["y"])]),
                    Table::new(2, vec![cells(&["z"])]),
                ],
            },
        ]);

        let ids = document
            .tables()
            .map(|(id, table)| (id, table.cell(0, 0).to_string()))
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                (1, "x".to_string()),
                (2, "y".to_string()),
                (3, "z".to_string())
            ]
        );
        assert_eq!(document.table_count(), 3);
    }
}
