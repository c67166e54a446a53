//! Tabula-compatible JSON grids.
//!
//! `tabula-java -f JSON` writes an array of tables, each carrying the page it
//! was found on and its rows of cells. Geometry fields are accepted and
//! ignored on input, and omitted on output.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::model::{Document, Page, Table};
use crate::options::PageSelection;

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
struct JsonTableSet(Vec<JsonTable>);

#[derive(Debug, Serialize, Deserialize)]
struct JsonTable {
    #[serde(default)]
    extraction_method: String,
    page_number: u32,
    data: Vec<JsonRow>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
struct JsonRow(Vec<JsonCell>);

#[derive(Debug, Serialize, Deserialize)]
struct JsonCell {
    text: String,
}

const DUMP_EXTRACTION_METHOD: &str = "text-grid";

pub(crate) fn read_tabula_json<R: Read>(
    reader: R,
    page_selection: Option<&PageSelection>,
) -> Result<Document, ExtractError> {
    let JsonTableSet(tables) = serde_json::from_reader(reader)?;

    let mut pages: Vec<Page> = Vec::new();
    for table in tables {
        if page_selection.is_some_and(|selection| !selection.contains(table.page_number)) {
            continue;
        }

        let rows = table
            .data
            .into_iter()
            .map(|JsonRow(cells)| cells.into_iter().map(|cell| cell.text).collect())
            .collect::<Vec<Vec<String>>>();
        let grid = Table::new(table.page_number, rows);
        if grid.is_empty() {
            continue;
        }

        // tabula emits tables page by page, so a page change starts a new Page.
        match pages.last_mut() {
            Some(page) if page.number == table.page_number => page.tables.push(grid),
            _ => pages.push(Page {
                number: table.page_number,
                tables: vec![grid],
            }),
        }
    }

    if page_selection.is_some() && pages.is_empty() {
        return Err(ExtractError::NoPagesSelected);
    }

    Ok(Document::new(pages))
}

pub(crate) fn write_tabula_json<W: Write>(
    writer: W,
    document: &Document,
) -> Result<(), ExtractError> {
    let tables = document
        .tables()
        .map(|(_, table)| JsonTable {
            extraction_method: DUMP_EXTRACTION_METHOD.to_string(),
            page_number: table.page,
            data: table
                .rows()
                .map(|row| {
                    JsonRow(
                        row.iter()
                            .map(|text| JsonCell { text: text.clone() })
                            .collect(),
                    )
                })
                .collect(),
        })
        .collect();

    serde_json::to_writer_pretty(writer, &JsonTableSet(tables))?;
    Ok(())
}
