//! Text-grid detection for PDFs without an external table extractor.
//!
//! A line becomes a table row when it splits into at least two cells on tabs
//! or runs of two or more spaces. Consecutive rows form one table; any other
//! line ends it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::ExtractError;
use crate::grid_json::read_tabula_json;
use crate::model::{Document, Page, PageText, Table};
use crate::options::{ExtractOptions, GridFormat};
use crate::pdf_reader::read_pdf_pages;

const MIN_GRID_CELLS: usize = 2;

pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    let mut flush = |current: &mut String| {
        let cell = current.trim();
        if !cell.is_empty() {
            cells.push(cell.to_string());
        }
        current.clear();
    };

    for ch in line.trim().chars() {
        if ch == '\t' {
            flush(&mut current);
            whitespace_run = 0;
        } else if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run == 2 {
                flush(&mut current);
            } else if whitespace_run == 1 {
                current.push(' ');
            }
        } else {
            whitespace_run = 0;
            current.push(ch);
        }
    }
    flush(&mut current);

    cells
}

pub(crate) fn detect_tables_in_page(page: &PageText) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current_rows: Vec<Vec<String>> = Vec::new();

    for line in page.text.lines() {
        let cells = split_line_into_cells(line);
        if cells.len() >= MIN_GRID_CELLS {
            current_rows.push(cells);
        } else if !current_rows.is_empty() {
            tables.push(Table::new(page.page_number, std::mem::take(&mut current_rows)));
        }
    }

    if !current_rows.is_empty() {
        tables.push(Table::new(page.page_number, current_rows));
    }

    debug!(
        page = page.page_number,
        tables = tables.len(),
        "detected text-grid tables"
    );
    tables
}

pub(crate) fn build_document(pages: &[PageText]) -> Document {
    Document::new(
        pages
            .iter()
            .map(|page| Page {
                number: page.page_number,
                tables: detect_tables_in_page(page),
            })
            .collect(),
    )
}

/// Opens `input` once and materializes its grid according to `options.format`.
pub fn load_document(input: &Path, options: &ExtractOptions) -> Result<Document, ExtractError> {
    match options.format.resolve(input) {
        GridFormat::TabulaJson => {
            let reader = BufReader::new(File::open(input)?);
            read_tabula_json(reader, options.pages.as_ref())
        }
        GridFormat::Pdf | GridFormat::Auto => {
            let pages = read_pdf_pages(input, options.pages.as_ref())?;
            Ok(build_document(&pages))
        }
    }
}
