use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to read tabula grid JSON: {0}")]
    GridJson(#[from] serde_json::Error),

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    #[error("invalid gross amount '{value}' on page {page}, table {table_id}, row {row}")]
    InvalidAmount {
        page: u32,
        table_id: usize,
        row: usize,
        value: String,
    },
}
