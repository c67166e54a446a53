use std::io::{self, Write};
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::ExtractError;
use crate::model::MergedOutput;

// The total and preamble rows are shorter than the header.
fn builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.flexible(true);
    builder
}

fn write_records<W: Write>(writer: &mut Writer<W>, merged: &MergedOutput) -> Result<(), ExtractError> {
    for row in &merged.preamble {
        writer.write_record(row)?;
    }
    writer.write_record(&merged.headers)?;
    for row in &merged.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv(path: &Path, merged: &MergedOutput) -> Result<(), ExtractError> {
    let mut writer = builder().from_path(path)?;
    write_records(&mut writer, merged)
}

pub(crate) fn write_csv_to_string(merged: &MergedOutput) -> Result<String, ExtractError> {
    let mut writer = builder().from_writer(Vec::<u8>::new());
    write_records(&mut writer, merged)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error).into())
}
