use std::io::{Read, Write};
use std::string::FromUtf8Error;

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::types::{MemberRecord, MemberTable};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Header row of column names, then one row per record. Missing fields are empty.
pub fn write_csv<W: Write>(table: &MemberTable, writer: W) -> Result<(), ExportError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &MemberTable) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Reads a CSV with a header row back into records.
///
/// Empty cells are dropped, since export cannot tell an empty value from a
/// field the record never had.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<MemberRecord>, ExportError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let record: MemberRecord = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, v)| !v.is_empty())
            .collect();
        records.push(record);
    }
    Ok(records)
}
