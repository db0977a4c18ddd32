//! Reads comma separated files.

use csv::{ReaderBuilder, Trim};

use crate::{
    Error,
    import::parse::{CellValue, RawRow},
};

/// Read every record of a CSV file, the header included, as text cells.
///
/// Records may have different lengths, missing fields are reported when the row is parsed.
/// Rows are numbered by record, blank lines are not counted.
///
/// # Errors
/// Returns [Error::InvalidFile] if the data is not valid UTF-8 CSV.
pub fn read_csv_rows(data: &[u8]) -> Result<Vec<RawRow>, Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            let record =
                record.map_err(|error| Error::InvalidFile(format!("invalid CSV: {error}")))?;

            let cells = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_owned())
                    }
                })
                .collect();

            Ok(RawRow {
                row: index + 1,
                cells,
            })
        })
        .collect()
}
