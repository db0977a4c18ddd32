//! Reads the first worksheet of an Excel workbook.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx, open_workbook_from_rs};

use crate::{
    Error,
    import::parse::{CellValue, RawRow, excel_serial_to_date},
};

/// Read every row of the first worksheet, the header included.
///
/// Row numbers match the row numbers shown in a spreadsheet program.
///
/// # Errors
/// Returns [Error::InvalidFile] if the data is not a readable XLSX workbook or it has no
/// worksheets.
pub fn read_xlsx_rows(data: &[u8]) -> Result<Vec<RawRow>, Error> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data))
        .map_err(|error| Error::InvalidFile(format!("invalid XLSX file: {error}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::InvalidFile("the workbook has no worksheets".to_owned()))?
        .map_err(|error| Error::InvalidFile(format!("could not read worksheet: {error}")))?;

    Ok(range_to_rows(&range))
}

fn range_to_rows(range: &Range<Data>) -> Vec<RawRow> {
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    range
        .rows()
        .enumerate()
        .map(|(index, cells)| RawRow {
            row: first_row + index + 1,
            cells: cells.iter().map(cell_value).collect(),
        })
        .collect()
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Float(number) => CellValue::Number(*number),
        Data::Int(number) => CellValue::Number(*number as f64),
        Data::String(text) | Data::DateTimeIso(text) => {
            let text = text.trim();

            if text.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(text.to_owned())
            }
        }
        Data::DateTime(date_time) => match excel_serial_to_date(date_time.as_f64()) {
            Ok(date) => CellValue::Date(date),
            Err(error) => {
                tracing::debug!("Could not convert spreadsheet date: {error}");
                CellValue::Text(data.to_string())
            }
        },
        other => CellValue::Text(other.to_string()),
    }
}
