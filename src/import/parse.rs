//! Turns the rows of a tabular file into validated import rows.
//!
//! The CSV and XLSX readers both produce rows of [CellValue]s so that the header matching and
//! the per-row parsing are shared.

use time::{Date, Duration, macros::date, macros::format_description};

use crate::Error;

/// A single cell read from an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// A blank cell, or a field missing from a short CSV record.
    Empty,
    /// Text, trimmed of surrounding whitespace.
    Text(String),
    /// A numeric spreadsheet cell.
    Number(f64),
    /// A native spreadsheet date cell.
    Date(Date),
}

impl CellValue {
    fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(number) => number.to_string(),
            CellValue::Date(date) => date.to_string(),
        }
    }
}

/// A row of a tabular file, tagged with its 1-based row number in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// The row number in the file, the header is row 1.
    pub row: usize,
    /// The cells of the row in column order.
    pub cells: Vec<CellValue>,
}

/// One transaction parsed from an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// The row number in the file the transaction came from.
    pub row: usize,
    /// When the transaction happened.
    pub date: Date,
    /// The transaction description, possibly empty.
    pub description: String,
    /// The amount of the transaction, negative for expenses.
    pub amount: f64,
    /// The category given in the file, if the file has a non-blank category for this row.
    pub category: Option<String>,
}

/// Where the recognised columns are in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndices {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

impl ColumnIndices {
    /// Match the header names, ignoring case and surrounding whitespace.
    ///
    /// Unknown columns are ignored. If a name appears more than once the first column wins.
    fn from_header(header: &[CellValue]) -> Result<Self, Error> {
        let names: Vec<String> = header
            .iter()
            .map(|cell| cell.to_text().trim().to_lowercase())
            .collect();
        let find = |name: &str| names.iter().position(|header_name| header_name == name);
        let require =
            |name: &str| find(name).ok_or_else(|| Error::MissingColumn(name.to_owned()));

        Ok(Self {
            date: require("date")?,
            description: require("description")?,
            amount: require("amount")?,
            category: find("category"),
        })
    }
}

/// Parse every data row, failing on the first bad row.
///
/// The first row is the header. Rows whose cells are all blank are skipped. A file with no
/// rows at all yields no transactions.
///
/// # Errors
/// Returns a:
/// - [Error::MissingColumn] if the header lacks a date, description or amount column,
/// - or [Error::MalformedRow] for the first row with a missing or unreadable field.
pub fn parse_rows(rows: Vec<RawRow>) -> Result<Vec<ImportRow>, Error> {
    let mut rows = rows.into_iter();

    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let columns = ColumnIndices::from_header(&header.cells)?;

    rows.filter(|raw_row| !raw_row.cells.iter().all(CellValue::is_empty))
        .map(|raw_row| parse_row(raw_row, columns))
        .collect()
}

fn parse_row(raw_row: RawRow, columns: ColumnIndices) -> Result<ImportRow, Error> {
    let row = raw_row.row;
    let cell = |index: usize| raw_row.cells.get(index).unwrap_or(&CellValue::Empty);
    let malformed = |reason: String| Error::MalformedRow { row, reason };

    let date = parse_date_cell(cell(columns.date)).map_err(malformed)?;
    let amount = parse_amount_cell(cell(columns.amount)).map_err(malformed)?;
    let description = cell(columns.description).to_text();
    let category = columns
        .category
        .map(|index| cell(index).to_text())
        .filter(|category| !category.is_empty());

    Ok(ImportRow {
        row,
        date,
        description,
        amount,
        category,
    })
}

fn parse_date_cell(cell: &CellValue) -> Result<Date, String> {
    match cell {
        CellValue::Empty => Err("missing date".to_owned()),
        CellValue::Text(text) if text.is_empty() => Err("missing date".to_owned()),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Date(date) => Ok(*date),
    }
}

/// Parse a `YYYY-MM-DD` date, ignoring a time part after a 'T' or a space.
fn parse_date_text(text: &str) -> Result<Date, String> {
    let date_part = text
        .split(['T', ' '])
        .next()
        .unwrap_or(text);

    Date::parse(date_part, format_description!("[year]-[month]-[day]"))
        .map_err(|error| format!("invalid date \"{text}\", expected YYYY-MM-DD: {error}"))
}

/// Convert an Excel serial date (days since 1899-12-30) to a date.
///
/// Any fractional part is the time of day and is dropped.
pub fn excel_serial_to_date(serial: f64) -> Result<Date, String> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    const EXCEL_EPOCH: Date = date!(1899 - 12 - 30);

    // The serial for 9999-12-31, the last date Excel can display.
    const MAX_SERIAL: f64 = 2_958_465.0;

    if !serial.is_finite() || serial < 0.0 {
        return Err(format!("invalid spreadsheet date {serial}"));
    }

    if serial >= MAX_SERIAL + 1.0 {
        return Err(format!("spreadsheet date {serial} is out of range"));
    }

    EXCEL_EPOCH
        .checked_add(Duration::days(serial.trunc() as i64))
        .ok_or_else(|| format!("spreadsheet date {serial} is out of range"))
}

fn parse_amount_cell(cell: &CellValue) -> Result<f64, String> {
    let amount = match cell {
        CellValue::Empty => return Err("missing amount".to_owned()),
        CellValue::Text(text) if text.is_empty() => return Err("missing amount".to_owned()),
        CellValue::Text(text) => text
            .parse::<f64>()
            .map_err(|_| format!("invalid amount \"{text}\""))?,
        CellValue::Number(number) => *number,
        CellValue::Date(date) => return Err(format!("expected an amount, got the date {date}")),
    };

    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(format!("invalid amount \"{}\"", cell.to_text()))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::{CellValue, ImportRow, RawRow, excel_serial_to_date, parse_rows};

    fn text_row(row: usize, cells: &[&str]) -> RawRow {
        RawRow {
            row,
            cells: cells
                .iter()
                .map(|cell| CellValue::Text((*cell).to_owned()))
                .collect(),
        }
    }

    #[test]
    fn parses_rows_after_header() {
        let rows = vec![
            text_row(1, &["Date", "Description", "Amount", "Category"]),
            text_row(2, &["2024-01-05", "Salary", "2500", ""]),
            text_row(3, &["2024-01-06", "Bakery", "-4.50", "food"]),
        ];

        let got = parse_rows(rows).unwrap();

        assert_eq!(
            got,
            vec![
                ImportRow {
                    row: 2,
                    date: date!(2024 - 01 - 05),
                    description: "Salary".to_owned(),
                    amount: 2500.0,
                    category: None,
                },
                ImportRow {
                    row: 3,
                    date: date!(2024 - 01 - 06),
                    description: "Bakery".to_owned(),
                    amount: -4.5,
                    category: Some("food".to_owned()),
                },
            ]
        );
    }

    #[test]
    fn header_matching_ignores_case_whitespace_and_order() {
        let rows = vec![
            text_row(1, &[" AMOUNT ", "notes", "dAtE", "Description"]),
            text_row(2, &["-12", "ignored", "2024-02-29", "Lunch"]),
        ];

        let got = parse_rows(rows).unwrap();

        assert_eq!(got[0].amount, -12.0);
        assert_eq!(got[0].date, date!(2024 - 02 - 29));
        assert_eq!(got[0].description, "Lunch");
        assert_eq!(got[0].category, None);
    }

    #[test]
    fn missing_required_column() {
        let rows = vec![text_row(1, &["date", "description", "value"])];

        let result = parse_rows(rows);

        assert_eq!(result, Err(Error::MissingColumn("amount".to_owned())));
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert_eq!(parse_rows(Vec::new()), Ok(Vec::new()));
        assert_eq!(
            parse_rows(vec![text_row(1, &["date", "description", "amount"])]),
            Ok(Vec::new())
        );
    }

    #[test]
    fn short_row_is_malformed() {
        let rows = vec![
            text_row(1, &["date", "description", "amount"]),
            text_row(2, &["2024-01-05", "Salary", "2500"]),
            text_row(3, &["2024-01-06", "Bakery"]),
        ];

        let result = parse_rows(rows);

        assert_eq!(
            result,
            Err(Error::MalformedRow {
                row: 3,
                reason: "missing amount".to_owned()
            })
        );
    }

    #[test]
    fn unreadable_fields_are_malformed() {
        let header = text_row(1, &["date", "description", "amount"]);

        for bad_row in [
            text_row(2, &["05/01/2024", "Salary", "2500"]),
            text_row(2, &["2024-13-01", "Salary", "2500"]),
            text_row(2, &["2024-01-05", "Salary", "$2,500"]),
            text_row(2, &["2024-01-05", "Salary", "NaN"]),
            text_row(2, &["", "Salary", "2500"]),
        ] {
            let result = parse_rows(vec![header.clone(), bad_row.clone()]);

            assert!(
                matches!(result, Err(Error::MalformedRow { row: 2, .. })),
                "want malformed row error for {bad_row:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn date_text_may_include_time() {
        let rows = vec![
            text_row(1, &["date", "description", "amount"]),
            text_row(2, &["2024-01-05T13:45:00", "a", "1"]),
            text_row(3, &["2024-01-06 08:00", "b", "1"]),
        ];

        let got = parse_rows(rows).unwrap();

        assert_eq!(got[0].date, date!(2024 - 01 - 05));
        assert_eq!(got[1].date, date!(2024 - 01 - 06));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let rows = vec![
            text_row(1, &["date", "description", "amount"]),
            text_row(2, &["", "", ""]),
            RawRow {
                row: 3,
                cells: vec![CellValue::Empty, CellValue::Empty],
            },
            text_row(4, &["2024-01-05", "Salary", "2500"]),
        ];

        let got = parse_rows(rows).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].row, 4);
    }

    #[test]
    fn empty_description_is_allowed() {
        let rows = vec![
            text_row(1, &["date", "description", "amount"]),
            text_row(2, &["2024-01-05", "", "-3"]),
        ];

        let got = parse_rows(rows).unwrap();

        assert_eq!(got[0].description, "");
    }

    #[test]
    fn spreadsheet_cells() {
        let rows = vec![
            text_row(1, &["date", "description", "amount", "category"]),
            RawRow {
                row: 2,
                cells: vec![
                    CellValue::Number(45306.0),
                    CellValue::Text("Uber".to_owned()),
                    CellValue::Number(-23.5),
                    CellValue::Empty,
                ],
            },
            RawRow {
                row: 3,
                cells: vec![
                    CellValue::Date(date!(2024 - 01 - 16)),
                    CellValue::Number(42.0),
                    CellValue::Text("7".to_owned()),
                    CellValue::Text("misc".to_owned()),
                ],
            },
        ];

        let got = parse_rows(rows).unwrap();

        assert_eq!(got[0].date, date!(2024 - 01 - 15));
        assert_eq!(got[0].amount, -23.5);
        assert_eq!(got[0].category, None);
        assert_eq!(got[1].date, date!(2024 - 01 - 16));
        assert_eq!(got[1].description, "42");
        assert_eq!(got[1].amount, 7.0);
        assert_eq!(got[1].category, Some("misc".to_owned()));
    }

    #[test]
    fn date_cell_in_amount_column_is_malformed() {
        let rows = vec![
            text_row(1, &["date", "description", "amount"]),
            RawRow {
                row: 2,
                cells: vec![
                    CellValue::Text("2024-01-05".to_owned()),
                    CellValue::Text("Salary".to_owned()),
                    CellValue::Date(date!(2024 - 01 - 05)),
                ],
            },
        ];

        let result = parse_rows(rows);

        assert!(matches!(result, Err(Error::MalformedRow { row: 2, .. })));
    }

    #[test]
    fn excel_serial_dates() {
        assert_eq!(excel_serial_to_date(1.0), Ok(date!(1899 - 12 - 31)));
        assert_eq!(excel_serial_to_date(45306.75), Ok(date!(2024 - 01 - 15)));
        assert!(excel_serial_to_date(-1.0).is_err());
        assert!(excel_serial_to_date(f64::INFINITY).is_err());
    }

    #[test]
    fn excel_serial_dates_stop_at_year_9999() {
        assert_eq!(excel_serial_to_date(2_958_465.5), Ok(date!(9999 - 12 - 31)));
        assert!(excel_serial_to_date(2_958_466.0).is_err());
        assert!(excel_serial_to_date(1e15).is_err());
    }

    #[test]
    fn huge_serial_date_is_malformed_row() {
        let rows = vec![
            text_row(1, &["date", "description", "amount"]),
            RawRow {
                row: 2,
                cells: vec![
                    CellValue::Number(1e15),
                    CellValue::Text("Coffee".to_owned()),
                    CellValue::Number(1.0),
                ],
            },
        ];

        let result = parse_rows(rows);

        assert!(matches!(result, Err(Error::MalformedRow { row: 2, .. })));
    }
}
