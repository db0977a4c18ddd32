//! Bulk import of transactions from CSV and XLSX files.
//!
//! A file is parsed completely before anything is written, and the rows are then inserted in a
//! single SQL transaction. Either every row of a file is stored or none are.

mod csv;
mod endpoint;
mod parse;
mod xlsx;

use rusqlite::Connection;

use crate::{
    Error, UserID,
    category::categorize,
    rule::get_all_rules,
    transaction::{Transaction, create_transaction},
};

pub use endpoint::{ImportResponse, import_transactions_endpoint};
pub use parse::ImportRow;

/// The kinds of file that can be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma separated values with a header row.
    Csv,
    /// An Excel workbook, only the first worksheet is read.
    Xlsx,
}

impl FileFormat {
    /// Pick the format from the extension of `file_name`, ignoring case.
    ///
    /// # Errors
    /// Returns [Error::UnsupportedFormat] if the extension is not `.csv` or `.xlsx`.
    pub fn from_file_name(file_name: &str) -> Result<Self, Error> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("xlsx") => Ok(Self::Xlsx),
            _ => Err(Error::UnsupportedFormat(file_name.to_owned())),
        }
    }
}

/// Read and parse every row of the file `file_name` with the contents `data`.
///
/// Nothing here touches the database, so uploads can be parsed before the connection is locked.
///
/// # Errors
/// Returns a:
/// - [Error::UnsupportedFormat] if the file is not a CSV or XLSX file,
/// - [Error::InvalidFile] if the file cannot be read as its format,
/// - [Error::MissingColumn] if the header lacks a required column,
/// - or [Error::MalformedRow] for the first row that cannot be parsed.
pub fn parse_file(file_name: &str, data: &[u8]) -> Result<Vec<ImportRow>, Error> {
    let raw_rows = match FileFormat::from_file_name(file_name)? {
        FileFormat::Csv => csv::read_csv_rows(data)?,
        FileFormat::Xlsx => xlsx::read_xlsx_rows(data)?,
    };

    parse::parse_rows(raw_rows)
}

/// Store parsed `rows` for `user_id` in a single SQL transaction.
///
/// Rows without a category are categorized with the user's rules as they are when the import
/// starts. Returns the number of transactions stored.
///
/// # Errors
/// Returns [Error::SqlError] if any row cannot be stored, in which case none are.
pub fn store_rows(
    rows: &[ImportRow],
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let rules = get_all_rules(user_id, &sql_transaction)?;

    for row in rows {
        let category = match row.category {
            Some(ref category) => category.clone(),
            None => categorize(&row.description, &rules),
        };
        let builder =
            Transaction::build(row.amount, row.date, &row.description).category(&category);

        create_transaction(builder, user_id, &sql_transaction).inspect_err(|error| {
            tracing::error!("Could not insert row {}: {error}", row.row)
        })?;
    }

    sql_transaction.commit()?;

    Ok(rows.len())
}

/// Import the transactions in the file `file_name` with the contents `data` for `user_id`.
///
/// Combines [parse_file] and [store_rows]. Nothing is stored if an error is returned.
///
/// # Errors
/// See [parse_file] and [store_rows].
pub fn ingest(
    file_name: &str,
    data: &[u8],
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    let rows = parse_file(file_name, data)?;

    store_rows(&rows, user_id, connection)
}
