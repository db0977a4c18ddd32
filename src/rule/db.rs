use rusqlite::{Connection, Row};

use crate::{Error, UserID, database_id::RuleId, rule::models::Rule};

/// Create a rule in the database.
///
/// `keyword` and `category` are trimmed before they are stored. Keywords are unique per user,
/// ignoring case, so "amazon" cannot be added once "Amazon" exists.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the keyword or category is blank,
/// - [Error::DuplicateKeyword] if the user already has a rule for the keyword,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_rule(
    keyword: &str,
    category: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Rule, Error> {
    let keyword = keyword.trim();
    let category = category.trim();

    if keyword.is_empty() {
        return Err(Error::InvalidInput("Keyword cannot be empty".to_owned()));
    }

    if category.is_empty() {
        return Err(Error::InvalidInput("Category cannot be empty".to_owned()));
    }

    connection
        .prepare(
            "INSERT INTO rule (user_id, keyword, category) VALUES (?1, ?2, ?3)
             RETURNING id, keyword, category",
        )?
        .query_row((user_id.as_i64(), keyword, category), map_rule_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateKeyword(keyword.to_owned()),
            error => error.into(),
        })
}

/// Retrieve a rule in the database by `rule_id`.
///
/// # Errors
/// This function will return [Error::NotFound] if the user has no rule with `rule_id`,
/// or [Error::SqlError] if there is some other SQL error.
#[cfg(test)]
pub(super) fn get_rule(
    rule_id: RuleId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Rule, Error> {
    connection
        .prepare("SELECT id, keyword, category FROM rule WHERE id = :id AND user_id = :user_id")?
        .query_row(
            &[(":id", &rule_id), (":user_id", &user_id.as_i64())],
            map_rule_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's rules in the order they were created.
///
/// This is the order the categorization engine tries them in.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_rules(user_id: UserID, connection: &Connection) -> Result<Vec<Rule>, Error> {
    connection
        .prepare("SELECT id, keyword, category FROM rule WHERE user_id = ?1 ORDER BY id ASC")?
        .query_map([user_id.as_i64()], map_rule_row)?
        .map(|maybe_rule| maybe_rule.map_err(|error| error.into()))
        .collect()
}

/// Delete a rule from the database.
///
/// # Errors
/// This function will return [Error::NotFound] if the user has no rule with `rule_id`,
/// or [Error::SqlError] if there is some other SQL error.
pub fn delete_rule(rule_id: RuleId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM rule WHERE id = ?1 AND user_id = ?2",
        (rule_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the rule table in the database.
///
/// `COLLATE NOCASE` on the keyword makes the unique constraint case-insensitive.
///
/// SQLite only folds ASCII letters, so "Café" and "CAFÉ" can both be stored even though
/// [crate::categorize] matches them against the same descriptions. The earlier rule wins.
pub fn create_rule_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS rule (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                -- NOCASE folds ASCII only, non-ASCII keywords are unique by exact case.
                keyword TEXT NOT NULL COLLATE NOCASE,
                category TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                UNIQUE(user_id, keyword)
            );",
        (),
    )?;

    // Create index for foreign key to improve query performance
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_rule_user_id ON rule(user_id)",
        (),
    )?;

    Ok(())
}

fn map_rule_row(row: &Row) -> Result<Rule, rusqlite::Error> {
    let id = row.get(0)?;
    let keyword = row.get(1)?;
    let category = row.get(2)?;

    Ok(Rule {
        id,
        keyword,
        category,
    })
}
