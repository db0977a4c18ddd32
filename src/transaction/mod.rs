//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Filtering shared by the transaction listing and the reports
//! - Route handlers for the transaction CRUD endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod query;

pub use core::{
    Transaction, TransactionBuilder, create_transaction, create_transaction_table,
    explicit_category, get_transaction, map_transaction_row,
};
pub use create_endpoint::{TransactionForm, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::{get_transaction_endpoint, get_transactions_endpoint};
pub use query::{TransactionFilter, TransactionKind, TransactionQuery, query_transactions};

#[cfg(test)]
pub use core::count_transactions;
