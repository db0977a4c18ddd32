//! This module defines the `Rule` type for categorizing transactions by keyword.
//! A rule matches transaction descriptions that contain its keyword (ignoring case) and
//! assigns its category.

mod create;
mod db;
mod delete;
mod list;
mod models;
mod recategorize;

pub use create::create_rule_endpoint;
pub use db::{create_rule, create_rule_table, delete_rule, get_all_rules};
pub use delete::delete_rule_endpoint;
pub use list::{categorize_endpoint, get_rules_endpoint};
pub use models::{Rule, RuleFormData};
pub use recategorize::{RecategorizeResult, recategorize_endpoint, recategorize_uncategorized};
