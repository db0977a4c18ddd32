use serde::{Deserialize, Serialize};

use crate::database_id::RuleId;

/// A rule that assigns `category` to transactions whose descriptions contain `keyword`.
/// Keyword matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Rule {
    /// The ID of the rule, rules are tried in ascending ID order.
    pub id: RuleId,

    /// The text that transaction descriptions must contain (case-insensitive).
    pub keyword: String,

    /// The category to assign when this rule matches.
    pub category: String,
}

/// Request body for creating rules.
#[derive(Debug, Serialize, Deserialize)]
pub struct RuleFormData {
    /// The text that transaction descriptions must contain (case-insensitive).
    pub keyword: String,
    /// The category to assign when this rule matches.
    pub category: String,
}
