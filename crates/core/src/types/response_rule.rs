//! Keyword-triggered canned replies shown after a query is submitted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// A canned reply and the keywords that select it.
///
/// Decoding never fails on a JSON object: mistyped keywords, text or flag
/// degrade to empty values so one bad rule does not hide the others.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedResponseRule {
    /// Non-empty keywords, in backend order.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub keywords: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_text: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_default: bool,
}

impl AutomatedResponseRule {
    /// Create a keyword rule.
    #[must_use]
    pub fn new<I, S>(keywords: I, response_text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            response_text: Some(response_text.into()),
            is_default: false,
        }
    }

    /// Create the fallback rule used when no keyword matches.
    #[must_use]
    pub fn default_rule(response_text: impl Into<String>) -> Self {
        Self {
            keywords: Vec::new(),
            response_text: Some(response_text.into()),
            is_default: true,
        }
    }

    /// The first keyword that, lower-cased, occurs in `lowercase_message`.
    ///
    /// The caller lower-cases the message once for the whole rule scan.
    #[must_use]
    pub fn matched_keyword(&self, lowercase_message: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| lowercase_message.contains(&keyword.to_lowercase()))
            .map(String::as_str)
    }

    /// Decode a rule list from a raw response body.
    ///
    /// Returns `None` when the body is not a JSON array. Elements that are not
    /// objects are dropped.
    #[must_use]
    pub fn list_from_value(value: Value) -> Option<Vec<Self>> {
        let Value::Array(items) = value else {
            return None;
        };

        Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )
    }
}
