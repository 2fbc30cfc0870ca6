//! Annotation records: the parsed metadata attached to one declaration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::vocabulary::Category;

/// One entry of a category's request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum RequestToken {
    /// `$ALL`: the full category vocabulary at the exercise's index.
    Wildcard,
    /// `$UNTIL_NOW`: everything visible before the exercise's index.
    UpToHere,
    Include(String),
    Exclude(String),
}

impl RequestToken {
    pub fn is_base_selector(&self) -> bool {
        matches!(self, Self::Wildcard | Self::UpToHere)
    }
}

/// The two base selectors, kept separately for namespace-default
/// inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseSelector {
    Wildcard,
    UpToHere,
}

/// Parsed metadata for one declaration.
///
/// A declaration without an annotation block gets `Default::default()`:
/// no restriction and an empty expected-arity map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub pretty_name: Option<String>,
    pub description: Option<String>,
    /// Required bound-group count per type tag.
    pub expected_arity: BTreeMap<String, u32>,
    /// Ordered request tokens per category. A missing category means
    /// "no restriction requested" and falls back to the resolver default.
    pub category_requests: BTreeMap<Category, Vec<RequestToken>>,
}

impl AnnotationRecord {
    /// The explicit base selector of a category's request list, if any.
    pub fn base_selector(&self, category: Category) -> Option<BaseSelector> {
        self.category_requests
            .get(&category)?
            .iter()
            .find_map(|token| match token {
                RequestToken::Wildcard => Some(BaseSelector::Wildcard),
                RequestToken::UpToHere => Some(BaseSelector::UpToHere),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_selector_is_read_from_requests() {
        let mut record = AnnotationRecord::default();
        record.category_requests.insert(
            Category::Definitions,
            vec![
                RequestToken::UpToHere,
                RequestToken::Exclude("pair".to_string()),
            ],
        );
        assert_eq!(
            record.base_selector(Category::Definitions),
            Some(BaseSelector::UpToHere)
        );
        assert_eq!(record.base_selector(Category::Theorems), None);
    }
}
