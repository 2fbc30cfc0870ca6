//! Expected-arity validation.
//!
//! Course authors declare, per type tag, how many bound-variable groups
//! the exercise statement is supposed to introduce. The statement's own
//! signature is the ground truth; this check catches metadata that
//! drifted from the statement.

use std::collections::BTreeMap;

use crate::declaration::Declaration;
use crate::error::CourseError;

/// Cross-check declared bound-group counts against the statement
/// signature. A type tag absent from `expected` is unchecked.
pub fn validate_expected_arity(
    declaration: &Declaration,
    expected: &BTreeMap<String, u32>,
) -> Vec<CourseError> {
    let mut actual_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for group in &declaration.statement_signature {
        *actual_counts.entry(group.type_tag.as_str()).or_insert(0) += 1;
    }
    expected
        .iter()
        .filter_map(|(type_tag, &expected_count)| {
            let actual = actual_counts.get(type_tag.as_str()).copied().unwrap_or(0);
            (actual != expected_count).then(|| CourseError::ArityMismatch {
                type_tag: type_tag.clone(),
                expected: expected_count,
                actual,
            })
        })
        .collect()
}
