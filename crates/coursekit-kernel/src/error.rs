//! Error taxonomy and issue collection.
//!
//! Every failure is detected at parse or resolve time and attributed to a
//! declaration and line. Failures are collected into a [`CourseReport`]
//! rather than aborting the course: one broken annotation must not cost
//! the resolutions of every other exercise.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::vocabulary::Category;

/// Stable failure-class identifiers for report consumers.
pub mod failure_class {
    pub const MALFORMED_HEADER: &str = "malformed_header";
    pub const DUPLICATE_NAME: &str = "duplicate_name";
    pub const UNKNOWN_IDENTIFIER: &str = "unknown_identifier";
    pub const CONFLICTING_BASE_SELECTOR: &str = "conflicting_base_selector";
    pub const INVALID_ARITY_EXPRESSION: &str = "invalid_arity_expression";
    pub const ARITY_MISMATCH: &str = "arity_mismatch";
    pub const UNCLOSED_BLOCK: &str = "unclosed_block";
    pub const ORPHAN_ANNOTATION: &str = "orphan_annotation";
    pub const DUPLICATE_ANNOTATION: &str = "duplicate_annotation";
    pub const UNBALANCED_NAMESPACE: &str = "unbalanced_namespace";
}

/// Everything that can go wrong while parsing annotations or resolving
/// toolsets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseError {
    /// A line at header position matches no known section header.
    #[error("malformed section header `{header}`")]
    MalformedHeader { header: String },

    /// A qualified name is already visible from the registration scope.
    #[error("duplicate name `{name}`")]
    DuplicateName { name: String },

    /// An include token names nothing visible in its category.
    #[error("unknown identifier `{name}` in {category}")]
    UnknownIdentifier { name: String, category: Category },

    /// `$ALL` and `$UNTIL_NOW` collide, or a base selector is not the
    /// first token of its line.
    #[error("conflicting base selector in {category}")]
    ConflictingBaseSelector { category: Category },

    /// An `ExpectedVarsNumber` entry is not `name=nonnegative-integer`.
    #[error("invalid arity expression `{expression}`")]
    InvalidArityExpression { expression: String },

    /// The declared bound-group count for a type tag differs from the
    /// statement signature.
    #[error("arity mismatch for `{type_tag}`: expected {expected}, found {actual}")]
    ArityMismatch {
        type_tag: String,
        expected: u32,
        actual: u32,
    },

    /// An annotation block was still open at end of input.
    #[error("annotation block opened at line {opened_at} is never closed")]
    UnclosedBlock { opened_at: usize },

    /// An annotation block precedes any declaration it could attach to.
    #[error("annotation block attaches to no declaration")]
    OrphanAnnotation,

    /// A second annotation block for a declaration that already has one.
    /// The later block wins; the earlier restrictions are gone.
    #[error("a later annotation block replaces the one for `{name}`")]
    DuplicateAnnotation { name: String },

    /// An `end <name>` matches no open namespace.
    #[error("`end {name}` matches no open namespace")]
    UnbalancedNamespace { name: String },
}

impl CourseError {
    pub fn failure_class(&self) -> &'static str {
        match self {
            Self::MalformedHeader { .. } => failure_class::MALFORMED_HEADER,
            Self::DuplicateName { .. } => failure_class::DUPLICATE_NAME,
            Self::UnknownIdentifier { .. } => failure_class::UNKNOWN_IDENTIFIER,
            Self::ConflictingBaseSelector { .. } => failure_class::CONFLICTING_BASE_SELECTOR,
            Self::InvalidArityExpression { .. } => failure_class::INVALID_ARITY_EXPRESSION,
            Self::ArityMismatch { .. } => failure_class::ARITY_MISMATCH,
            Self::UnclosedBlock { .. } => failure_class::UNCLOSED_BLOCK,
            Self::OrphanAnnotation => failure_class::ORPHAN_ANNOTATION,
            Self::DuplicateAnnotation { .. } => failure_class::DUPLICATE_ANNOTATION,
            Self::UnbalancedNamespace { .. } => failure_class::UNBALANCED_NAMESPACE,
        }
    }
}

/// One collected failure, attributed to its locus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub failure_class: String,
    /// Dotted name of the declaration the failure belongs to, if known.
    pub declaration: Option<String>,
    /// 1-based source line, if known.
    pub line: Option<usize>,
    pub message: String,
}

impl Issue {
    pub fn new(error: &CourseError, declaration: Option<String>, line: Option<usize>) -> Self {
        Self {
            failure_class: error.failure_class().to_string(),
            declaration,
            line,
            message: error.to_string(),
        }
    }
}

/// The collected outcome of parsing and resolving one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseReport {
    pub result: String,
    pub failure_classes: Vec<String>,
    pub issues: Vec<Issue>,
}

impl CourseReport {
    pub fn from_issues(mut issues: Vec<Issue>) -> Self {
        issues.sort_by(|a, b| {
            (&a.line, &a.declaration, &a.failure_class, &a.message).cmp(&(
                &b.line,
                &b.declaration,
                &b.failure_class,
                &b.message,
            ))
        });
        let failure_classes: Vec<String> = issues
            .iter()
            .map(|issue| issue.failure_class.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            result: if issues.is_empty() {
                "accepted".to_string()
            } else {
                "rejected".to_string()
            },
            failure_classes,
            issues,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_sorts_and_dedups_classes() {
        let a = Issue::new(
            &CourseError::OrphanAnnotation,
            None,
            Some(9),
        );
        let b = Issue::new(
            &CourseError::MalformedHeader {
                header: "Tools->Magic".to_string(),
            },
            Some("exercise.union_comm".to_string()),
            Some(3),
        );
        let c = Issue::new(
            &CourseError::MalformedHeader {
                header: "Tools->Magik".to_string(),
            },
            Some("exercise.union_comm".to_string()),
            Some(4),
        );
        let report = CourseReport::from_issues(vec![a, b, c]);
        assert_eq!(report.result, "rejected");
        assert_eq!(
            report.failure_classes,
            vec!["malformed_header", "orphan_annotation"]
        );
        assert_eq!(report.issues[0].line, Some(3));
        assert_eq!(report.issues[2].line, Some(9));
    }

    #[test]
    fn empty_report_is_accepted() {
        let report = CourseReport::from_issues(Vec::new());
        assert!(report.is_accepted());
        assert_eq!(report.result, "accepted");
    }
}
