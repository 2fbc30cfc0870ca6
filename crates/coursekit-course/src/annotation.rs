//! Annotation parser: fold one block's scanned tokens into an
//! [`AnnotationRecord`].
//!
//! Name resolution is deliberately *not* performed here. Include/exclude
//! names are kept raw and resolved later against the registry at the
//! exercise's index, so the record stays a pure description of what the
//! author asked for.

use std::collections::BTreeMap;

use coursekit_kernel::{AnnotationRecord, Category, CourseError, RequestToken};

use crate::scan::{ScanToken, SectionHeader};

/// The outcome of parsing one annotation block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAnnotation {
    pub record: AnnotationRecord,
    /// A `Section` title, which applies to the enclosing namespace rather
    /// than to a declaration.
    pub section_title: Option<String>,
}

impl ParsedAnnotation {
    /// True when the block carried declaration-level metadata (anything
    /// beyond a namespace `Section` title).
    pub fn has_declaration_fields(&self) -> bool {
        self.record != AnnotationRecord::default()
    }
}

/// Fold scanned tokens into a record, collecting per-line failures.
pub fn parse_annotation(tokens: &[ScanToken]) -> (ParsedAnnotation, Vec<(usize, CourseError)>) {
    let mut issues = Vec::new();
    let mut current: Option<SectionHeader> = None;
    let mut pretty_lines: Vec<String> = Vec::new();
    let mut description_lines: Vec<String> = Vec::new();
    let mut section_lines: Vec<String> = Vec::new();
    let mut expected_arity: BTreeMap<String, u32> = BTreeMap::new();
    let mut requests: BTreeMap<Category, Vec<(RequestToken, usize)>> = BTreeMap::new();

    for token in tokens {
        match token {
            ScanToken::Header { header, .. } => current = Some(*header),
            ScanToken::Request { token, line } => {
                if let Some(SectionHeader::Tools(category)) = current {
                    requests
                        .entry(category)
                        .or_default()
                        .push((token.clone(), *line));
                }
            }
            ScanToken::Value { text, .. } => match current {
                Some(SectionHeader::PrettyName) => pretty_lines.push(text.clone()),
                Some(SectionHeader::Description) => description_lines.push(text.clone()),
                Some(SectionHeader::Section) => section_lines.push(text.clone()),
                _ => {}
            },
            ScanToken::KeyValue { text, line } => {
                if current == Some(SectionHeader::ExpectedVarsNumber) {
                    parse_arity_line(text, *line, &mut expected_arity, &mut issues);
                }
            }
        }
    }

    let mut record = AnnotationRecord {
        pretty_name: join_lines(pretty_lines),
        description: join_lines(description_lines),
        expected_arity,
        category_requests: BTreeMap::new(),
    };

    for (category, tokens) in requests {
        match validate_requests(category, &tokens) {
            Ok(list) => {
                record.category_requests.insert(category, list);
            }
            Err(issue) => {
                // The category falls back to the unrestricted default so
                // the rest of the exercise still resolves.
                issues.push(issue);
            }
        }
    }

    let parsed = ParsedAnnotation {
        section_title: join_lines(section_lines),
        record,
    };
    (parsed, issues)
}

/// Extra value lines are continuations, not errors: course authors wrap
/// prose. They join with a single space.
fn join_lines(lines: Vec<String>) -> Option<String> {
    let joined = lines.join(" ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

/// Base selectors are mutually exclusive and must open the request list.
fn validate_requests(
    category: Category,
    tokens: &[(RequestToken, usize)],
) -> Result<Vec<RequestToken>, (usize, CourseError)> {
    for (position, (token, line)) in tokens.iter().enumerate() {
        if token.is_base_selector() && position > 0 {
            return Err((
                *line,
                CourseError::ConflictingBaseSelector { category },
            ));
        }
    }
    Ok(tokens.iter().map(|(token, _)| token.clone()).collect())
}

fn parse_arity_line(
    text: &str,
    line: usize,
    expected: &mut BTreeMap<String, u32>,
    issues: &mut Vec<(usize, CourseError)>,
) {
    for piece in text.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let Some((name, count)) = piece.split_once('=') else {
            issues.push((
                line,
                CourseError::InvalidArityExpression {
                    expression: piece.to_string(),
                },
            ));
            continue;
        };
        let name = name.trim();
        match count.trim().parse::<i64>() {
            Ok(value) if !name.is_empty() && value >= 0 && value <= u32::MAX as i64 => {
                expected.insert(name.to_string(), value as u32);
            }
            _ => {
                issues.push((
                    line,
                    CourseError::InvalidArityExpression {
                        expression: piece.to_string(),
                    },
                ));
            }
        }
    }
}
