//! The whole-course pipeline.
//!
//! One pass over the file, in source order: namespace markers mutate the
//! scope stack, declaration headers register into the ledger, annotation
//! blocks attach to the declaration (or namespace) that precedes them.
//! After the pass the registry is frozen; resolution and arity validation
//! run against that snapshot.
//!
//! Failures never abort the course. A declaration whose annotation broke
//! falls back to the default record, the failure lands in the report, and
//! every other exercise still resolves.

use std::collections::BTreeMap;

use coursekit_kernel::{
    AnnotationRecord, BaseSelector, BinderGroup, CATEGORIES, Category, CourseError, CourseReport,
    DeclKind, Issue, QualifiedName, Registry, ResolvedToolset, ResolverOptions, ScopeStack,
    Vocabulary, resolve_toolset, validate_expected_arity,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::annotation::parse_annotation;
use crate::scan::scan_block;

/// Opening marker of an annotation block. Everything until a line ending
/// with [`BLOCK_CLOSE`] belongs to the block.
pub const BLOCK_OPEN: &str = "/- coursekit";
pub const BLOCK_CLOSE: &str = "-/";

/// One entry of the course outline: a namespace and its display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub namespace: String,
    pub title: String,
}

/// The validated configuration handed to the proof engine for one
/// exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConfig {
    pub name: String,
    pub registry_index: usize,
    pub pretty_name: String,
    pub description: Option<String>,
    pub toolset: ResolvedToolset,
}

/// A fully parsed and resolved course.
#[derive(Debug, Clone)]
pub struct Course {
    pub outline: Vec<OutlineEntry>,
    pub registry: Registry,
    pub exercises: Vec<ExerciseConfig>,
    pub report: CourseReport,
}

/// Parse and resolve with the built-in vocabulary and default options.
pub fn parse_course(text: &str) -> Course {
    parse_course_with(text, &Vocabulary::default(), ResolverOptions::default())
}

pub fn parse_course_with(
    text: &str,
    vocabulary: &Vocabulary,
    options: ResolverOptions,
) -> Course {
    let mut pass = Pass::default();
    for (index, raw) in text.lines().enumerate() {
        pass.line(index + 1, raw);
    }
    pass.finish();
    resolve_course(pass, vocabulary, options)
}

#[derive(Debug)]
struct OpenBlock {
    opened_at: usize,
    lines: Vec<(usize, String)>,
}

#[derive(Debug)]
struct PendingStatement {
    kind: DeclKind,
    local_name: String,
    header_rest: String,
    line: usize,
}

/// What the next annotation block attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    None,
    Namespace(Vec<String>),
    Declaration(usize),
    /// A declaration that failed to register; its blocks are parsed for
    /// their own diagnostics but not attached.
    Skipped,
}

#[derive(Debug)]
struct Pass {
    scope: ScopeStack,
    registry: Registry,
    annotations: Vec<Option<AnnotationRecord>>,
    decl_lines: Vec<usize>,
    outline: Vec<OutlineEntry>,
    issues: Vec<Issue>,
    anchor: Anchor,
    block: Option<OpenBlock>,
    statement: Option<PendingStatement>,
}

impl Default for Pass {
    fn default() -> Self {
        Self {
            scope: ScopeStack::new(),
            registry: Registry::new(),
            annotations: Vec::new(),
            decl_lines: Vec::new(),
            outline: Vec::new(),
            issues: Vec::new(),
            anchor: Anchor::None,
            block: None,
            statement: None,
        }
    }
}

impl Pass {
    fn line(&mut self, line_no: usize, raw: &str) {
        let trimmed = raw.trim();

        if self.block.is_some() {
            if trimmed.ends_with(BLOCK_CLOSE) {
                let rest = trimmed[..trimmed.len() - BLOCK_CLOSE.len()].trim_end();
                if !rest.is_empty() {
                    if let Some(block) = self.block.as_mut() {
                        block.lines.push((line_no, rest.to_string()));
                    }
                }
                let block = self.block.take().expect("block is open");
                self.close_block(block);
            } else if let Some(block) = self.block.as_mut() {
                block.lines.push((line_no, raw.to_string()));
            }
            return;
        }

        if trimmed.starts_with(BLOCK_OPEN) {
            self.finish_statement_if_pending(line_no);
            self.block = Some(OpenBlock {
                opened_at: line_no,
                lines: Vec::new(),
            });
            return;
        }

        if self.statement.is_some() {
            let statement = self.statement.as_mut().expect("statement is pending");
            statement.header_rest.push(' ');
            statement.header_rest.push_str(trimmed);
            if trimmed.ends_with(":=") {
                self.register_statement();
            }
            return;
        }

        let mut words = trimmed.split_whitespace();
        match words.next() {
            Some("namespace") => {
                if let Some(segment) = words.next() {
                    self.scope.enter(segment);
                    let namespace = self.scope.namespace_path().join(".");
                    debug!(%namespace, line = line_no, "entering namespace");
                    if !self.outline.iter().any(|entry| entry.namespace == namespace) {
                        self.outline.push(OutlineEntry {
                            title: derived_title(segment),
                            namespace,
                        });
                    }
                    self.anchor = Anchor::Namespace(self.scope.namespace_path());
                }
            }
            Some("open") => {
                if let Some(path) = words.next() {
                    self.scope.open(path);
                }
            }
            Some("end") => {
                if let Some(segment) = words.next() {
                    if !self.scope.leave(segment) {
                        warn!(segment, line = line_no, "unbalanced namespace end");
                        self.issues.push(Issue::new(
                            &CourseError::UnbalancedNamespace {
                                name: segment.to_string(),
                            },
                            None,
                            Some(line_no),
                        ));
                    }
                    self.anchor = Anchor::None;
                }
            }
            Some(keyword) => {
                if let Some(kind) = DeclKind::from_keyword(keyword) {
                    let Some(local_name) = words.next() else {
                        return;
                    };
                    let header_rest: String =
                        words.collect::<Vec<_>>().join(" ");
                    self.statement = Some(PendingStatement {
                        kind,
                        local_name: local_name.to_string(),
                        header_rest,
                        line: line_no,
                    });
                    if trimmed.ends_with(":=") {
                        self.register_statement();
                    }
                }
                // Anything else is mathematical content for the external
                // engine; not ours to parse.
            }
            None => {}
        }
    }

    fn finish(&mut self) {
        if let Some(block) = self.block.take() {
            self.issues.push(Issue::new(
                &CourseError::UnclosedBlock {
                    opened_at: block.opened_at,
                },
                None,
                Some(block.opened_at),
            ));
            // Best effort: still scan what was collected.
            self.close_block(block);
        }
        if self.statement.is_some() {
            let line = self.statement.as_ref().map(|s| s.line).unwrap_or_default();
            self.finish_statement_if_pending(line);
        }
    }

    fn finish_statement_if_pending(&mut self, line_no: usize) {
        if self.statement.is_some() {
            warn!(
                line = line_no,
                "statement terminator `:=` not found; registering as-is"
            );
            self.register_statement();
        }
    }

    fn register_statement(&mut self) {
        let Some(statement) = self.statement.take() else {
            return;
        };
        let signature = parse_signature(&statement.header_rest);
        let qualified_name =
            QualifiedName::new(&self.scope.namespace_path(), &statement.local_name);
        let dotted = qualified_name.dotted();
        match self.registry.register(
            statement.kind,
            qualified_name,
            signature,
            self.scope.snapshot(),
        ) {
            Ok(declaration) => {
                debug!(
                    name = %dotted,
                    index = declaration.registry_index,
                    kind = %declaration.kind,
                    "registered declaration"
                );
                self.anchor = Anchor::Declaration(declaration.registry_index);
                self.annotations.push(None);
                self.decl_lines.push(statement.line);
            }
            Err(error) => {
                warn!(name = %dotted, "registration failed: {error}");
                self.issues
                    .push(Issue::new(&error, Some(dotted), Some(statement.line)));
                self.anchor = Anchor::Skipped;
            }
        }
    }

    fn close_block(&mut self, block: OpenBlock) {
        let declaration_name = match &self.anchor {
            Anchor::Declaration(index) => {
                self.registry.get(*index).map(|d| d.qualified_name.dotted())
            }
            _ => None,
        };
        let (tokens, scan_issues) = scan_block(&block.lines);
        for (line, error) in scan_issues {
            self.issues
                .push(Issue::new(&error, declaration_name.clone(), Some(line)));
        }
        let (parsed, parse_issues) = parse_annotation(&tokens);
        for (line, error) in parse_issues {
            self.issues
                .push(Issue::new(&error, declaration_name.clone(), Some(line)));
        }

        if let Some(ref title) = parsed.section_title {
            let namespace = self.scope.namespace_path().join(".");
            if let Some(entry) = self
                .outline
                .iter_mut()
                .find(|entry| entry.namespace == namespace)
            {
                entry.title = title.clone();
            }
        }

        if !parsed.has_declaration_fields() {
            return;
        }
        match &self.anchor {
            Anchor::Declaration(index) => {
                if self.annotations[*index].is_some() {
                    warn!(
                        line = block.opened_at,
                        "annotation block replaces an earlier one"
                    );
                    self.issues.push(Issue::new(
                        &CourseError::DuplicateAnnotation {
                            name: declaration_name.clone().unwrap_or_default(),
                        },
                        declaration_name.clone(),
                        Some(block.opened_at),
                    ));
                }
                self.annotations[*index] = Some(parsed.record);
            }
            Anchor::Skipped => {
                // Already reported as a duplicate; drop quietly.
            }
            Anchor::None | Anchor::Namespace(_) => {
                warn!(line = block.opened_at, "annotation attaches to no declaration");
                self.issues.push(Issue::new(
                    &CourseError::OrphanAnnotation,
                    None,
                    Some(block.opened_at),
                ));
            }
        }
    }
}

/// Resolve every exercise against the frozen registry and assemble the
/// course.
fn resolve_course(pass: Pass, vocabulary: &Vocabulary, options: ResolverOptions) -> Course {
    let Pass {
        registry,
        annotations,
        decl_lines,
        outline,
        mut issues,
        ..
    } = pass;

    // Namespace-level defaults: the most recent explicit base selector
    // per (namespace path, category), filled in source order.
    let mut defaults: BTreeMap<(Vec<String>, Category), BaseSelector> = BTreeMap::new();
    let mut exercises = Vec::new();

    for index in 0..registry.len() {
        let declaration = registry.get(index).expect("index in range").clone();
        let record = annotations[index].clone().unwrap_or_default();
        let dotted = declaration.qualified_name.dotted();
        let line = decl_lines.get(index).copied();

        for error in validate_expected_arity(&declaration, &record.expected_arity) {
            issues.push(Issue::new(&error, Some(dotted.clone()), line));
        }

        if declaration.kind != DeclKind::Exercise {
            continue;
        }

        let namespace: Vec<String> = declaration.qualified_name.namespace().to_vec();
        let inherited = inherited_defaults(&defaults, &namespace);
        let (toolset, mut resolve_issues) = resolve_toolset(
            &registry,
            vocabulary,
            &declaration,
            &record,
            &inherited,
            options,
        );
        issues.append(&mut resolve_issues);

        for category in CATEGORIES {
            if let Some(selector) = record.base_selector(category) {
                defaults.insert((namespace.clone(), category), selector);
            }
        }

        exercises.push(ExerciseConfig {
            pretty_name: record
                .pretty_name
                .clone()
                .unwrap_or_else(|| derived_title(declaration.qualified_name.local_name())),
            description: record.description.clone(),
            name: dotted,
            registry_index: index,
            toolset,
        });
    }

    Course {
        outline,
        registry,
        exercises,
        report: CourseReport::from_issues(issues),
    }
}

/// Innermost-first walk over enclosing namespace paths.
fn inherited_defaults(
    defaults: &BTreeMap<(Vec<String>, Category), BaseSelector>,
    namespace: &[String],
) -> BTreeMap<Category, BaseSelector> {
    let mut inherited = BTreeMap::new();
    for category in CATEGORIES {
        for depth in (0..=namespace.len()).rev() {
            let key = (namespace[..depth].to_vec(), category);
            if let Some(&selector) = defaults.get(&key) {
                inherited.insert(category, selector);
                break;
            }
        }
    }
    inherited
}

/// Display title derived from a source name: underscores become spaces,
/// first letter upper-cased.
fn derived_title(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Bound-variable groups from a declaration header: every top-level
/// parenthesized group before the statement colon, `(names : tag)` with
/// arity = number of names.
fn parse_signature(header: &str) -> Vec<BinderGroup> {
    let mut groups = Vec::new();
    let mut depth: u32 = 0;
    let mut current = String::new();
    for ch in header.chars() {
        match ch {
            '(' => {
                if depth == 0 {
                    current.clear();
                } else {
                    current.push(ch);
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    continue;
                }
                depth -= 1;
                if depth == 0 {
                    if let Some(group) = parse_group(&current) {
                        groups.push(group);
                    }
                } else {
                    current.push(ch);
                }
            }
            ':' if depth == 0 => break,
            _ => {
                if depth > 0 {
                    current.push(ch);
                }
            }
        }
    }
    groups
}

fn parse_group(text: &str) -> Option<BinderGroup> {
    let (names, tag) = text.rsplit_once(':')?;
    let arity = names.split_whitespace().count() as u32;
    let type_tag = tag.trim().to_string();
    (arity > 0 && !type_tag.is_empty()).then_some(BinderGroup { type_tag, arity })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_groups_before_statement_colon() {
        let groups = parse_signature("(X : Type) (A B : set X) : A ∪ B = B ∪ A :=");
        assert_eq!(
            groups,
            vec![
                BinderGroup {
                    type_tag: "Type".to_string(),
                    arity: 1
                },
                BinderGroup {
                    type_tag: "set X".to_string(),
                    arity: 2
                },
            ]
        );
    }

    #[test]
    fn nested_parens_stay_inside_their_group() {
        let groups = parse_signature("(f : X → (set Y)) : injective f :=");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].type_tag, "X → (set Y)");
        assert_eq!(groups[0].arity, 1);
    }

    #[test]
    fn groups_after_the_statement_colon_are_ignored() {
        let groups = parse_signature(": forall (x : X), x = x :=");
        assert!(groups.is_empty());
    }

    #[test]
    fn derived_titles_read_like_prose() {
        assert_eq!(derived_title("unions_and_intersections"), "Unions and intersections");
        assert_eq!(derived_title("union_comm"), "Union comm");
    }
}
