//! Toolset resolution: evaluate one exercise's category requests against
//! the frozen registry and the built-in vocabularies.
//!
//! Resolution is a pure function of (registry snapshot at the exercise's
//! index, annotation record, inherited defaults). Re-running it on an
//! unchanged registry yields byte-identical output: every container in the
//! result is ordered.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::declaration::Declaration;
use crate::error::{CourseError, Issue};
use crate::record::{AnnotationRecord, BaseSelector, RequestToken};
use crate::registry::Registry;
use crate::vocabulary::{CATEGORIES, Category, Vocabulary};

/// Final per-category permitted-name sets for one exercise.
///
/// Categories are independent partitions of the permission space; no
/// union across categories is ever computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedToolset {
    pub categories: BTreeMap<Category, BTreeSet<String>>,
}

impl ResolvedToolset {
    pub fn permitted(&self, category: Category) -> Option<&BTreeSet<String>> {
        self.categories.get(&category)
    }
}

/// Tunable resolution policy.
#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    /// When true, an exercise without an explicit base selector inherits
    /// the nearest enclosing namespace default before falling back to the
    /// full vocabulary.
    pub inheritance: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { inheritance: true }
    }
}

/// Base selectors inherited from enclosing defaults, one per category.
pub type InheritedDefaults = BTreeMap<Category, BaseSelector>;

/// The full vocabulary of a category at one registry index: the closed
/// built-in set, or every matching declaration registered before the
/// index, regardless of scope. This is the set `$ALL` selects.
pub fn category_universe(
    registry: &Registry,
    vocabulary: &Vocabulary,
    category: Category,
    index: usize,
) -> BTreeSet<String> {
    match vocabulary.builtin_tokens(category) {
        Some(tokens) => tokens.clone(),
        None => registry
            .registered_as_of(index, category)
            .iter()
            .map(|decl| decl.qualified_name.dotted())
            .collect(),
    }
}

/// Resolve every category of one exercise.
///
/// Never fails as a whole: unknown include identifiers are collected as
/// issues and skipped, so the rest of the toolset still resolves.
pub fn resolve_toolset(
    registry: &Registry,
    vocabulary: &Vocabulary,
    exercise: &Declaration,
    record: &AnnotationRecord,
    inherited: &InheritedDefaults,
    options: ResolverOptions,
) -> (ResolvedToolset, Vec<Issue>) {
    let mut toolset = ResolvedToolset::default();
    let mut issues = Vec::new();
    for category in CATEGORIES {
        let permitted = resolve_category(
            registry,
            vocabulary,
            exercise,
            record,
            inherited,
            options,
            category,
            &mut issues,
        );
        toolset.categories.insert(category, permitted);
    }
    (toolset, issues)
}

#[allow(clippy::too_many_arguments)]
fn resolve_category(
    registry: &Registry,
    vocabulary: &Vocabulary,
    exercise: &Declaration,
    record: &AnnotationRecord,
    inherited: &InheritedDefaults,
    options: ResolverOptions,
    category: Category,
    issues: &mut Vec<Issue>,
) -> BTreeSet<String> {
    let index = exercise.registry_index;
    let requests = record.category_requests.get(&category);

    let base_selector = requests
        .and_then(|_| record.base_selector(category))
        .or_else(|| {
            if options.inheritance {
                inherited.get(&category).copied()
            } else {
                None
            }
        });

    // Absent selector and no enclosing default: unrestricted. Hiding tools
    // the author forgot to list would be a silent course bug.
    let mut permitted = match base_selector {
        Some(BaseSelector::Wildcard) | None => {
            category_universe(registry, vocabulary, category, index)
        }
        Some(BaseSelector::UpToHere) => match vocabulary.builtin_tokens(category) {
            // Built-in tokens have no registration order; $UNTIL_NOW
            // degenerates to the full closed set.
            Some(tokens) => tokens.clone(),
            None => registry
                .visible_as_of(index, category)
                .iter()
                .map(|decl| decl.qualified_name.dotted())
                .collect(),
        },
    };

    let Some(requests) = requests else {
        return permitted;
    };

    // Two phases, not token order: every include lands first, then every
    // exclude. An exclusion always wins over a listed include.
    let mut excludes = Vec::new();
    for token in requests {
        match token {
            RequestToken::Wildcard | RequestToken::UpToHere => {}
            RequestToken::Include(name) => match canonical_name(registry, vocabulary, category, name, index) {
                Some(canonical) => {
                    permitted.insert(canonical);
                }
                None => {
                    issues.push(Issue::new(
                        &CourseError::UnknownIdentifier {
                            name: name.clone(),
                            category,
                        },
                        Some(exercise.qualified_name.dotted()),
                        None,
                    ));
                }
            },
            RequestToken::Exclude(name) => excludes.push(name),
        }
    }
    for name in excludes {
        // Excluding an absent or unresolvable name is a no-op.
        if let Some(canonical) = canonical_name(registry, vocabulary, category, name, index) {
            permitted.remove(&canonical);
        }
        permitted.remove(name);
    }
    permitted
}

/// The canonical permitted-set spelling of a raw token: the token itself
/// for built-in categories (when it exists), the dotted qualified name for
/// dynamic ones (when it resolves).
fn canonical_name(
    registry: &Registry,
    vocabulary: &Vocabulary,
    category: Category,
    raw: &str,
    index: usize,
) -> Option<String> {
    match vocabulary.builtin_tokens(category) {
        Some(tokens) => tokens.contains(raw).then(|| raw.to_string()),
        None => registry
            .resolve_name(raw, index, category)
            .ok()
            .map(|decl| decl.qualified_name.dotted()),
    }
}
