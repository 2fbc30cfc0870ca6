//! Resolution invariants checked over a shared registry layout:
//! no forward leakage, `$UNTIL_NOW` monotonicity, exclusion idempotence
//! and order-independence, and byte-level determinism.

use std::collections::BTreeSet;

use coursekit_kernel::{
    AnnotationRecord, CATEGORIES, Category, DeclKind, InheritedDefaults, QualifiedName, Registry,
    RequestToken, ResolverOptions, ScopeStack, Vocabulary, category_universe, resolve_toolset,
};

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Root-level course: definitions, theorems, and two exercises with
/// declarations interleaved between them.
fn sample_registry() -> Registry {
    let mut registry = Registry::new();
    let scope = ScopeStack::new();
    let rows = [
        (DeclKind::Definition, "union"),
        (DeclKind::Definition, "inter"),
        (DeclKind::Theorem, "double_inclusion"),
        (DeclKind::Exercise, "ex_union_comm"),
        (DeclKind::Definition, "complement"),
        (DeclKind::Theorem, "ssi"),
        (DeclKind::Exercise, "ex_inter_comm"),
    ];
    for (kind, name) in rows {
        registry
            .register(
                kind,
                QualifiedName::from_dotted(name),
                Vec::new(),
                scope.snapshot(),
            )
            .unwrap();
    }
    registry
}

fn resolve(
    registry: &Registry,
    index: usize,
    record: &AnnotationRecord,
) -> coursekit_kernel::ResolvedToolset {
    let exercise = registry.get(index).unwrap().clone();
    let (toolset, issues) = resolve_toolset(
        registry,
        &Vocabulary::default(),
        &exercise,
        record,
        &InheritedDefaults::new(),
        ResolverOptions::default(),
    );
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    toolset
}

fn until_now_record() -> AnnotationRecord {
    let mut record = AnnotationRecord::default();
    for category in CATEGORIES {
        record
            .category_requests
            .insert(category, vec![RequestToken::UpToHere]);
    }
    record
}

#[test]
fn no_name_outside_the_vocabulary_at_its_index() {
    let registry = sample_registry();
    let vocabulary = Vocabulary::default();
    for index in [3, 6] {
        let toolset = resolve(&registry, index, &AnnotationRecord::default());
        for category in CATEGORIES {
            let universe = category_universe(&registry, &vocabulary, category, index);
            let permitted = toolset.permitted(category).unwrap();
            assert!(
                permitted.is_subset(&universe),
                "{category}: {permitted:?} leaks outside {universe:?}"
            );
        }
    }
}

#[test]
fn until_now_is_monotonic_in_registry_index() {
    let registry = sample_registry();
    let record = until_now_record();
    let earlier = resolve(&registry, 3, &record);
    let later = resolve(&registry, 6, &record);
    for category in CATEGORIES {
        let a = earlier.permitted(category).unwrap();
        let b = later.permitted(category).unwrap();
        assert!(a.is_subset(b), "{category}: {a:?} not a subset of {b:?}");
    }
}

#[test]
fn exclusion_is_idempotent() {
    let registry = sample_registry();
    let mut once = AnnotationRecord::default();
    once.category_requests.insert(
        Category::Definitions,
        vec![
            RequestToken::UpToHere,
            RequestToken::Exclude("union".to_string()),
        ],
    );
    let mut twice = AnnotationRecord::default();
    twice.category_requests.insert(
        Category::Definitions,
        vec![
            RequestToken::UpToHere,
            RequestToken::Exclude("union".to_string()),
            RequestToken::Exclude("union".to_string()),
        ],
    );
    assert_eq!(resolve(&registry, 6, &once), resolve(&registry, 6, &twice));
}

#[test]
fn excluding_an_absent_name_is_a_no_op() {
    let registry = sample_registry();
    let mut plain = AnnotationRecord::default();
    plain
        .category_requests
        .insert(Category::Definitions, vec![RequestToken::UpToHere]);
    let mut noisy = AnnotationRecord::default();
    noisy.category_requests.insert(
        Category::Definitions,
        vec![
            RequestToken::UpToHere,
            // Registered, but a theorem: never in the definitions set.
            RequestToken::Exclude("double_inclusion".to_string()),
            // Registered nowhere at all.
            RequestToken::Exclude("no_such_definition".to_string()),
        ],
    );
    // `resolve` asserts no issues were emitted for either record.
    let expected = resolve(&registry, 6, &plain);
    assert_eq!(resolve(&registry, 6, &noisy), expected);
    assert_eq!(
        expected.permitted(Category::Definitions),
        Some(&set(&["union", "inter", "complement"]))
    );
}

#[test]
fn exclusion_order_does_not_matter() {
    let registry = sample_registry();
    let mut forward = AnnotationRecord::default();
    forward.category_requests.insert(
        Category::Definitions,
        vec![
            RequestToken::UpToHere,
            RequestToken::Exclude("union".to_string()),
            RequestToken::Exclude("inter".to_string()),
        ],
    );
    let mut backward = AnnotationRecord::default();
    backward.category_requests.insert(
        Category::Definitions,
        vec![
            RequestToken::UpToHere,
            RequestToken::Exclude("inter".to_string()),
            RequestToken::Exclude("union".to_string()),
        ],
    );
    let resolved = resolve(&registry, 6, &forward);
    assert_eq!(resolved, resolve(&registry, 6, &backward));
    let expected: BTreeSet<String> = ["complement".to_string()].into();
    assert_eq!(resolved.permitted(Category::Definitions), Some(&expected));
}

#[test]
fn resolution_is_deterministic_to_the_byte() {
    let registry = sample_registry();
    let mut record = until_now_record();
    record.category_requests.insert(
        Category::Theorems,
        vec![
            RequestToken::Wildcard,
            RequestToken::Exclude("double_inclusion".to_string()),
        ],
    );
    let first = resolve(&registry, 6, &record);
    let second = resolve(&registry, 6, &record);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn scoped_until_now_excludes_sibling_namespaces() {
    let mut registry = Registry::new();
    let mut scope = ScopeStack::new();
    scope.enter("sets");
    registry
        .register(
            DeclKind::Definition,
            QualifiedName::new(&scope.namespace_path(), "union"),
            Vec::new(),
            scope.snapshot(),
        )
        .unwrap();
    scope.leave("sets");
    scope.enter("maps");
    registry
        .register(
            DeclKind::Definition,
            QualifiedName::new(&scope.namespace_path(), "image"),
            Vec::new(),
            scope.snapshot(),
        )
        .unwrap();
    let exercise_index = registry
        .register(
            DeclKind::Exercise,
            QualifiedName::new(&scope.namespace_path(), "ex"),
            Vec::new(),
            scope.snapshot(),
        )
        .unwrap()
        .registry_index;

    let mut record = AnnotationRecord::default();
    record
        .category_requests
        .insert(Category::Definitions, vec![RequestToken::UpToHere]);
    let toolset = resolve(&registry, exercise_index, &record);
    let expected: BTreeSet<String> = ["maps.image".to_string()].into();
    assert_eq!(toolset.permitted(Category::Definitions), Some(&expected));
}
