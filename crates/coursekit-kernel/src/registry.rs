//! The declaration registry: an append-only, position-indexed ledger.
//!
//! One registry per course. The single parsing pass owns and mutates it in
//! source order; afterwards it is read-only for every resolver and
//! validator call. Entries are never deleted or reordered, so a registry
//! index is a stable total order over the whole course.

use std::collections::HashMap;

use crate::declaration::{BinderGroup, DeclKind, Declaration, QualifiedName};
use crate::error::CourseError;
use crate::scope::ScopeSnapshot;
use crate::vocabulary::Category;

#[derive(Debug, Clone)]
struct Entry {
    declaration: Declaration,
    scope: ScopeSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Entry>,
    by_dotted_name: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Declaration> {
        self.entries.get(index).map(|entry| &entry.declaration)
    }

    pub fn scope_at(&self, index: usize) -> Option<&ScopeSnapshot> {
        self.entries.get(index).map(|entry| &entry.scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.iter().map(|entry| &entry.declaration)
    }

    /// Append a declaration at the next registry index.
    ///
    /// Fails with `DuplicateName` when the local name already resolves to
    /// a visible declaration from the registration scope: a duplicate in
    /// the same namespace or a collision with an enclosing-visible name.
    pub fn register(
        &mut self,
        kind: DeclKind,
        qualified_name: QualifiedName,
        statement_signature: Vec<BinderGroup>,
        scope: ScopeSnapshot,
    ) -> Result<&Declaration, CourseError> {
        let local = qualified_name.local_name().to_string();
        if self.lookup(&local, &scope, self.entries.len()).is_some() {
            return Err(CourseError::DuplicateName {
                name: qualified_name.dotted(),
            });
        }
        let registry_index = self.entries.len();
        let dotted = qualified_name.dotted();
        let declaration = Declaration {
            kind,
            qualified_name,
            registry_index,
            statement_signature,
        };
        self.entries.push(Entry { declaration, scope });
        self.by_dotted_name.insert(dotted, registry_index);
        Ok(&self.entries[registry_index].declaration)
    }

    /// Every declaration admitted by `category`, registered before
    /// `index`, and reachable from the scope active at `index`, in
    /// registration order.
    pub fn visible_as_of(&self, index: usize, category: Category) -> Vec<&Declaration> {
        let Some(scope) = self.scope_at(index) else {
            return Vec::new();
        };
        self.entries[..index.min(self.entries.len())]
            .iter()
            .map(|entry| &entry.declaration)
            .filter(|decl| category.admits_kind(decl.kind))
            .filter(|decl| scope.can_see(decl.qualified_name.namespace()))
            .collect()
    }

    /// Every declaration admitted by `category` and registered before
    /// `index`, regardless of scope: the dynamic category vocabulary.
    pub fn registered_as_of(&self, index: usize, category: Category) -> Vec<&Declaration> {
        self.entries[..index.min(self.entries.len())]
            .iter()
            .map(|entry| &entry.declaration)
            .filter(|decl| category.admits_kind(decl.kind))
            .collect()
    }

    /// Scope-aware lookup of a raw (possibly dotted) name among
    /// declarations registered before `at_index`.
    pub fn resolve_name(
        &self,
        raw: &str,
        at_index: usize,
        category: Category,
    ) -> Result<&Declaration, CourseError> {
        let scope = self.scope_at(at_index).cloned().unwrap_or_else(|| {
            // Lookup past the last entry sees only the root namespace.
            ScopeSnapshot::root()
        });
        match self.lookup(raw, &scope, at_index) {
            Some(decl) if category.admits_kind(decl.kind) => Ok(decl),
            _ => Err(CourseError::UnknownIdentifier {
                name: raw.to_string(),
                category,
            }),
        }
    }

    fn lookup(&self, raw: &str, scope: &ScopeSnapshot, before: usize) -> Option<&Declaration> {
        for candidate in scope.lookup_candidates(raw) {
            let dotted = candidate.join(".");
            if let Some(&index) = self.by_dotted_name.get(&dotted)
                && index < before
            {
                return Some(&self.entries[index].declaration);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeStack;

    fn register(
        registry: &mut Registry,
        kind: DeclKind,
        scope: &ScopeStack,
        local: &str,
    ) -> Result<usize, CourseError> {
        let name = QualifiedName::new(&scope.namespace_path(), local);
        registry
            .register(kind, name, Vec::new(), scope.snapshot())
            .map(|decl| decl.registry_index)
    }

    #[test]
    fn indices_are_assigned_in_order() {
        let mut registry = Registry::new();
        let scope = ScopeStack::new();
        assert_eq!(
            register(&mut registry, DeclKind::Definition, &scope, "a").unwrap(),
            0
        );
        assert_eq!(
            register(&mut registry, DeclKind::Theorem, &scope, "b").unwrap(),
            1
        );
    }

    #[test]
    fn duplicate_in_same_scope_is_rejected() {
        let mut registry = Registry::new();
        let scope = ScopeStack::new();
        register(&mut registry, DeclKind::Definition, &scope, "a").unwrap();
        let err = register(&mut registry, DeclKind::Theorem, &scope, "a").unwrap_err();
        assert_eq!(
            err,
            CourseError::DuplicateName {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn duplicate_against_enclosing_visible_scope_is_rejected() {
        let mut registry = Registry::new();
        let mut scope = ScopeStack::new();
        register(&mut registry, DeclKind::Definition, &scope, "comm").unwrap();
        scope.enter("sets");
        let err = register(&mut registry, DeclKind::Definition, &scope, "comm").unwrap_err();
        assert_eq!(
            err,
            CourseError::DuplicateName {
                name: "sets.comm".to_string()
            }
        );
    }

    #[test]
    fn same_local_name_in_sibling_namespaces_is_fine() {
        let mut registry = Registry::new();
        let mut scope = ScopeStack::new();
        scope.enter("sets");
        register(&mut registry, DeclKind::Definition, &scope, "comm").unwrap();
        scope.leave("sets");
        scope.enter("maps");
        register(&mut registry, DeclKind::Definition, &scope, "comm").unwrap();
    }

    #[test]
    fn visibility_is_positional_and_scoped() {
        let mut registry = Registry::new();
        let mut scope = ScopeStack::new();
        register(&mut registry, DeclKind::Definition, &scope, "union").unwrap();
        scope.enter("sets");
        register(&mut registry, DeclKind::Definition, &scope, "inter").unwrap();
        scope.leave("sets");
        scope.enter("maps");
        register(&mut registry, DeclKind::Definition, &scope, "image").unwrap();
        let exercise = register(&mut registry, DeclKind::Exercise, &scope, "ex").unwrap();

        let names: Vec<String> = registry
            .visible_as_of(exercise, Category::Definitions)
            .iter()
            .map(|d| d.qualified_name.dotted())
            .collect();
        // sets.inter is not reachable from maps.
        assert_eq!(names, vec!["union", "maps.image"]);
    }

    #[test]
    fn resolve_name_prefers_innermost_and_respects_position() {
        let mut registry = Registry::new();
        let mut scope = ScopeStack::new();
        register(&mut registry, DeclKind::Definition, &scope, "union").unwrap();
        scope.enter("sets");
        let inner = register(&mut registry, DeclKind::Definition, &scope, "inter").unwrap();
        let at = register(&mut registry, DeclKind::Exercise, &scope, "ex").unwrap();

        let found = registry
            .resolve_name("inter", at, Category::Definitions)
            .unwrap();
        assert_eq!(found.registry_index, inner);

        // Not yet registered at `inner`'s own position.
        assert!(
            registry
                .resolve_name("inter", inner, Category::Definitions)
                .is_err()
        );
        // Wrong category.
        assert!(registry.resolve_name("union", at, Category::Theorems).is_err());
    }
}
