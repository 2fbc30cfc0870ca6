//! Declarations: the named units of course content.
//!
//! A declaration is one definition, theorem, or exercise. Declarations are
//! created by the registry at first sight, in source order, and are
//! immutable afterwards. The `registry_index` is the position in that
//! total order and is unique within one course.

use serde::{Deserialize, Serialize};

/// What kind of content a declaration carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Definition,
    Theorem,
    Exercise,
}

impl DeclKind {
    /// The declaration keyword as written in course source.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Theorem => "theorem",
            Self::Exercise => "exercise",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "definition" => Some(Self::Definition),
            "theorem" => Some(Self::Theorem),
            "exercise" => Some(Self::Exercise),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A dotted name: namespace segments followed by the local name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    pub segments: Vec<String>,
}

impl QualifiedName {
    /// Build a qualified name from an enclosing namespace path and a local
    /// name. The local name itself may be dotted.
    pub fn new(namespace: &[String], local: &str) -> Self {
        let mut segments: Vec<String> = namespace.to_vec();
        segments.extend(local.split('.').map(str::to_string));
        Self { segments }
    }

    pub fn from_dotted(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    /// The last segment.
    pub fn local_name(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// The namespace path, without the local name.
    pub fn namespace(&self) -> &[String] {
        match self.segments.len() {
            0 => &[],
            n => &self.segments[..n - 1],
        }
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// One bound-variable group from a statement header, e.g. `(A B : set X)`
/// contributes `{ type_tag: "set X", arity: 2 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinderGroup {
    pub type_tag: String,
    pub arity: u32,
}

/// One registered unit of course content.
///
/// Owned exclusively by the [`Registry`](crate::Registry); never mutated
/// after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub kind: DeclKind,
    pub qualified_name: QualifiedName,
    pub registry_index: usize,
    pub statement_signature: Vec<BinderGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_parts() {
        let name = QualifiedName::new(&["sets".to_string(), "unions".to_string()], "union_comm");
        assert_eq!(name.dotted(), "sets.unions.union_comm");
        assert_eq!(name.local_name(), "union_comm");
        assert_eq!(name.namespace(), &["sets".to_string(), "unions".to_string()]);
    }

    #[test]
    fn dotted_local_name_extends_namespace() {
        let name = QualifiedName::new(&["sets".to_string()], "inter.comm");
        assert_eq!(name.dotted(), "sets.inter.comm");
        assert_eq!(name.local_name(), "comm");
    }

    #[test]
    fn root_name_has_empty_namespace() {
        let name = QualifiedName::from_dotted("double_inclusion");
        assert!(name.namespace().is_empty());
        assert_eq!(name.local_name(), "double_inclusion");
    }
}
