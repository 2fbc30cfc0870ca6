//! Permission categories and their token vocabularies.
//!
//! This module is the single semantic authority for the category axis:
//! which categories exist, which section header spells each one, and what
//! the built-in (closed) token sets for the logic and proof-technique
//! categories are.
//!
//! The built-in sets can be overridden from a TOML config file; the
//! dynamic categories (definitions, theorems, statements) draw their
//! universe from the registry instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::declaration::DeclKind;

/// One axis of the permission space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Logic,
    ProofTechniques,
    Definitions,
    Theorems,
    Statements,
}

/// All categories, in header order.
pub const CATEGORIES: [Category; 5] = [
    Category::Logic,
    Category::ProofTechniques,
    Category::Definitions,
    Category::Theorems,
    Category::Statements,
];

impl Category {
    /// The section header spelling this category in annotation blocks.
    pub fn header(self) -> &'static str {
        match self {
            Self::Logic => "Tools->Logic",
            Self::ProofTechniques => "Tools->ProofTechniques",
            Self::Definitions => "Tools->Definitions",
            Self::Theorems => "Tools->Theorems",
            Self::Statements => "Tools->Statements",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        CATEGORIES.iter().copied().find(|c| c.header() == header)
    }

    /// Whether this category has a closed, built-in token set.
    pub fn is_builtin(self) -> bool {
        matches!(self, Self::Logic | Self::ProofTechniques)
    }

    /// Whether a declaration of `kind` belongs to this category's
    /// dynamic universe. Always false for built-in categories.
    pub fn admits_kind(self, kind: DeclKind) -> bool {
        match self {
            Self::Definitions => kind == DeclKind::Definition,
            Self::Theorems => kind == DeclKind::Theorem,
            Self::Statements => true,
            Self::Logic | Self::ProofTechniques => false,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Built-in token sets for the closed categories.
pub mod builtin {
    pub const LOGIC: &[&str] = &[
        "and", "or", "not", "implies", "iff", "forall", "exists", "equal", "map",
    ];
    pub const PROOF_TECHNIQUES: &[&str] = &[
        "cases",
        "contrapose",
        "contradiction",
        "choice",
        "new_object",
        "apply",
        "assumption",
    ];
}

/// The closed token sets for `Logic` and `ProofTechniques`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    pub logic: BTreeSet<String>,
    pub proof_techniques: BTreeSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            logic: builtin::LOGIC.iter().map(|s| s.to_string()).collect(),
            proof_techniques: builtin::PROOF_TECHNIQUES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    vocabulary: VocabularySection,
}

#[derive(Debug, Deserialize)]
struct VocabularySection {
    logic: Option<Vec<String>>,
    proof_techniques: Option<Vec<String>>,
}

impl Vocabulary {
    /// Load overrides from a TOML document:
    ///
    /// ```toml
    /// [vocabulary]
    /// logic = ["and", "or", "not"]
    /// proof_techniques = ["contradiction"]
    /// ```
    ///
    /// Omitted keys keep their built-in set.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let file: VocabularyFile = toml::from_str(text)?;
        let mut vocabulary = Self::default();
        if let Some(logic) = file.vocabulary.logic {
            vocabulary.logic = logic.into_iter().collect();
        }
        if let Some(techniques) = file.vocabulary.proof_techniques {
            vocabulary.proof_techniques = techniques.into_iter().collect();
        }
        Ok(vocabulary)
    }

    /// The closed set for a built-in category; None for dynamic ones.
    pub fn builtin_tokens(&self, category: Category) -> Option<&BTreeSet<String>> {
        match category {
            Category::Logic => Some(&self.logic),
            Category::ProofTechniques => Some(&self.proof_techniques),
            _ => None,
        }
    }
}
