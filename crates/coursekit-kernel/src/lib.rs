//! # Coursekit Kernel
//!
//! Registry and resolution semantics for proof-course metadata: which
//! logical connectives, proof techniques, prior definitions, and prior
//! theorems a student exercise may use.
//!
//! This crate is **format-agnostic**: it never reads course files. It only
//! prescribes how declarations are registered (append-only, in source
//! order, scoped by namespace) and how each exercise's permission requests
//! evaluate against that ledger.
//!
//! ## Architecture
//!
//! ```text
//! ScopeStack / ScopeSnapshot   ← namespace nesting and `open` visibility
//!     │
//! Registry                     ← append-only, position-indexed ledger
//!     │
//! Vocabulary                   ← closed built-in sets per category
//!     │
//! AnnotationRecord             ← parsed per-declaration requests
//!     │
//! resolve_toolset              ← base selector → includes → excludes
//!     │
//! validate_expected_arity      ← metadata vs. statement signature
//! ```

pub mod arity;
pub mod declaration;
pub mod error;
pub mod record;
pub mod registry;
pub mod resolve;
pub mod scope;
pub mod vocabulary;

pub use arity::validate_expected_arity;
pub use declaration::{BinderGroup, DeclKind, Declaration, QualifiedName};
pub use error::{CourseError, CourseReport, Issue};
pub use record::{AnnotationRecord, BaseSelector, RequestToken};
pub use registry::Registry;
pub use resolve::{
    InheritedDefaults, ResolvedToolset, ResolverOptions, category_universe, resolve_toolset,
};
pub use scope::{ScopeSnapshot, ScopeStack};
pub use vocabulary::{CATEGORIES, Category, Vocabulary};
