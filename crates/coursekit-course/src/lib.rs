//! # Coursekit Course
//!
//! Course-file parsing: turns one plain-text course into a frozen
//! declaration registry, a namespace outline, and one validated
//! [`ExerciseConfig`] per exercise.
//!
//! ```text
//! course text
//!     │  scan::scan_block        ← annotation block → typed tokens
//!     │  annotation::parse_annotation
//!     ▼
//! course::parse_course           ← one pass, source order
//!     │
//!     ▼
//! Course { outline, registry, exercises, report }
//! ```
//!
//! The mathematical statement bodies are passed over untouched; only the
//! binder header feeds the statement signature.

pub mod annotation;
pub mod course;
pub mod scan;

pub use annotation::{ParsedAnnotation, parse_annotation};
pub use course::{
    BLOCK_CLOSE, BLOCK_OPEN, Course, ExerciseConfig, OutlineEntry, parse_course,
    parse_course_with,
};
pub use scan::{ScanToken, SectionHeader, scan_block};
