// ABOUTME: Declarative metadata extraction driven by per-portal templates.
// ABOUTME: Includes the rule types, the field evaluator and the template engine.

//! Metadata extraction module.
//!
//! Submodules:
//! - `rules`: serde types describing templates and field rules.
//! - `fields`: evaluation of a field rule against a page.
//! - `metadata`: template selection and record assembly.

pub mod fields;
pub mod metadata;
pub mod rules;
