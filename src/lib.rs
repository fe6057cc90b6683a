//! # grotlint - GROT rotation file toolkit
//!
//! A parser, validator and formatter for GPlates GROT plate-rotation
//! files.
//!
//! ## Architecture
//!
//! The crate follows a strict one-way data flow with clear separation:
//! - `model`: Data structures for the document, sequences, rotations
//!   and diagnostics
//! - `attr`: `@Key"Value"` attribute extraction, per line
//! - `parser`: Line classification and the single-pass document parser
//! - `validate`: Independent, toggleable check passes producing
//!   diagnostics
//! - `format`: Column alignment for data lines
//!
//! Raw text goes through the parser into an immutable [`model::Document`];
//! the validator and formatter only read from it. Parsing is permissive
//! and total: unrecognized lines are skipped, never rejected, and every
//! "error-like" finding surfaces as a [`model::Diagnostic`] instead of a
//! failure. Documents are small, so every edit is a full re-parse; there
//! is no incremental state to keep consistent and no locking needed
//! between independent parses.

pub mod attr;
pub mod format;
pub mod model;
pub mod parser;
pub mod validate;
