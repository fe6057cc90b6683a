//! Data model for GROT rotation files.
//!
//! This module contains all data structures for representing a parsed
//! rotation file:
//! - Attribute metadata (`@Key"Value"` pairs)
//! - The document header and its derived projections
//! - Moving plate rotation sequences and their rotation records
//! - Validation diagnostics
//!
//! The model is immutable after parsing: the parser builds it in one pass
//! and the validator and formatter only read from it.

use std::fmt;

use thiserror::Error;

/// Header keys with this prefix are collected into the contributor list.
pub const CONTRIBUTOR_PREFIX: &str = "DC:contributor";

/// Header keys with exactly this name are collected into the time-scale list.
pub const TIME_SCALE_KEY: &str = "GEOTIMESCALE";

/// Insertion-ordered `@Key"Value"` metadata attached to a line or sequence.
///
/// Keys keep their first-seen position; writing an existing key again
/// replaces its value in place. Duplicate keys are an overwrite, never an
/// error (duplicate *semantics* are a validation concern).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: Vec<(String, String)>,
}

impl AttributeSet {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites an attribute, preserving first-seen order.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Looks up an attribute value by exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Merges another set into this one, entry by entry in its order.
    pub fn merge(&mut self, other: &AttributeSet) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no attributes are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Document-level metadata collected from the preamble, before the first
/// sequence marker line.
#[derive(Debug, Clone, Default)]
pub struct HeaderSet {
    /// All header attributes, one canonical value per key.
    pub attrs: AttributeSet,
    /// Values of every `DC:contributor*` key, in file order.
    pub contributors: Vec<String>,
    /// Values of every `GEOTIMESCALE` key, in file order.
    pub time_scales: Vec<String>,
}

impl HeaderSet {
    /// Records one header attribute and updates the derived projections.
    pub fn record(&mut self, key: &str, value: &str) {
        if key.starts_with(CONTRIBUTOR_PREFIX) {
            self.contributors.push(value.to_string());
        }
        if key == TIME_SCALE_KEY {
            self.time_scales.push(value.to_string());
        }
        self.attrs.insert(key, value);
    }
}

/// One finite-rotation record (enabled or disabled) from a data line.
#[derive(Debug, Clone)]
pub struct Rotation {
    /// 0-based index of the source line in the original text.
    pub line: usize,
    /// Moving plate identifier.
    pub plate_id: u32,
    /// Age of the rotation in million years (Ma).
    pub age: f64,
    /// Pole latitude in degrees.
    pub latitude: f64,
    /// Pole longitude in degrees.
    pub longitude: f64,
    /// Rotation angle in degrees.
    pub angle: f64,
    /// Fixed (reference) plate identifier.
    pub fixed_plate_id: u32,
    /// Inline `@Key"Value"` metadata from the same line.
    pub attrs: AttributeSet,
    /// True if the line was commented out with `#`.
    pub disabled: bool,
    /// The original line text, verbatim.
    pub raw: String,
}

/// One moving plate rotation sequence (MPRS): a marker line plus the
/// rotations that follow it, in file order.
#[derive(Debug, Clone)]
pub struct RotationSequence {
    /// Declared moving plate identifier.
    pub plate_id: u32,
    /// Short plate code (e.g. "NAM").
    pub code: String,
    /// Display name (e.g. "North America").
    pub name: String,
    /// Optional `MOVING-FIXED` plate pair from a `@PP` attribute.
    pub plate_pair: Option<String>,
    /// Attributes merged from the marker line and its continuation lines.
    pub attrs: AttributeSet,
    /// 0-based index of the first marker line.
    pub line: usize,
    /// All rotations in file order, enabled and disabled interleaved.
    pub rotations: Vec<Rotation>,
}

impl RotationSequence {
    /// Iterates only the enabled rotations, in file order.
    pub fn enabled_rotations(&self) -> impl Iterator<Item = &Rotation> {
        self.rotations.iter().filter(|r| !r.disabled)
    }
}

/// Errors raised by lookups into a parsed document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Line index {index} out of range (document has {count} lines)")]
    LineOutOfRange { index: usize, count: usize },
}

/// The complete parse result for one rotation file.
///
/// Sequences appear in file order, and each sequence's rotations appear in
/// file order. The original source lines are kept so that diagnostics and
/// the formatter can refer back to exact line text.
#[derive(Debug, Clone)]
pub struct Document {
    /// Preamble metadata.
    pub header: HeaderSet,
    /// All rotation sequences, in file order.
    pub sequences: Vec<RotationSequence>,
    lines: Vec<String>,
}

impl Document {
    /// Creates a document from its parts. Used by the parser.
    pub(crate) fn new(
        header: HeaderSet,
        sequences: Vec<RotationSequence>,
        lines: Vec<String>,
    ) -> Self {
        Self {
            header,
            sequences,
            lines,
        }
    }

    /// Returns the number of source lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the text of a source line by 0-based index.
    ///
    /// This is the one lookup that can genuinely fail: an index outside
    /// the document is reported, not swallowed.
    pub fn line_text(&self, index: usize) -> Result<&str, DocumentError> {
        self.lines
            .get(index)
            .map(String::as_str)
            .ok_or(DocumentError::LineOutOfRange {
                index,
                count: self.lines.len(),
            })
    }

    /// Iterates all source lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns the total number of rotation records across all sequences.
    pub fn rotation_count(&self) -> usize {
        self.sequences.iter().map(|s| s.rotations.len()).sum()
    }

    /// Finds a sequence by its declared moving plate id.
    pub fn find_sequence(&self, plate_id: u32) -> Option<&RotationSequence> {
        self.sequences.iter().find(|s| s.plate_id == plate_id)
    }
}

/// Diagnostic severity, ordered by decreasing importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A source range, 0-based lines and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRange {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl LineRange {
    /// A range covering one whole line of the given character length.
    pub fn line_span(line: usize, len: usize) -> Self {
        Self {
            start_line: line,
            start_col: 0,
            end_line: line,
            end_col: len,
        }
    }

    /// The zero-width range at the very start of the document.
    pub fn document_start() -> Self {
        Self::default()
    }
}

/// A structured validation finding: severity, source anchor, message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: LineRange,
    pub message: String,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(severity: Severity, range: LineRange, message: impl Into<String>) -> Self {
        Self {
            severity,
            range,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_insertion_order() {
        let mut attrs = AttributeSet::new();
        attrs.insert("B", "1");
        attrs.insert("A", "2");
        attrs.insert("C", "3");
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_attribute_overwrite_keeps_position() {
        let mut attrs = AttributeSet::new();
        attrs.insert("REF", "old");
        attrs.insert("DOI", "x");
        attrs.insert("REF", "new");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("REF"), Some("new"));
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["REF", "DOI"]);
    }

    #[test]
    fn test_header_projections() {
        let mut header = HeaderSet::default();
        header.record("DC:title", "Test model");
        header.record("DC:contributor:name", "A. Wegener");
        header.record("GEOTIMESCALE", "GTS2020");
        header.record("DC:contributor:email", "aw@example.org");
        assert_eq!(header.attrs.len(), 4);
        assert_eq!(header.contributors, vec!["A. Wegener", "aw@example.org"]);
        assert_eq!(header.time_scales, vec!["GTS2020"]);
    }

    #[test]
    fn test_line_text_out_of_range() {
        let doc = Document::new(
            HeaderSet::default(),
            Vec::new(),
            vec!["one".to_string(), "two".to_string()],
        );
        assert_eq!(doc.line_text(1).unwrap(), "two");
        assert!(matches!(
            doc.line_text(2),
            Err(DocumentError::LineOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Hint);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
