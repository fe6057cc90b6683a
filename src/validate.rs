//! Validation passes over a parsed rotation document.
//!
//! Each check is a pure pass over the immutable [`Document`]; the engine
//! runs every enabled pass in a fixed order and concatenates their
//! diagnostics. There is no early exit and no sorting: output order is
//! pass order, then sequence order, then rotation order, so results are
//! deterministic and each pass is testable alone.
//!
//! The validator always recomputes the full diagnostic list; there is no
//! incremental patching.

use std::collections::HashMap;

use crate::model::{Diagnostic, Document, LineRange, Severity};

/// Header keys every rotation file is expected to declare.
pub const REQUIRED_HEADER_KEYS: &[&str] = &[
    "GPLATESROTATIONFILE:version",
    "DC:title",
    "DC:creator",
    "DC:rights",
    "GEOTIMESCALE",
];

/// Which checks to run.
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    /// Master switch; when false, no diagnostics are produced at all.
    pub enabled: bool,
    /// Flag rotations whose moving plate id differs from the sequence's.
    pub check_plate_ids: bool,
    /// Flag enabled rotations whose ages decrease in file order.
    pub check_age_sequence: bool,
    /// Flag all-zero poles at nonzero ages (placeholder rotations).
    pub check_zero_rotations: bool,
    /// Flag negative (future) ages.
    pub check_future_rotations: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            check_plate_ids: true,
            check_age_sequence: true,
            check_zero_rotations: true,
            check_future_rotations: true,
        }
    }
}

/// Runs all enabled checks over a document.
pub fn validate(doc: &Document, options: &ValidateOptions) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    if !options.enabled {
        return diags;
    }

    check_required_headers(doc, &mut diags);
    if options.check_plate_ids {
        check_plate_ids(doc, &mut diags);
    }
    if options.check_age_sequence {
        check_age_order(doc, &mut diags);
    }
    check_present_day(doc, &mut diags);
    check_duplicate_ages(doc, &mut diags);
    if options.check_zero_rotations {
        check_zero_rotations(doc, &mut diags);
    }
    if options.check_future_rotations {
        check_future_rotations(doc, &mut diags);
    }

    diags
}

/// Spans the whole source line a rotation or marker sits on.
fn line_range(doc: &Document, line: usize) -> LineRange {
    let len = doc.line_text(line).map(str::len).unwrap_or(0);
    LineRange::line_span(line, len)
}

fn check_required_headers(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for key in REQUIRED_HEADER_KEYS {
        if !doc.header.attrs.contains(key) {
            diags.push(Diagnostic::new(
                Severity::Warning,
                LineRange::document_start(),
                format!("Missing required header attribute @{key}"),
            ));
        }
    }
}

fn check_plate_ids(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for seq in &doc.sequences {
        for rot in &seq.rotations {
            if rot.plate_id != seq.plate_id {
                diags.push(Diagnostic::new(
                    Severity::Error,
                    line_range(doc, rot.line),
                    format!(
                        "Moving plate id {} does not match sequence plate id {} ({})",
                        rot.plate_id, seq.plate_id, seq.code
                    ),
                ));
            }
        }
    }
}

fn check_age_order(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for seq in &doc.sequences {
        // Disabled rotations neither participate in nor reset the walk.
        let mut prev_age = f64::NEG_INFINITY;
        for rot in seq.enabled_rotations() {
            if rot.age < prev_age {
                diags.push(Diagnostic::new(
                    Severity::Warning,
                    line_range(doc, rot.line),
                    format!(
                        "Age {} Ma is out of order: preceding enabled rotation is at {} Ma",
                        rot.age, prev_age
                    ),
                ));
            }
            prev_age = rot.age;
        }
    }
}

fn check_present_day(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for seq in &doc.sequences {
        if seq.rotations.is_empty() {
            continue;
        }
        if seq.enabled_rotations().all(|r| r.age != 0.0) {
            diags.push(Diagnostic::new(
                Severity::Hint,
                line_range(doc, seq.line),
                format!(
                    "Sequence {} ({}) has no enabled present-day (0 Ma) rotation",
                    seq.plate_id, seq.code
                ),
            ));
        }
    }
}

fn check_duplicate_ages(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for seq in &doc.sequences {
        // Exact-value grouping via the bit pattern.
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for rot in seq.enabled_rotations() {
            *counts.entry(rot.age.to_bits()).or_insert(0) += 1;
        }
        // Every participating line is flagged, so fixing any one of them
        // leaves the warning on the others.
        for rot in seq.enabled_rotations() {
            if counts[&rot.age.to_bits()] > 1 {
                diags.push(Diagnostic::new(
                    Severity::Warning,
                    line_range(doc, rot.line),
                    format!(
                        "Duplicate age {} Ma in sequence {} ({})",
                        rot.age, seq.plate_id, seq.code
                    ),
                ));
            }
        }
    }
}

fn check_zero_rotations(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for seq in &doc.sequences {
        for rot in seq.enabled_rotations() {
            if rot.age > 0.0 && rot.latitude == 0.0 && rot.longitude == 0.0 && rot.angle == 0.0 {
                diags.push(Diagnostic::new(
                    Severity::Warning,
                    line_range(doc, rot.line),
                    format!("Zero rotation at {} Ma", rot.age),
                ));
            }
        }
    }
}

fn check_future_rotations(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for seq in &doc.sequences {
        for rot in seq.enabled_rotations() {
            if rot.age < 0.0 {
                diags.push(Diagnostic::new(
                    Severity::Warning,
                    line_range(doc, rot.line),
                    format!("Future rotation at {} Ma", rot.age),
                ));
            }
        }
    }
}
