//! GROT file parser.
//!
//! GROT is line oriented. A file is a header of `@Key"Value"` lines,
//! followed by moving plate rotation sequences. Each sequence starts with
//! a `>` marker line and collects the data lines after it:
//!
//! ```text
//! @GPLATESROTATIONFILE:version"1.0"
//! @DC:title"Example model"
//!
//! > @MPRS:pid"101" @MPRS:code"NAM" @MPRS:name"North America" @PP"NAM-HOT"
//! 101   0.0000    90.0000     0.0000     0.0000 000 @REF"Mueller_2016"
//! 101  10.0000    80.2100   -32.8000     1.5300 000
//! #101  20.0000    79.0000   -33.1000     2.9000 000 @C"superseded"
//! ```
//!
//! A `#` before the plate id disables a data line without removing it.
//! The compact marker form `> @MPRS"101 | NAM | North America"` is also
//! accepted.
//!
//! ## Permissive parsing
//!
//! Parsing is total: every line either contributes to the model or is
//! skipped. Unknown constructs, free-form comments and foreign tooling
//! output never fail the parse; malformed input just degrades to fewer
//! recognized entities. "Error-like" findings are the validator's job.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::attr;
use crate::model::{Document, HeaderSet, Rotation, RotationSequence};

/// Attribute key carrying the `MOVING-FIXED` plate pair of a sequence.
pub const PLATE_PAIR_KEY: &str = "PP";

/// Marker character opening a sequence header line.
pub const MARKER_CHAR: char = '>';

/// Comment character disabling a data line.
pub const COMMENT_CHAR: char = '#';

/// A `@Key"Value"` pair anchored at the start of a (trimmed) line.
static HEADER_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^@([A-Z][A-Za-z0-9_:]*)"([^"]*)""#).unwrap());

/// Strict marker shape: pid, code and name as three quoted attributes.
static MARKER_STRICT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^>\s*@MPRS:pid"(\d{1,4})"\s+@MPRS:code"([^"]*)"\s+@MPRS:name"([^"]*)""#)
        .unwrap()
});

/// Compact marker shape: the same three values pipe-delimited in one blob.
static MARKER_COMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^>\s*@MPRS"\s*(\d{1,4})\s*\|([^|"]*)\|([^"]*)""#).unwrap());

/// Enabled data line: pid, age, lat, lon, angle, pid.
pub(crate) static DATA_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\d{1,4})\s+([-+]?\d+(?:\.\d+)?)\s+([-+]?\d+(?:\.\d+)?)\s+([-+]?\d+(?:\.\d+)?)\s+([-+]?\d+(?:\.\d+)?)\s+(\d{1,4})(?:\s|$)",
    )
    .unwrap()
});

/// Disabled data line: the same shape behind a `#`.
pub(crate) static DISABLED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*#\s*(\d{1,4})\s+([-+]?\d+(?:\.\d+)?)\s+([-+]?\d+(?:\.\d+)?)\s+([-+]?\d+(?:\.\d+)?)\s+([-+]?\d+(?:\.\d+)?)\s+(\d{1,4})(?:\s|$)",
    )
    .unwrap()
});

/// The six numeric fields of a data line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataFields {
    pub plate_id: u32,
    pub age: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub angle: f64,
    pub fixed_plate_id: u32,
}

/// Classification of a single source line.
///
/// The parser matches this exhaustively; adding a new line kind is a
/// localized change here.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Empty after trimming. Never advances parser state.
    Blank,
    /// `@Key"Value"` at line start; only meaningful while the header
    /// region is open. Carries the first pair on the line.
    HeaderAttribute { key: String, value: String },
    /// A `>` line matching the strict or compact sequence header shape.
    SequenceMarker {
        plate_id: u32,
        code: String,
        name: String,
    },
    /// A `>` line matching neither marker shape; its attributes merge
    /// into the currently open sequence, if any.
    MarkerContinuation,
    /// An enabled six-field data line.
    Data(DataFields),
    /// A six-field data line commented out with `#`.
    DisabledData(DataFields),
    /// Anything else. Skipped, never an error.
    Unrecognized,
}

fn data_fields(caps: &regex::Captures<'_>) -> DataFields {
    // The patterns admit only tokens `parse` accepts, so the fallbacks
    // are unreachable.
    DataFields {
        plate_id: caps[1].parse().unwrap_or_default(),
        age: caps[2].parse().unwrap_or_default(),
        latitude: caps[3].parse().unwrap_or_default(),
        longitude: caps[4].parse().unwrap_or_default(),
        angle: caps[5].parse().unwrap_or_default(),
        fixed_plate_id: caps[6].parse().unwrap_or_default(),
    }
}

/// Classifies one source line by shape alone.
///
/// Marker-prefixed lines are checked first: `>` cannot begin a numeric
/// data shape, so the kinds are disjoint, but checking the prefix first
/// keeps the common data-line path cheap.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if trimmed.starts_with(MARKER_CHAR) {
        if let Some(caps) = MARKER_STRICT.captures(trimmed) {
            return LineKind::SequenceMarker {
                plate_id: caps[1].parse().unwrap_or_default(),
                code: caps[2].to_string(),
                name: caps[3].to_string(),
            };
        }
        if let Some(caps) = MARKER_COMPACT.captures(trimmed) {
            return LineKind::SequenceMarker {
                plate_id: caps[1].parse().unwrap_or_default(),
                code: caps[2].trim().to_string(),
                name: caps[3].trim().to_string(),
            };
        }
        return LineKind::MarkerContinuation;
    }

    if let Some(caps) = HEADER_ATTR.captures(trimmed) {
        return LineKind::HeaderAttribute {
            key: caps[1].to_string(),
            value: caps[2].to_string(),
        };
    }

    if let Some(caps) = DATA_LINE.captures(line) {
        return LineKind::Data(data_fields(&caps));
    }
    if let Some(caps) = DISABLED_LINE.captures(line) {
        return LineKind::DisabledData(data_fields(&caps));
    }

    LineKind::Unrecognized
}

/// Parses a complete GROT document from a string.
pub fn parse_str(content: &str) -> Document {
    parse_lines(content.lines())
}

/// Parses a complete GROT document from an iterator of lines.
///
/// One forward pass, O(1) state beyond the accumulating document: a
/// header-open flag and the optionally open sequence. Total function;
/// never fails.
pub fn parse_lines<'a, I>(lines: I) -> Document
where
    I: IntoIterator<Item = &'a str>,
{
    let mut header = HeaderSet::default();
    let mut sequences: Vec<RotationSequence> = Vec::new();
    let mut current: Option<RotationSequence> = None;
    let mut header_open = true;
    let mut source: Vec<String> = Vec::new();

    for (index, line) in lines.into_iter().enumerate() {
        source.push(line.to_string());

        match classify(line) {
            LineKind::Blank | LineKind::Unrecognized => {}

            LineKind::HeaderAttribute { key, value } => {
                // The header region closes for good at the first marker;
                // later `@` lines are not document metadata.
                if header_open {
                    header.record(&key, &value);
                }
            }

            LineKind::SequenceMarker {
                plate_id,
                code,
                name,
            } => {
                header_open = false;
                if let Some(seq) = current.take() {
                    sequences.push(seq);
                }
                let attrs = attr::extract(line);
                let plate_pair = attrs.get(PLATE_PAIR_KEY).map(str::to_string);
                current = Some(RotationSequence {
                    plate_id,
                    code,
                    name,
                    plate_pair,
                    attrs,
                    line: index,
                    rotations: Vec::new(),
                });
            }

            LineKind::MarkerContinuation => {
                if let Some(seq) = current.as_mut() {
                    let attrs = attr::extract(line);
                    if let Some(pair) = attrs.get(PLATE_PAIR_KEY) {
                        seq.plate_pair = Some(pair.to_string());
                    }
                    seq.attrs.merge(&attrs);
                }
            }

            LineKind::Data(fields) => {
                push_rotation(&mut current, index, line, fields, false);
            }
            LineKind::DisabledData(fields) => {
                push_rotation(&mut current, index, line, fields, true);
            }
        }
    }

    // Don't forget the last sequence
    if let Some(seq) = current.take() {
        sequences.push(seq);
    }

    Document::new(header, sequences, source)
}

/// Appends a rotation to the open sequence. A data line outside any
/// sequence is out-of-context (stray numeric debug output happens in the
/// wild) and is dropped without a diagnostic.
fn push_rotation(
    current: &mut Option<RotationSequence>,
    index: usize,
    line: &str,
    fields: DataFields,
    disabled: bool,
) {
    if let Some(seq) = current.as_mut() {
        seq.rotations.push(Rotation {
            line: index,
            plate_id: fields.plate_id,
            age: fields.age,
            latitude: fields.latitude,
            longitude: fields.longitude,
            angle: fields.angle,
            fixed_plate_id: fields.fixed_plate_id,
            attrs: attr::extract(line),
            disabled,
            raw: line.to_string(),
        });
    }
}
