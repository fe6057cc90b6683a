//! Column alignment for rotation data lines.
//!
//! The formatter is independent of parsing and validation: it takes one
//! line of text and, if the line has the six-field data shape, re-emits
//! it with aligned columns at a configured precision. Every other line is
//! left alone.

use crate::model::Document;
use crate::parser::{COMMENT_CHAR, DATA_LINE, DISABLED_LINE};

/// Formatting configuration.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Decimal places for the age, pole and angle fields.
    pub decimal_places: usize,
    /// Master switch; when false no replacements are produced.
    pub align_columns: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            decimal_places: 4,
            align_columns: true,
        }
    }
}

/// Produces the aligned replacement for one data line.
///
/// Returns `None` when the line is not a data line, when alignment is
/// switched off, or when the replacement would be identical to the
/// original (no edit needed). Plate-id tokens are kept verbatim so that
/// zero padding like `000` survives; trailing metadata is re-attached
/// with two-space separation. The `#` prefix of a disabled line and any
/// indentation before it are preserved.
pub fn format_line(line: &str, options: &FormatOptions) -> Option<String> {
    if !options.align_columns {
        return None;
    }

    let (caps, prefix) = if let Some(caps) = DATA_LINE.captures(line) {
        (caps, "")
    } else if let Some(caps) = DISABLED_LINE.captures(line) {
        // The shape guarantees the `#` is there.
        let hash = line.find(COMMENT_CHAR)?;
        (caps, &line[..=hash])
    } else {
        return None;
    };

    // The shape guarantees parseability of every captured token.
    let age: f64 = caps[2].parse().unwrap_or_default();
    let latitude: f64 = caps[3].parse().unwrap_or_default();
    let longitude: f64 = caps[4].parse().unwrap_or_default();
    let angle: f64 = caps[5].parse().unwrap_or_default();

    let prec = options.decimal_places;
    let mut replacement = format!(
        "{prefix}{pid1:<3} {age:>10.prec$} {latitude:>10.prec$} {longitude:>10.prec$} {angle:>10.prec$} {pid2:>3}",
        pid1 = &caps[1],
        pid2 = &caps[6],
    );

    let trailing = line[caps.get(6).map_or(line.len(), |m| m.end())..].trim();
    if !trailing.is_empty() {
        replacement.push_str("  ");
        replacement.push_str(trailing);
    }

    if replacement == line {
        None
    } else {
        Some(replacement)
    }
}

/// Rewrites a whole file, aligning data lines and copying every other
/// line through verbatim. The trailing newline is preserved.
pub fn format_content(content: &str, options: &FormatOptions) -> String {
    let mut out: String = content
        .lines()
        .map(|line| match format_line(line, options) {
            Some(replacement) => replacement,
            None => line.to_string(),
        })
        .collect::<Vec<String>>()
        .join("\n");
    if content.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Formats every data line of a parsed document, returning `(line index,
/// replacement)` pairs for the lines that change.
pub fn format_document(doc: &Document, options: &FormatOptions) -> Vec<(usize, String)> {
    doc.lines()
        .enumerate()
        .filter_map(|(index, line)| format_line(line, options).map(|text| (index, text)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn test_format_basic_data_line() {
        let options = FormatOptions::default();
        let formatted = format_line("101 0.0 90.0 0.0 0.0 000", &options).unwrap();
        assert_eq!(
            formatted,
            "101     0.0000    90.0000     0.0000     0.0000 000"
        );
    }

    #[test]
    fn test_format_preserves_zero_padded_plate_ids() {
        let options = FormatOptions::default();
        let formatted = format_line("001 0.0 90.0 0.0 0.0 000", &options).unwrap();
        assert!(formatted.starts_with("001 "));
        assert!(formatted.ends_with(" 000"));
    }

    #[test]
    fn test_format_negative_fields() {
        let options = FormatOptions::default();
        let formatted = format_line("101 10.25 -80.5 -179.125 -1.5 701", &options).unwrap();
        assert_eq!(
            formatted,
            "101    10.2500   -80.5000  -179.1250    -1.5000 701"
        );
    }

    #[test]
    fn test_format_keeps_trailing_metadata() {
        let options = FormatOptions::default();
        let formatted =
            format_line(r#"101 10.0 80.0 -32.0 1.5 000   @REF"Mueller_2016""#, &options).unwrap();
        assert!(formatted.ends_with(r#"  @REF"Mueller_2016""#));
    }

    #[test]
    fn test_format_disabled_line_keeps_prefix() {
        let options = FormatOptions::default();
        let formatted = format_line("  #101 10.0 80.0 -32.0 1.5 000", &options).unwrap();
        assert!(formatted.starts_with("  #101 "));
    }

    #[test]
    fn test_format_idempotent() {
        let options = FormatOptions::default();
        let once = format_line("101 0.0 90.0 0.0 0.0 000", &options).unwrap();
        // A second pass finds nothing to change.
        assert_eq!(format_line(&once, &options), None);
    }

    #[test]
    fn test_format_non_data_lines_untouched() {
        let options = FormatOptions::default();
        assert_eq!(format_line(r#"@DC:title"Test""#, &options), None);
        assert_eq!(
            format_line(r#"> @MPRS:pid"101" @MPRS:code"NAM" @MPRS:name"NA""#, &options),
            None
        );
        assert_eq!(format_line("# free-form comment", &options), None);
        assert_eq!(format_line("", &options), None);
    }

    #[test]
    fn test_format_disabled_by_option() {
        let options = FormatOptions {
            align_columns: false,
            ..FormatOptions::default()
        };
        assert_eq!(format_line("101 0.0 90.0 0.0 0.0 000", &options), None);
    }

    #[test]
    fn test_format_decimal_places() {
        let options = FormatOptions {
            decimal_places: 2,
            ..FormatOptions::default()
        };
        let formatted = format_line("101 10.123 80.0 -32.0 1.5 000", &options).unwrap();
        assert_eq!(formatted, "101      10.12      80.00     -32.00       1.50 000");
    }

    #[test]
    fn test_format_content_leaves_other_lines_byte_identical() {
        let content = concat!(
            "@DC:title\"Test\"\n",
            "> @MPRS:pid\"101\" @MPRS:code\"NAM\" @MPRS:name\"NA\"\n",
            "101 0.0 90.0 0.0 0.0 000\n"
        );
        let options = FormatOptions::default();
        let out = format_content(content, &options);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "@DC:title\"Test\"");
        assert_eq!(lines[1], "> @MPRS:pid\"101\" @MPRS:code\"NAM\" @MPRS:name\"NA\"");
        assert_eq!(lines[2], "101     0.0000    90.0000     0.0000     0.0000 000");
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_format_document_reports_changed_lines_only() {
        let content = concat!(
            "> @MPRS:pid\"101\" @MPRS:code\"NAM\" @MPRS:name\"NA\"\n",
            "101     0.0000    90.0000     0.0000     0.0000 000\n",
            "101 10.0 80.0 -32.0 1.5 000\n"
        );
        let doc = parse_str(content);
        let edits = format_document(&doc, &FormatOptions::default());
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0, 2);
    }

    #[test]
    fn test_round_trip_preserves_tokens() {
        // Formatting parsed fields at the source precision reproduces the
        // original tokens, whitespace aside.
        let line = "101    10.2500   -80.5000  -179.1250    -1.5000 701";
        let doc = parse_str(&format!(
            "> @MPRS:pid\"101\" @MPRS:code\"NAM\" @MPRS:name\"NA\"\n{line}"
        ));
        let rot = &doc.sequences[0].rotations[0];
        let rebuilt = format!(
            "{} {:.4} {:.4} {:.4} {:.4} {}",
            rot.plate_id, rot.age, rot.latitude, rot.longitude, rot.angle, rot.fixed_plate_id
        );
        let original_tokens: Vec<&str> = line.split_whitespace().collect();
        let rebuilt_tokens: Vec<&str> = rebuilt.split_whitespace().collect();
        assert_eq!(rebuilt_tokens, original_tokens);
    }
}
