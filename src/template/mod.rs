//! Resource-region splicing for `.tmpl` files.
//!
//! A template carries one resource region bounded by two sentinel lines:
//!
//! ```text
//! class Mytool < Formula
//!   #---START-RESOURCES---
//!   ...generated resource stanzas...
//!   #---END-RESOURCES---
//! end
//! ```
//!
//! A sentinel must match a whole line exactly; the line terminator (`\n` or
//! `\r\n`) is not part of the line. Everything strictly between the first
//! start marker and the next end marker is replaced. The marker lines and
//! everything outside them are copied byte-for-byte. When a template holds
//! more than one region, only the first is touched and the rest are passed
//! through unchanged.
//!
//! Splicing works on raw bytes. Only the marker lines need to be ASCII, so a
//! template in any encoding round-trips unchanged outside its region.

use crate::core::{Result, UpdaterError};
use std::fs;
use std::path::Path;

/// Line that opens the resource region.
pub const START_MARKER: &str = "#---START-RESOURCES---";

/// Line that closes the resource region.
pub const END_MARKER: &str = "#---END-RESOURCES---";

/// Why a template has no usable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerError {
    /// No line equals [`START_MARKER`]
    MissingStart,
    /// A start marker exists but no [`END_MARKER`] line follows it
    MissingEnd,
}

impl MarkerError {
    fn describe(self) -> String {
        match self {
            Self::MissingStart => format!("no '{START_MARKER}' line found"),
            Self::MissingEnd => format!("no '{END_MARKER}' line found after '{START_MARKER}'"),
        }
    }
}

/// Result of a successful splice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spliced {
    /// Full template bytes with the region replaced
    pub content: Vec<u8>,
    /// Number of interior lines that were dropped
    pub removed_lines: usize,
    /// Number of lines inserted from the include block
    pub inserted_lines: usize,
    /// Whether another start marker follows the replaced region
    pub extra_regions: bool,
}

fn line_text(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_marker(line: &[u8], marker: &str) -> bool {
    line_text(line) == marker.as_bytes()
}

/// Replaces the interior of the first resource region with `include`.
///
/// A non-empty `include` without a trailing newline gets one, so the end
/// marker always stays on its own line.
///
/// # Errors
///
/// Returns [`MarkerError`] when the region cannot be located.
///
/// # Examples
///
/// ```rust
/// use tmpl_resources::template::splice;
///
/// let template = b"A\n#---START-RESOURCES---\nold1\nold2\n#---END-RESOURCES---\nB\n";
/// let spliced = splice(template, b"new1").unwrap();
/// assert_eq!(
///     spliced.content,
///     b"A\n#---START-RESOURCES---\nnew1\n#---END-RESOURCES---\nB\n"
/// );
/// ```
pub fn splice(template: &[u8], include: &[u8]) -> std::result::Result<Spliced, MarkerError> {
    let lines: Vec<&[u8]> = template.split_inclusive(|b| *b == b'\n').collect();

    let start = lines
        .iter()
        .position(|line| is_marker(line, START_MARKER))
        .ok_or(MarkerError::MissingStart)?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| is_marker(line, END_MARKER))
        .map(|offset| start + 1 + offset)
        .ok_or(MarkerError::MissingEnd)?;

    let mut content = Vec::with_capacity(template.len() + include.len() + 1);
    for line in &lines[..=start] {
        content.extend_from_slice(line);
    }
    content.extend_from_slice(include);
    if !include.is_empty() && !include.ends_with(b"\n") {
        content.push(b'\n');
    }
    for line in &lines[end..] {
        content.extend_from_slice(line);
    }

    Ok(Spliced {
        content,
        removed_lines: end - start - 1,
        inserted_lines: include.split_inclusive(|b| *b == b'\n').count(),
        extra_regions: lines[end + 1..].iter().any(|line| is_marker(line, START_MARKER)),
    })
}

/// Splices the include file into the template file and writes the result to
/// `output_path`. The template itself is never written.
///
/// # Errors
///
/// - [`UpdaterError::TemplateFormat`] when a marker is missing
/// - [`UpdaterError::Transform`] when either input cannot be read or the
///   output cannot be written
pub fn splice_file(template_path: &Path, include_path: &Path, output_path: &Path) -> Result<Spliced> {
    let transform_error = |reason: String| UpdaterError::Transform {
        path: template_path.to_path_buf(),
        reason,
    };

    let template = fs::read(template_path)
        .map_err(|e| transform_error(format!("cannot read template: {e}")))?;
    let include = fs::read(include_path)
        .map_err(|e| transform_error(format!("cannot read {}: {e}", include_path.display())))?;

    let spliced = splice(&template, &include).map_err(|e| UpdaterError::TemplateFormat {
        path: template_path.to_path_buf(),
        reason: e.describe(),
    })?;

    if spliced.extra_regions {
        tracing::warn!(
            target: "template",
            "{} contains more than one resource region; only the first was updated",
            template_path.display()
        );
    }
    tracing::debug!(
        target: "template",
        "Replaced {} line(s) with {} line(s) in {}",
        spliced.removed_lines,
        spliced.inserted_lines,
        template_path.display()
    );

    fs::write(output_path, &spliced.content)
        .map_err(|e| transform_error(format!("cannot write {}: {e}", output_path.display())))?;

    Ok(spliced)
}
