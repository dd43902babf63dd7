//! Note parsing: splitting the YAML header from the body.
//!
//! A note may start with a header block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Weekly sync
//! tags: [work, meetings]
//! attachments: diagram.png
//! ---
//! Body text, possibly referencing @attachment/diagram.png
//! ```
//!
//! `tags` and `attachments` may each be a list or a single scalar. Notes
//! without a header, or without tags, land under the `untagged` tag.

use serde_yaml_ng::{Mapping, Value};
use std::collections::BTreeSet;

use crate::relative_path::split_extension;

/// Line that opens and closes a header block.
pub const HEADER_DELIMITER: &str = "---";

/// Tag assigned to notes that do not declare any.
pub const UNTAGGED: &str = "untagged";

/// Errors raised while parsing a single note.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontmatterError {
    /// The header was opened but never closed, or its contents could not be
    /// decoded into a key/value mapping.
    MalformedHeader {
        /// Name of the affected note.
        filename: String,
        /// What was wrong with the header.
        reason: String,
    },
}

impl std::fmt::Display for FrontmatterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrontmatterError::MalformedHeader { filename, reason } => {
                write!(f, "Malformed header in {}: {}", filename, reason)
            }
        }
    }
}

impl std::error::Error for FrontmatterError {}

/// A note after header extraction. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Original file name, extension included.
    pub filename: String,
    /// Declared `title`, else the file name without its extension.
    pub title: String,
    /// Declared tags in declaration order; never empty. The first is the
    /// primary tag.
    pub tags: Vec<String>,
    /// Text below the header (the whole text when there is no header).
    pub body: String,
    /// Attachment names declared in the header.
    pub attachments: BTreeSet<String>,
    /// Every decoded header field, including the ones interpreted above.
    pub header: Mapping,
    /// Raw header lines between the delimiters, when a header was present.
    pub header_text: Option<String>,
}

impl ParsedDocument {
    /// The tag that decides where the canonical copy lives.
    pub fn primary_tag(&self) -> &str {
        self.tags.first().map(String::as_str).unwrap_or(UNTAGGED)
    }

    /// Tags after the primary one, each of which gets a link stub.
    pub fn secondary_tags(&self) -> &[String] {
        self.tags.get(1..).unwrap_or(&[])
    }
}

/// Parses `raw_text` as the content of the note `filename`.
///
/// # Errors
///
/// Returns [`FrontmatterError::MalformedHeader`] when the opening delimiter has
/// no matching closing delimiter, when the header is not valid YAML, or when it
/// decodes to something other than a mapping. Such a note should be skipped;
/// the rest of the batch is unaffected.
pub fn parse(filename: &str, raw_text: &str) -> Result<ParsedDocument, FrontmatterError> {
    let lines: Vec<&str> = raw_text.split('\n').collect();

    let opens_header = lines
        .first()
        .is_some_and(|first| is_delimiter(first.trim_start_matches('\u{feff}')));

    if !opens_header {
        return Ok(ParsedDocument {
            filename: filename.to_string(),
            title: default_title(filename),
            tags: vec![UNTAGGED.to_string()],
            body: raw_text.to_string(),
            attachments: BTreeSet::new(),
            header: Mapping::new(),
            header_text: None,
        });
    }

    let closing = lines
        .iter()
        .skip(1)
        .position(|line| is_delimiter(line))
        .map(|offset| offset + 1)
        .ok_or_else(|| malformed(filename, "missing closing '---' delimiter"))?;

    let header_text = lines[1..closing].join("\n");
    let header = decode_header(filename, &header_text)?;

    let mut tags = coerce_list(header.get("tags"));
    if tags.is_empty() {
        tags.push(UNTAGGED.to_string());
    }

    let attachments = coerce_list(header.get("attachments")).into_iter().collect();

    let title = header
        .get("title")
        .and_then(scalar_to_string)
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| default_title(filename));

    Ok(ParsedDocument {
        filename: filename.to_string(),
        title,
        tags,
        body: lines[closing + 1..].join("\n"),
        attachments,
        header,
        header_text: Some(header_text),
    })
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == HEADER_DELIMITER
}

fn default_title(filename: &str) -> String {
    split_extension(filename).0.to_string()
}

fn malformed(filename: &str, reason: impl Into<String>) -> FrontmatterError {
    FrontmatterError::MalformedHeader {
        filename: filename.to_string(),
        reason: reason.into(),
    }
}

/// Decodes the header block. An empty block is an empty mapping.
fn decode_header(filename: &str, header_text: &str) -> Result<Mapping, FrontmatterError> {
    if header_text.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value = serde_yaml_ng::from_str(header_text)
        .map_err(|e| malformed(filename, format!("invalid YAML: {}", e)))?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(malformed(filename, "header is not a key/value mapping")),
    }
}

/// Coerces a header field to a list of strings.
///
/// A sequence keeps its scalar items in order; a lone scalar becomes a
/// one-item list. Blank items, nulls and nested structures are dropped.
fn coerce_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .filter(|item| !item.trim().is_empty())
            .collect(),
        Some(Value::Tagged(tagged)) => coerce_list(Some(&tagged.value)),
        Some(other) => scalar_to_string(other)
            .filter(|item| !item.trim().is_empty())
            .into_iter()
            .collect(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}
