//! Rewriting of inline `@attachment/<name>` references.
//!
//! Notes refer to their assets with the placeholder `@attachment/<name>`, which
//! may appear bare or inside link syntax such as `![plot](@attachment/plot.png)`.
//! Once the note is placed in the output tree the placeholder is replaced by a
//! relative path that actually resolves inside the archive.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::relative_path::join_relative;

/// `@attachment/` followed by a run of non-whitespace, non-`)` characters.
static ATTACHMENT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@attachment/([^)\s]+)").expect("Invalid attachment reference pattern")
});

/// Where the rewritten text will live relative to the attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode<'a> {
    /// The canonical copy, stored in the same folder as its attachments.
    Canonical,
    /// A link stub; the value is the relative path from the stub's folder to
    /// the canonical copy's folder.
    LinkStub(&'a str),
}

/// Replaces every attachment reference in `text` according to `mode`.
///
/// This is a pure text substitution: names are not checked against the
/// attachments the note declares.
///
/// # Examples
///
/// ```
/// use notetidy::link_rewriter::{rewrite, RewriteMode};
///
/// let text = "![d](@attachment/diagram.png)";
/// assert_eq!(rewrite(text, RewriteMode::Canonical), "![d](./diagram.png)");
/// assert_eq!(
///     rewrite(text, RewriteMode::LinkStub("../design")),
///     "![d](../design/diagram.png)"
/// );
/// ```
pub fn rewrite(text: &str, mode: RewriteMode<'_>) -> String {
    ATTACHMENT_REF
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            match mode {
                RewriteMode::Canonical => format!("./{}", name),
                RewriteMode::LinkStub(relative) => join_relative(relative, name),
            }
        })
        .into_owned()
}

/// Lists the attachment names referenced inline, in order of appearance.
pub fn referenced_names(text: &str) -> Vec<&str> {
    ATTACHMENT_REF
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
