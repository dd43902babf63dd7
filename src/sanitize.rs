//! Tag-to-folder sanitization.
//!
//! Tags are free-form strings typed by the note author. Before one can name a
//! folder inside the output archive it has to lose the characters that are not
//! portable across filesystems, and any segment that would let it escape the
//! archive root.
//!
//! # Examples
//!
//! ```
//! use notetidy::sanitize::sanitize;
//!
//! assert_eq!(sanitize("projects/rust"), "projects/rust");
//! assert_eq!(sanitize("  what?  now  "), "what- now");
//! assert_eq!(sanitize("archive/"), "archive");
//! assert_eq!(sanitize("<>"), "--");
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// Characters that are rejected by at least one common filesystem.
static FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"|?*]"#).expect("Invalid forbidden-character pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace pattern"));

/// Turns an arbitrary tag into a relative, `/`-delimited folder path.
///
/// Steps, in order:
/// 1. Replace each of `< > : " | ? *` with `-`.
/// 2. Collapse runs of whitespace into a single space.
/// 3. Drop blank, `.` and `..` segments (this also removes leading, trailing
///    and doubled slashes).
/// 4. Trim leading and trailing whitespace.
///
/// An empty result is valid and means "the archive root". The function is
/// idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(tag: &str) -> String {
    let replaced = FORBIDDEN.replace_all(tag, "-");
    let collapsed = WHITESPACE_RUN.replace_all(&replaced, " ");

    let joined = collapsed
        .split('/')
        .filter(|segment| {
            let trimmed = segment.trim();
            !trimmed.is_empty() && trimmed != "." && trimmed != ".."
        })
        .collect::<Vec<_>>()
        .join("/");

    joined.trim().to_string()
}
