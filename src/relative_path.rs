//! Relative paths between folders of the output tree.
//!
//! All paths here are archive paths: `/`-delimited, relative to the archive
//! root, with the empty string standing for the root itself.

/// Computes the path that leads from folder `from` to folder `to`.
///
/// Empty segments are ignored on both sides. The result is one `../` per
/// segment of `from` past the common prefix, followed by the rest of `to`.
/// Identical folders yield the empty string, so callers that need a
/// same-folder reference must prefix `./` themselves (see [`join_relative`]).
///
/// # Examples
///
/// ```
/// use notetidy::relative_path::relative_path;
///
/// assert_eq!(relative_path("a/b", "a/c"), "../c");
/// assert_eq!(relative_path("a", "a/b/c"), "b/c");
/// assert_eq!(relative_path("a/b", "a/b"), "");
/// ```
pub fn relative_path(from: &str, to: &str) -> String {
    let from_parts: Vec<&str> = from.split('/').filter(|part| !part.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|part| !part.is_empty()).collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let up = "../".repeat(from_parts.len() - common);
    let down = to_parts[common..].join("/");

    up + &down
}

/// Appends `name` to a relative folder path produced by [`relative_path`].
///
/// An empty `relative` becomes `./name`; a trailing slash (as in `../`) is not
/// doubled.
pub fn join_relative(relative: &str, name: &str) -> String {
    if relative.is_empty() {
        format!("./{}", name)
    } else {
        format!("{}/{}", relative.trim_end_matches('/'), name)
    }
}

/// Joins a folder and a file name into an archive path.
///
/// The empty folder is the archive root, so the name is returned unchanged.
pub fn folder_join(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Splits a file name into its stem and extension at the last dot.
///
/// Leading-dot names such as `.hidden` have no extension.
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}
