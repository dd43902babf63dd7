//! Tag-driven placement of notes into the output tree.
//!
//! Each note is stored once, in full, under the folder of its primary tag (the
//! *canonical copy*). Its declared attachments are stored next to it. Every
//! further tag gets a *link stub*: a short generated note in that tag's folder
//! that points back at the canonical copy and previews its body.
//!
//! ```text
//! tags: [work, personal]        work/note.md            (canonical copy)
//! attachments: [plot.png]  =>   work/plot.png           (attachment)
//!                               personal/note - Link.md (link stub)
//! ```
//!
//! The engine is pure: it builds an [`OutputTree`] in memory and reports
//! progress through an [`OrganizeObserver`] instead of printing.

use std::collections::{BTreeMap, HashMap};

use crate::attachments::{AttachmentBlob, AttachmentRegistry};
use crate::config::OrganizeOptions;
use crate::frontmatter::{HEADER_DELIMITER, ParsedDocument};
use crate::link_rewriter::{RewriteMode, referenced_names, rewrite};
use crate::relative_path::{folder_join, join_relative, relative_path, split_extension};
use crate::sanitize::sanitize;

/// Suffix appended to the stem of a note to name its link stubs.
pub const LINK_SUFFIX: &str = " - Link";

const TRUNCATION_NOTICE: &str = "\n\n... (content truncated - see original file for full content)";

/// Content of one output entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Generated or rewritten text.
    Text(String),
    /// An attachment, borrowed from the registry.
    Attachment(&'a AttachmentBlob),
}

impl Payload<'_> {
    /// Raw bytes to store in the archive.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Attachment(blob) => &blob.bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Attachment(_) => None,
        }
    }
}

/// The complete path-to-content mapping produced by an organize run.
///
/// Paths are unique; inserting an existing path replaces its content.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputTree<'a> {
    nodes: BTreeMap<String, Payload<'a>>,
}

impl<'a> OutputTree<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, returning the payload previously stored at `path`.
    pub fn insert(&mut self, path: String, payload: Payload<'a>) -> Option<Payload<'a>> {
        self.nodes.insert(path, payload)
    }

    pub fn get(&self, path: &str) -> Option<&Payload<'a>> {
        self.nodes.get(path)
    }

    /// Text content at `path`, if the node exists and holds text.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Payload::as_text)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// All entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Payload<'a>)> {
        self.nodes.iter().map(|(path, payload)| (path.as_str(), payload))
    }
}

/// Progress reported by the engine and the batch runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeEvent {
    /// A note is about to be processed.
    DocumentStarted { index: usize, filename: String },
    /// A note was placed; lists every path written for it.
    DocumentPlaced {
        index: usize,
        placement: Placement,
    },
    /// A note was dropped from the batch.
    DocumentFailed {
        index: usize,
        filename: String,
        reason: String,
    },
    /// A declared attachment is not in the registry; references are still
    /// rewritten but no file is written.
    AttachmentMissing { filename: String, attachment: String },
    /// A note references an attachment inline without declaring it.
    UndeclaredAttachment { filename: String, attachment: String },
    /// A later note wrote to a path an earlier note already used.
    PathOverwritten { path: String, filename: String },
}

/// Receives [`OrganizeEvent`]s as a run progresses.
pub trait OrganizeObserver {
    fn on_event(&mut self, event: &OrganizeEvent);
}

impl<F: FnMut(&OrganizeEvent)> OrganizeObserver for F {
    fn on_event(&mut self, event: &OrganizeEvent) {
        self(event)
    }
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl OrganizeObserver for NoopObserver {
    fn on_event(&mut self, _event: &OrganizeEvent) {}
}

/// Every path written for one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Original file name of the note.
    pub filename: String,
    /// Sanitized primary-tag folder (empty for the archive root).
    pub primary_folder: String,
    /// Path of the canonical copy.
    pub canonical_path: String,
    /// Paths of attachments copied next to the canonical copy.
    pub attachment_paths: Vec<String>,
    /// Paths of link stubs, in tag order.
    pub stub_paths: Vec<String>,
    /// Paths of URL shortcuts, when enabled.
    pub shortcut_paths: Vec<String>,
}

impl Placement {
    /// Folders this note appears in: the primary folder first, then one per
    /// link stub.
    pub fn folders(&self) -> Vec<&str> {
        let mut folders = vec![self.primary_folder.as_str()];
        folders.extend(
            self.stub_paths
                .iter()
                .map(|path| path.rsplit_once('/').map_or("", |(folder, _)| folder)),
        );
        folders
    }
}

/// Builds an [`OutputTree`] from parsed notes, one note at a time.
pub struct OrganizerEngine<'a> {
    registry: &'a AttachmentRegistry,
    options: OrganizeOptions,
    tree: OutputTree<'a>,
    owners: HashMap<String, usize>,
}

impl<'a> OrganizerEngine<'a> {
    pub fn new(registry: &'a AttachmentRegistry, options: OrganizeOptions) -> Self {
        Self {
            registry,
            options,
            tree: OutputTree::new(),
            owners: HashMap::new(),
        }
    }

    /// Places one note in the tree. `index` identifies the note in its batch
    /// and is echoed in events.
    ///
    /// Each insertion is a single map write, so stopping between calls leaves
    /// a consistent tree.
    pub fn place(
        &mut self,
        index: usize,
        document: &ParsedDocument,
        observer: &mut dyn OrganizeObserver,
    ) -> Placement {
        let registry = self.registry;
        let primary = sanitize(document.primary_tag());
        let canonical_path = folder_join(&primary, &document.filename);

        let mut placement = Placement {
            filename: document.filename.clone(),
            primary_folder: primary.clone(),
            canonical_path: canonical_path.clone(),
            ..Default::default()
        };

        let canonical_body = rewrite(&document.body, RewriteMode::Canonical);
        let canonical_content = match (&document.header_text, self.options.preserve_header) {
            (Some(header), true) => format!(
                "{delim}\n{header}\n{delim}\n{body}",
                delim = HEADER_DELIMITER,
                header = header,
                body = canonical_body
            ),
            _ => canonical_body,
        };
        self.write(
            index,
            document,
            canonical_path.clone(),
            Payload::Text(canonical_content),
            observer,
        );

        for name in &document.attachments {
            match registry.get(name) {
                Some(blob) => {
                    let path = folder_join(&primary, name);
                    self.write(index, document, path.clone(), Payload::Attachment(blob), observer);
                    placement.attachment_paths.push(path);
                }
                None => observer.on_event(&OrganizeEvent::AttachmentMissing {
                    filename: document.filename.clone(),
                    attachment: name.clone(),
                }),
            }
        }

        for name in referenced_names(&document.body) {
            if !document.attachments.contains(name) {
                observer.on_event(&OrganizeEvent::UndeclaredAttachment {
                    filename: document.filename.clone(),
                    attachment: name.to_string(),
                });
            }
        }

        let (stem, extension) = split_extension(&document.filename);
        let extension = extension
            .unwrap_or(self.options.document_extension())
            .to_string();

        for tag in document.secondary_tags() {
            let secondary = sanitize(tag);
            let relative = relative_path(&secondary, &primary);
            let target = join_relative(&relative, &document.filename);

            let preview = rewrite(&document.body, RewriteMode::LinkStub(&relative));
            let stub = link_stub_content(
                &document.filename,
                &canonical_path,
                &target,
                &preview,
                self.options.preview_chars,
            );
            let stub_path = folder_join(&secondary, &format!("{}{}.{}", stem, LINK_SUFFIX, extension));
            self.write(index, document, stub_path.clone(), Payload::Text(stub), observer);
            placement.stub_paths.push(stub_path);

            if self.options.emit_url_shortcuts {
                let shortcut_path = folder_join(&secondary, &format!("{}{}.url", stem, LINK_SUFFIX));
                self.write(
                    index,
                    document,
                    shortcut_path.clone(),
                    Payload::Text(url_shortcut_content(&target)),
                    observer,
                );
                placement.shortcut_paths.push(shortcut_path);
            }
        }

        placement
    }

    fn write(
        &mut self,
        index: usize,
        document: &ParsedDocument,
        path: String,
        payload: Payload<'a>,
        observer: &mut dyn OrganizeObserver,
    ) {
        // Two notes sharing a folder may both declare the same registry blob.
        let same_attachment = match (self.tree.get(&path), &payload) {
            (Some(Payload::Attachment(old)), Payload::Attachment(new)) => std::ptr::eq(*old, *new),
            _ => false,
        };

        if let Some(previous_owner) = self.owners.insert(path.clone(), index)
            && previous_owner != index
            && !same_attachment
        {
            observer.on_event(&OrganizeEvent::PathOverwritten {
                path: path.clone(),
                filename: document.filename.clone(),
            });
        }
        self.tree.insert(path, payload);
    }

    /// The tree built so far.
    pub fn tree(&self) -> &OutputTree<'a> {
        &self.tree
    }

    pub fn finish(self) -> OutputTree<'a> {
        self.tree
    }
}

/// Organizes a batch of notes with default options.
pub fn organize<'a>(
    documents: &[ParsedDocument],
    registry: &'a AttachmentRegistry,
) -> OutputTree<'a> {
    organize_with(documents, registry, OrganizeOptions::default(), &mut NoopObserver)
}

/// Organizes a batch of notes in input order, reporting to `observer`.
pub fn organize_with<'a>(
    documents: &[ParsedDocument],
    registry: &'a AttachmentRegistry,
    options: OrganizeOptions,
    observer: &mut dyn OrganizeObserver,
) -> OutputTree<'a> {
    let mut engine = OrganizerEngine::new(registry, options);
    for (index, document) in documents.iter().enumerate() {
        observer.on_event(&OrganizeEvent::DocumentStarted {
            index,
            filename: document.filename.clone(),
        });
        let placement = engine.place(index, document, observer);
        observer.on_event(&OrganizeEvent::DocumentPlaced { index, placement });
    }
    engine.finish()
}

/// Builds the markdown body of a link stub.
fn link_stub_content(
    filename: &str,
    canonical_path: &str,
    target: &str,
    preview: &str,
    preview_chars: usize,
) -> String {
    let link = if target.contains(char::is_whitespace) {
        format!("<{}>", target)
    } else {
        target.to_string()
    };

    format!(
        "# Link to {filename}\n\n\
         **Original Location:** `{canonical_path}`\n\n\
         [Open Original File]({link})\n\n\
         ---\n\n\
         *This is a reference file. The actual content is located at the path shown above.*\n\n\
         ## File Preview\n\n\
         {preview}",
        filename = filename,
        canonical_path = canonical_path,
        link = link,
        preview = truncate_preview(preview, preview_chars),
    )
}

/// Keeps the first `limit` characters, appending a notice when cut.
fn truncate_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_NOTICE),
        None => text.to_string(),
    }
}

/// Internet-shortcut file pointing at the canonical copy.
fn url_shortcut_content(target: &str) -> String {
    format!("[InternetShortcut]\r\nURL={}\r\n", target)
}
