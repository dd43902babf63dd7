//! One organize run over a batch of raw notes.
//!
//! The batch runner is where per-note failures stop: a note that is not UTF-8
//! or whose header is malformed is recorded as failed and the run moves on to
//! the next note. Only run-level conditions (nothing to organize, nothing
//! organized) become a [`RunError`].

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::attachments::AttachmentRegistry;
use crate::config::OrganizeOptions;
use crate::frontmatter::{self, FrontmatterError, ParsedDocument};
use crate::organizer::{OrganizeEvent, OrganizeObserver, OrganizerEngine, OutputTree, Placement};

/// Raw note bytes as handed over by the input layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name of the note (final path segment).
    pub name: String,
    /// Where the note came from, for messages: a file path or
    /// `archive.zip:inner/path.md`.
    pub origin: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, origin: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            bytes,
        }
    }
}

/// Why a single note was dropped from the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The note's bytes are not valid UTF-8.
    InvalidEncoding { reason: String },
    /// The note's header could not be parsed.
    Malformed(FrontmatterError),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::InvalidEncoding { reason } => {
                write!(f, "Not valid UTF-8 text: {}", reason)
            }
            DocumentError::Malformed(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<FrontmatterError> for DocumentError {
    fn from(e: FrontmatterError) -> Self {
        DocumentError::Malformed(e)
    }
}

/// Run-level failures. Any of these means no archive is produced.
#[derive(Debug)]
pub enum RunError {
    /// The batch holds no notes at all.
    NoDocumentsFound,
    /// An input archive could not be read, or held neither notes nor
    /// attachment candidates.
    Extraction { archive: PathBuf, reason: String },
    /// Every note in the batch failed to parse.
    AllDocumentsFailed { failed: usize },
    /// An input path could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The output archive could not be written.
    ArchiveWrite { path: PathBuf, reason: String },
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::NoDocumentsFound => write!(
                f,
                "No markdown files found. Select .md files or ZIP archives containing .md files."
            ),
            RunError::Extraction { archive, reason } => {
                write!(
                    f,
                    "Error processing ZIP file {}: {}",
                    archive.display(),
                    reason
                )
            }
            RunError::AllDocumentsFailed { failed } => {
                write!(
                    f,
                    "None of the {} input file(s) could be organized",
                    failed
                )
            }
            RunError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            RunError::ArchiveWrite { path, reason } => {
                write!(f, "Failed to write {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// What happened to one input note.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Organized(Placement),
    Failed {
        filename: String,
        origin: String,
        error: DocumentError,
    },
}

/// Result of a successful run.
#[derive(Debug)]
pub struct RunReport<'a> {
    pub tree: OutputTree<'a>,
    /// One outcome per input note, in input order.
    pub outcomes: Vec<DocumentOutcome>,
}

impl RunReport<'_> {
    pub fn organized_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, DocumentOutcome::Organized(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.organized_count()
    }

    /// Distinct folders that received a canonical copy or a link stub.
    pub fn folders(&self) -> BTreeSet<&str> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                DocumentOutcome::Organized(placement) => Some(placement.folders()),
                DocumentOutcome::Failed { .. } => None,
            })
            .flatten()
            .collect()
    }
}

/// Decodes and parses one source note.
pub fn parse_source(source: &SourceDocument) -> Result<ParsedDocument, DocumentError> {
    let text = std::str::from_utf8(&source.bytes).map_err(|e| DocumentError::InvalidEncoding {
        reason: e.to_string(),
    })?;
    Ok(frontmatter::parse(&source.name, text)?)
}

/// Parses and organizes `sources` in input order.
///
/// # Errors
///
/// Returns [`RunError::NoDocumentsFound`] for an empty batch and
/// [`RunError::AllDocumentsFailed`] when no note could be parsed. Individual
/// failures are reported through `observer` and in the report's outcomes.
pub fn run_batch<'a>(
    sources: &[SourceDocument],
    registry: &'a AttachmentRegistry,
    options: &OrganizeOptions,
    observer: &mut dyn OrganizeObserver,
) -> Result<RunReport<'a>, RunError> {
    if sources.is_empty() {
        return Err(RunError::NoDocumentsFound);
    }

    let mut engine = OrganizerEngine::new(registry, options.clone());
    let mut outcomes = Vec::with_capacity(sources.len());

    for (index, source) in sources.iter().enumerate() {
        observer.on_event(&OrganizeEvent::DocumentStarted {
            index,
            filename: source.name.clone(),
        });

        match parse_source(source) {
            Ok(document) => {
                let placement = engine.place(index, &document, observer);
                observer.on_event(&OrganizeEvent::DocumentPlaced {
                    index,
                    placement: placement.clone(),
                });
                outcomes.push(DocumentOutcome::Organized(placement));
            }
            Err(error) => {
                observer.on_event(&OrganizeEvent::DocumentFailed {
                    index,
                    filename: source.name.clone(),
                    reason: error.to_string(),
                });
                outcomes.push(DocumentOutcome::Failed {
                    filename: source.name.clone(),
                    origin: source.origin.clone(),
                    error,
                });
            }
        }
    }

    let report = RunReport {
        tree: engine.finish(),
        outcomes,
    };

    if report.organized_count() == 0 {
        return Err(RunError::AllDocumentsFailed {
            failed: report.failed_count(),
        });
    }

    Ok(report)
}
