//! Turning command-line paths into a note batch and an attachment registry.
//!
//! Accepted inputs:
//! - note files (the configured document extension, `.md` by default);
//! - ZIP archives, recognized by the `.zip` extension, or by their signature
//!   when the extension is not a known attachment type (`.docx` and friends
//!   are zip containers too);
//! - directories, whose immediate entries are treated as above;
//! - any other file the [`AttachmentClassifier`] accepts, registered as an
//!   attachment.
//!
//! Everything else is ignored. Filters from the configuration are applied to
//! every file and archive entry first.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::{looks_like_zip, read_archive};
use crate::attachments::{AttachmentBlob, AttachmentRegistry};
use crate::batch::{RunError, SourceDocument};
use crate::config::CompiledFilters;
use crate::file_category::{AttachmentClassifier, Category, is_document};

/// Everything gathered from the inputs of one run.
#[derive(Debug, Default)]
pub struct CollectedInputs {
    /// Notes in the order they were found.
    pub documents: Vec<SourceDocument>,
    pub registry: AttachmentRegistry,
    /// Archives that were extracted.
    pub archives: Vec<PathBuf>,
    /// Registered attachments per category.
    pub attachment_kinds: BTreeMap<Category, usize>,
    /// Files that were neither notes, archives nor attachments.
    pub ignored: Vec<PathBuf>,
}

/// Collects notes and attachments from `paths`.
pub struct InputCollector<'a> {
    document_extension: &'a str,
    filters: &'a CompiledFilters,
    classifier: AttachmentClassifier,
    /// Canonical path of a file never read as input, usually the output archive.
    skipped: Option<PathBuf>,
}

impl<'a> InputCollector<'a> {
    pub fn new(document_extension: &'a str, filters: &'a CompiledFilters) -> Self {
        Self {
            document_extension,
            filters,
            classifier: AttachmentClassifier::default(),
            skipped: None,
        }
    }

    /// Never read `path`, even when it sits inside an input directory.
    ///
    /// A path that does not exist yet cannot be listed either, so only an
    /// existing file is remembered.
    pub fn skipping(mut self, path: &Path) -> Self {
        self.skipped = fs::canonicalize(path).ok();
        self
    }

    fn is_skipped(&self, path: &Path) -> bool {
        self.skipped
            .as_deref()
            .is_some_and(|skipped| fs::canonicalize(path).is_ok_and(|p| p == skipped))
    }

    /// Reads every input path.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Io`] for unreadable paths and
    /// [`RunError::Extraction`] for archives that cannot be opened or contain
    /// neither notes nor attachment candidates. An empty result is not an
    /// error here; the batch runner reports it.
    pub fn collect(&self, paths: &[PathBuf]) -> Result<CollectedInputs, RunError> {
        let mut inputs = CollectedInputs::default();

        for path in paths {
            let metadata = fs::metadata(path).map_err(|e| RunError::Io {
                path: path.clone(),
                source: e,
            })?;

            if metadata.is_dir() {
                for file_path in Self::list_directory(path)? {
                    self.collect_file(&file_path, &mut inputs)?;
                }
            } else {
                self.collect_file(path, &mut inputs)?;
            }
        }

        Ok(inputs)
    }

    /// Immediate file entries of `dir`, sorted by name.
    fn list_directory(dir: &Path) -> Result<Vec<PathBuf>, RunError> {
        let entries = fs::read_dir(dir).map_err(|e| RunError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
            .map(|entry| entry.path())
            .collect();
        files.sort();
        Ok(files)
    }

    fn collect_file(&self, path: &Path, inputs: &mut CollectedInputs) -> Result<(), RunError> {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(());
        };

        if !self.filters.should_include(Path::new(&name)) || self.is_skipped(path) {
            return Ok(());
        }

        let read = || {
            fs::read(path).map_err(|e| RunError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        };

        if is_document(&name, self.document_extension) {
            let origin = path.display().to_string();
            inputs.documents.push(SourceDocument::new(name, origin, read()?));
            return Ok(());
        }

        let bytes = read()?;
        let is_zip_name = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        let category = self.classifier.classify(&name);

        // Office documents are zip containers too; a known attachment
        // extension wins over the signature.
        if is_zip_name || (category.is_none() && looks_like_zip(&bytes)) {
            self.extract_archive(path, &bytes, inputs)?;
            inputs.archives.push(path.to_path_buf());
        } else if let Some(category) = category {
            inputs.registry.insert(AttachmentBlob::new(name, bytes));
            *inputs.attachment_kinds.entry(category).or_insert(0) += 1;
        } else {
            inputs.ignored.push(path.to_path_buf());
        }

        Ok(())
    }

    /// Pulls notes and attachment candidates out of one archive.
    fn extract_archive(
        &self,
        archive_path: &Path,
        bytes: &[u8],
        inputs: &mut CollectedInputs,
    ) -> Result<(), RunError> {
        let extraction_error = |reason: String| RunError::Extraction {
            archive: archive_path.to_path_buf(),
            reason,
        };

        let entries = read_archive(bytes).map_err(|e| extraction_error(e.to_string()))?;

        let mut documents = 0;
        let mut attachments = 0;
        for entry in entries {
            if entry.is_dir || !self.filters.should_include(Path::new(&entry.path)) {
                continue;
            }

            let name = entry.file_name().to_string();
            if is_document(&name, self.document_extension) {
                let origin = format!("{}:{}", archive_path.display(), entry.path);
                inputs
                    .documents
                    .push(SourceDocument::new(name, origin, entry.bytes));
                documents += 1;
            } else if let Some(category) = self.classifier.classify(&name) {
                inputs.registry.insert(AttachmentBlob::new(name, entry.bytes));
                *inputs.attachment_kinds.entry(category).or_insert(0) += 1;
                attachments += 1;
            }
        }

        if documents == 0 && attachments == 0 {
            return Err(extraction_error(
                "No markdown files found in ZIP archive".to_string(),
            ));
        }

        Ok(())
    }
}
