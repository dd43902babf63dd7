/// Attachment classification by file extension.
///
/// When an archive does not say which of its entries are notes and which are
/// assets, every non-note entry is run through an [`AttachmentClassifier`].
/// Entries with a recognized extension become attachment candidates; anything
/// else is ignored.
///
/// # Examples
///
/// ```
/// use notetidy::file_category::{AttachmentClassifier, Category};
///
/// let classifier = AttachmentClassifier::default();
/// assert_eq!(classifier.classify("diagram.PNG"), Some(Category::Image));
/// assert_eq!(classifier.classify("slides.pptx"), Some(Category::Presentation));
/// assert_eq!(classifier.classify("notes.db"), None);
/// ```
use std::collections::HashMap;

use crate::relative_path::split_extension;

/// Broad kind of an attachment, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Image files (PNG, JPG, SVG, etc.)
    Image,
    /// Document files (PDF, DOCX, TXT, etc.)
    Document,
    /// Spreadsheet files (XLSX, CSV, etc.)
    Spreadsheet,
    /// Presentation files (PPT, PPTX)
    Presentation,
    /// Archive files (ZIP, RAR, 7Z)
    Archive,
    /// Audio files (MP3, WAV)
    Audio,
    /// Video files (MP4, AVI, MOV)
    Video,
    /// Code and structured text (CSS, JS, JSON, XML)
    Code,
}

impl Category {
    /// Returns a human-readable, plural label for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Document => "documents",
            Category::Spreadsheet => "spreadsheets",
            Category::Presentation => "presentations",
            Category::Archive => "archives",
            Category::Audio => "audio files",
            Category::Video => "videos",
            Category::Code => "code files",
        }
    }
}

/// Decides by extension whether a file is an attachment candidate.
#[derive(Debug, Clone)]
pub struct AttachmentClassifier {
    extension_map: HashMap<String, Category>,
}

impl AttachmentClassifier {
    /// Creates a classifier with the standard extension set.
    pub fn new() -> Self {
        let mut classifier = Self {
            extension_map: HashMap::new(),
        };
        classifier.populate_standard_mappings();
        classifier
    }

    fn populate_standard_mappings(&mut self) {
        for ext in ["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"] {
            self.add_extension_mapping(ext, Category::Image);
        }
        for ext in ["pdf", "doc", "docx", "txt", "rtf"] {
            self.add_extension_mapping(ext, Category::Document);
        }
        for ext in ["xls", "xlsx", "csv"] {
            self.add_extension_mapping(ext, Category::Spreadsheet);
        }
        for ext in ["ppt", "pptx"] {
            self.add_extension_mapping(ext, Category::Presentation);
        }
        for ext in ["zip", "rar", "7z"] {
            self.add_extension_mapping(ext, Category::Archive);
        }
        for ext in ["mp3", "wav"] {
            self.add_extension_mapping(ext, Category::Audio);
        }
        for ext in ["mp4", "avi", "mov"] {
            self.add_extension_mapping(ext, Category::Video);
        }
        for ext in ["css", "js", "json", "xml"] {
            self.add_extension_mapping(ext, Category::Code);
        }
    }

    /// Adds a file extension to category mapping (case-insensitive).
    pub fn add_extension_mapping(&mut self, ext: &str, category: Category) {
        self.extension_map.insert(ext.to_lowercase(), category);
    }

    /// Maps a bare extension to a category.
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    /// Classifies a file name, or returns `None` when it is not an attachment
    /// candidate.
    pub fn classify(&self, filename: &str) -> Option<Category> {
        let (_, ext) = split_extension(filename);
        ext.and_then(|ext| self.extension_to_category(ext))
    }

    pub fn is_attachment(&self, filename: &str) -> bool {
        self.classify(filename).is_some()
    }
}

impl Default for AttachmentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true when `filename` carries the document extension
/// (case-insensitive, without the leading dot).
pub fn is_document(filename: &str, document_extension: &str) -> bool {
    match split_extension(filename) {
        (_, Some(ext)) => ext.eq_ignore_ascii_case(document_extension),
        _ => false,
    }
}
