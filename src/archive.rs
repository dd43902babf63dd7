//! ZIP input and output.
//!
//! Responsibilities:
//! - Read every entry of an input archive into memory.
//! - Write an [`OutputTree`] as a single deflate-compressed archive.
//! - Suggest a dated default name for the output archive.

use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use chrono::NaiveDate;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::FileOptions};

use crate::organizer::OutputTree;

/// Errors raised while reading or writing archives.
#[derive(Debug)]
pub enum ArchiveError {
    /// The bytes are not a readable ZIP archive.
    Open(String),
    /// An entry could not be decompressed.
    ReadEntry { entry: String, reason: String },
    /// The output archive could not be produced.
    Write(String),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::Open(reason) => write!(f, "Failed to open ZIP archive: {}", reason),
            ArchiveError::ReadEntry { entry, reason } => {
                write!(f, "Failed to read {} from ZIP archive: {}", entry, reason)
            }
            ArchiveError::Write(reason) => write!(f, "Failed to write ZIP archive: {}", reason),
        }
    }
}

impl std::error::Error for ArchiveError {}

/// One entry of an input archive, fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the entry inside the archive, `/`-delimited.
    pub path: String,
    pub is_dir: bool,
    /// Entry contents; empty for directories.
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    /// Final path segment, the name notes use to refer to this entry.
    pub fn file_name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }
}

/// Reads every entry of the archive held in `bytes`.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ArchiveError::Open(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| ArchiveError::ReadEntry {
                entry: format!("entry #{}", index),
                reason: e.to_string(),
            })?;

        let path = file.name().to_string();
        let is_dir = file.is_dir();
        let mut contents = Vec::new();
        if !is_dir {
            file.read_to_end(&mut contents)
                .map_err(|e| ArchiveError::ReadEntry {
                    entry: path.clone(),
                    reason: e.to_string(),
                })?;
        }

        entries.push(ArchiveEntry {
            path,
            is_dir,
            bytes: contents,
        });
    }

    Ok(entries)
}

/// Writes `tree` into `writer` as a ZIP archive and returns the writer.
///
/// Entries are written in path order with deflate at `compression_level`.
pub fn write_archive<W: Write + Seek>(
    tree: &OutputTree<'_>,
    writer: W,
    compression_level: i64,
) -> Result<W, ArchiveError> {
    let mut zip = ZipWriter::new(writer);
    let options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(compression_level));

    for (path, payload) in tree.iter() {
        zip.start_file(path, options)
            .map_err(|e| ArchiveError::Write(format!("{}: {}", path, e)))?;
        zip.write_all(payload.as_bytes())
            .map_err(|e| ArchiveError::Write(format!("{}: {}", path, e)))?;
    }

    zip.finish().map_err(|e| ArchiveError::Write(e.to_string()))
}

/// Writes `tree` to an archive file at `output`, creating parent folders.
pub fn write_archive_to_path(
    tree: &OutputTree<'_>,
    output: &Path,
    compression_level: i64,
) -> Result<(), ArchiveError> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            ArchiveError::Write(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }

    let file = File::create(output)
        .map_err(|e| ArchiveError::Write(format!("cannot create {}: {}", output.display(), e)))?;
    write_archive(tree, file, compression_level)?;
    Ok(())
}

/// Default output file name for a run on `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use notetidy::archive::default_archive_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(default_archive_name(date), "notable-notes-organized-2024-03-09.zip");
/// ```
pub fn default_archive_name(date: NaiveDate) -> String {
    format!("notable-notes-organized-{}.zip", date.format("%Y-%m-%d"))
}

/// True when `bytes` start with a ZIP local-file or empty-archive signature.
pub fn looks_like_zip(bytes: &[u8]) -> bool {
    infer::archive::is_zip(bytes)
}
