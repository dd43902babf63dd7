//! Attachment blobs found alongside notes.
//!
//! Attachments are keyed by their bare file name: a note refers to
//! `diagram.png`, never to `export/assets/diagram.png`. The registry owns every
//! blob for the duration of one run; the output tree only borrows them.

use std::collections::HashMap;

/// A binary payload that notes can reference by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentBlob {
    /// Identifier matched against header `attachments` and inline references.
    pub name: String,
    /// Raw bytes, copied verbatim into the output archive.
    pub bytes: Vec<u8>,
}

impl AttachmentBlob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Holds all attachment blobs for one organize run.
#[derive(Debug, Default)]
pub struct AttachmentRegistry {
    blobs: HashMap<String, AttachmentBlob>,
}

impl AttachmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blob, returning the one it replaced if the name was taken.
    ///
    /// The most recently registered blob wins, so an attachment that appears in
    /// two archives resolves to whichever archive was read last.
    pub fn insert(&mut self, blob: AttachmentBlob) -> Option<AttachmentBlob> {
        self.blobs.insert(blob.name.clone(), blob)
    }

    pub fn get(&self, name: &str) -> Option<&AttachmentBlob> {
        self.blobs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blobs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.blobs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Drops every blob, ending their lifetime before the next run.
    pub fn clear(&mut self) {
        self.blobs.clear();
    }
}
