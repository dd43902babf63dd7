//! notetidy - reorganize tagged markdown notes into a zip archive
//!
//! This library parses notes with a YAML header, places each note in the
//! folder of its first tag, writes link stubs into the folders of its other
//! tags, copies declared attachments alongside, and packs the result into a
//! single ZIP archive. Input filters and organizer options are configured
//! through TOML configuration files.

pub mod archive;
pub mod attachments;
pub mod batch;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod frontmatter;
pub mod input;
pub mod link_rewriter;
pub mod organizer;
pub mod output;
pub mod relative_path;
pub mod sanitize;

pub use attachments::{AttachmentBlob, AttachmentRegistry};
pub use batch::{DocumentError, DocumentOutcome, RunError, RunReport, SourceDocument, run_batch};
pub use config::{CompiledFilters, Config, ConfigError, OrganizeOptions};
pub use file_category::{AttachmentClassifier, Category};
pub use frontmatter::{FrontmatterError, ParsedDocument};
pub use input::{CollectedInputs, InputCollector};
pub use organizer::{
    OrganizeEvent, OrganizeObserver, OrganizerEngine, OutputTree, Payload, Placement, organize,
    organize_with,
};

pub use cli::{Args, run_cli};
