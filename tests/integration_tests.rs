/// Integration tests for notetidy
///
/// These tests drive the command-line entry point end to end: notes and ZIP
/// exports are written to a temporary directory, `run_cli` organizes them, and
/// the produced archive is read back with the `zip` crate.
///
/// Test categories:
/// 1. Tag folders and link stubs
/// 2. Attachments from ZIP exports
/// 3. Dry-run mode and output location
/// 4. Configuration and filtering
/// 5. Edge cases and error scenarios
use notetidy::cli::{Args, run_cli};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::{ZipArchive, ZipWriter, write::FileOptions};

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary workspace with a `notes/` input folder, an `out/` folder for
/// the archive and a configuration file.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("notes")).expect("Failed to create notes dir");
        fs::create_dir(temp_dir.path().join("out")).expect("Failed to create out dir");
        let fixture = TestFixture { temp_dir };
        fixture.write_config("");
        fixture
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn notes_dir(&self) -> PathBuf {
        self.path().join("notes")
    }

    fn output_path(&self) -> PathBuf {
        self.path().join("out").join("organized.zip")
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("notetidy.toml")
    }

    fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config");
    }

    /// Create a file in the notes folder.
    fn create_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let file_path = self.notes_dir().join(name);
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
        file_path
    }

    fn create_note(&self, name: &str, content: &str) -> PathBuf {
        self.create_file(name, content.as_bytes())
    }

    /// Create a ZIP export in the notes folder.
    fn create_zip(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<'_, ()> = FileOptions::default();
        for (entry, content) in entries {
            zip.start_file(*entry, options)
                .expect("Failed to start zip entry");
            zip.write_all(content).expect("Failed to write zip entry");
        }
        let bytes = zip.finish().expect("Failed to finish zip").into_inner();
        self.create_file(name, &bytes)
    }

    fn args(&self) -> Args {
        Args {
            inputs: vec![self.notes_dir()],
            output: Some(self.output_path()),
            config: Some(self.config_path()),
            dry_run: false,
            url_shortcuts: false,
        }
    }

    fn run(&self) -> Result<(), String> {
        run_cli(&self.args())
    }

    /// Read every entry of the produced archive.
    fn read_output(&self) -> BTreeMap<String, Vec<u8>> {
        read_zip(&self.output_path())
    }

    fn read_output_text(&self) -> BTreeMap<String, String> {
        self.read_output()
            .into_iter()
            .map(|(path, bytes)| {
                let text = String::from_utf8(bytes).expect("Entry is not UTF-8");
                (path, text)
            })
            .collect()
    }
}

fn read_zip(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = File::open(path).expect("Failed to open output archive");
    let mut archive = ZipArchive::new(file).expect("Output is not a zip archive");
    let mut entries = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).expect("Failed to read entry");
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).expect("Failed to read entry");
        entries.insert(entry.name().to_string(), bytes);
    }
    entries
}

// ============================================================================
// Tag Folders and Link Stubs
// ============================================================================

#[test]
fn test_two_tags_produce_copy_and_stub() {
    let fixture = TestFixture::new();
    fixture.create_note(
        "note.md",
        "---\ntitle: Quarterly plan\ntags: [work, personal]\n---\nShip the thing.",
    );

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output_text();
    let paths: Vec<&str> = entries.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["personal/note - Link.md", "work/note.md"]);
    assert_eq!(entries["work/note.md"], "Ship the thing.");

    let stub = &entries["personal/note - Link.md"];
    assert!(stub.starts_with("# Link to note.md"));
    assert!(stub.contains("`work/note.md`"));
    assert!(stub.contains("[Open Original File](../work/note.md)"));
    assert!(stub.contains("Ship the thing."));
}

#[test]
fn test_note_without_header_is_untagged() {
    let fixture = TestFixture::new();
    fixture.create_note("note.md", "Just some text\nwith two lines");

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries["untagged/note.md"], "Just some text\nwith two lines");
}

#[test]
fn test_nested_tags_and_unsafe_characters() {
    let fixture = TestFixture::new();
    fixture.create_note(
        "plan.md",
        "---\ntags: [\"projects/2024\", \"what?  now\"]\n---\nbody",
    );

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert!(entries.contains_key("projects/2024/plan.md"));
    let stub = &entries["what- now/plan - Link.md"];
    assert!(stub.contains("[Open Original File](../projects/2024/plan.md)"));
}

#[test]
fn test_many_notes_share_folders() {
    let fixture = TestFixture::new();
    fixture.create_note("a.md", "---\ntags: [work]\n---\nA");
    fixture.create_note("b.md", "---\ntags: [work, ideas]\n---\nB");
    fixture.create_note("c.md", "---\ntags: ideas\n---\nC");

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert_eq!(entries["work/a.md"], "A");
    assert_eq!(entries["work/b.md"], "B");
    assert_eq!(entries["ideas/c.md"], "C");
    assert!(entries.contains_key("ideas/b - Link.md"));
    assert_eq!(entries.len(), 4);
}

// ============================================================================
// Attachments from ZIP Exports
// ============================================================================

#[test]
fn test_zip_export_with_attachment() {
    let fixture = TestFixture::new();
    let png = [0x89u8, b'P', b'N', b'G', 1, 2, 3];
    fixture.create_zip(
        "export.zip",
        &[
            (
                "notes/note.md",
                &b"---\ntags: [design, archive]\nattachments: [diagram.png]\n---\n![d](@attachment/diagram.png)"[..],
            ),
            ("attachments/diagram.png", &png[..]),
        ],
    );

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output();
    assert_eq!(entries["design/diagram.png"], png.to_vec());
    assert_eq!(
        String::from_utf8(entries["design/note.md"].clone()).unwrap(),
        "![d](./diagram.png)"
    );
    assert!(!entries.contains_key("archive/diagram.png"));

    let stub = String::from_utf8(entries["archive/note - Link.md"].clone()).unwrap();
    assert!(stub.contains("![d](../design/diagram.png)"));
}

#[test]
fn test_missing_attachment_is_rewritten_without_file() {
    let fixture = TestFixture::new();
    fixture.create_note(
        "note.md",
        "---\ntags: design\nattachments: diagram.png\n---\nsee @attachment/diagram.png",
    );

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert_eq!(entries["design/note.md"], "see ./diagram.png");
    assert!(!entries.contains_key("design/diagram.png"));
}

#[test]
fn test_loose_attachment_next_to_notes() {
    let fixture = TestFixture::new();
    fixture.create_note(
        "report.md",
        "---\ntags: [reports]\nattachments: [figures.pdf]\n---\n[pdf](@attachment/figures.pdf)",
    );
    fixture.create_file("figures.pdf", b"%PDF-1.4 fake");

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output();
    assert_eq!(entries["reports/figures.pdf"], b"%PDF-1.4 fake".to_vec());
}

#[test]
fn test_mixed_inputs_files_and_archives() {
    let fixture = TestFixture::new();
    let loose = fixture.create_note("loose.md", "---\ntags: [inbox]\n---\nloose");
    let archive = fixture.create_zip(
        "export.zip",
        &[("export/zipped.md", &b"---\ntags: [inbox]\n---\nzipped"[..])],
    );

    let mut args = fixture.args();
    args.inputs = vec![loose, archive];
    run_cli(&args).expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert_eq!(entries["inbox/loose.md"], "loose");
    assert_eq!(entries["inbox/zipped.md"], "zipped");
}

// ============================================================================
// Dry Run and Output Location
// ============================================================================

#[test]
fn test_dry_run_writes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_note("note.md", "---\ntags: [work]\n---\nbody");

    let mut args = fixture.args();
    args.dry_run = true;
    run_cli(&args).expect("Dry run should succeed");

    assert!(!fixture.output_path().exists());
}

#[test]
fn test_output_directory_gets_default_name() {
    let fixture = TestFixture::new();
    fixture.create_note("note.md", "---\ntags: [work]\n---\nbody");

    let mut args = fixture.args();
    args.output = Some(fixture.path().join("out"));
    run_cli(&args).expect("Run should succeed");

    let written: Vec<PathBuf> = fs::read_dir(fixture.path().join("out"))
        .expect("Failed to read out dir")
        .flatten()
        .map(|entry| entry.path())
        .collect();
    assert_eq!(written.len(), 1);
    let name = written[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("notable-notes-organized-"));
    assert!(name.ends_with(".zip"));
    assert!(read_zip(&written[0]).contains_key("work/note.md"));
}

#[test]
fn test_second_run_ignores_previous_output() {
    let fixture = TestFixture::new();
    fixture.create_note("note.md", "---\ntags: [work, personal]\n---\nbody");

    let mut args = fixture.args();
    args.output = Some(fixture.notes_dir().join("organized.zip"));
    run_cli(&args).expect("First run should succeed");
    let first = read_zip(&fixture.notes_dir().join("organized.zip"));

    run_cli(&args).expect("Second run should succeed");
    let second = read_zip(&fixture.notes_dir().join("organized.zip"));

    assert_eq!(first, second);
    let paths: Vec<&str> = second.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["personal/note - Link.md", "work/note.md"]);
}

#[test]
fn test_loose_office_document_is_copied_as_attachment() {
    let fixture = TestFixture::new();
    fixture.create_note(
        "note.md",
        "---\ntags: [reports]\nattachments: [summary.docx]\n---\nsee @attachment/summary.docx",
    );
    let docx = fixture.create_zip(
        "summary.docx",
        &[
            ("[Content_Types].xml", &b"<Types/>"[..]),
            ("word/document.xml", &b"<w:document/>"[..]),
        ],
    );

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output();
    assert_eq!(
        entries["reports/summary.docx"],
        fs::read(&docx).expect("Failed to read docx")
    );
    assert!(!entries.contains_key("reports/document.xml"));
}

#[test]
fn test_url_shortcuts_flag() {
    let fixture = TestFixture::new();
    fixture.create_note("note.md", "---\ntags: [work, personal]\n---\nbody");

    let mut args = fixture.args();
    args.url_shortcuts = true;
    run_cli(&args).expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert_eq!(
        entries["personal/note - Link.url"],
        "[InternetShortcut]\r\nURL=../work/note.md\r\n"
    );
}

// ============================================================================
// Configuration and Filtering
// ============================================================================

#[test]
fn test_config_excludes_files() {
    let fixture = TestFixture::new();
    fixture.write_config("[filters.exclude]\nfilenames = [\"draft.md\"]\n");
    fixture.create_note("draft.md", "---\ntags: [work]\n---\nnot yet");
    fixture.create_note("final.md", "---\ntags: [work]\n---\ndone");

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert!(entries.contains_key("work/final.md"));
    assert!(!entries.contains_key("work/draft.md"));
}

#[test]
fn test_config_shortcuts_and_preview_length() {
    let fixture = TestFixture::new();
    fixture.write_config("[organize]\nemit_url_shortcuts = true\npreview_chars = 4\n");
    fixture.create_note("note.md", "---\ntags: [a, b]\n---\nabcdefgh");

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert!(entries.contains_key("b/note - Link.url"));
    let stub = &entries["b/note - Link.md"];
    assert!(stub.contains("abcd\n\n... (content truncated"));
    assert!(!stub.contains("abcde"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let fixture = TestFixture::new();
    fixture.write_config("[organize]\ncompression_level = 42\n");
    fixture.create_note("note.md", "text");

    let error = fixture.run().expect_err("Run should fail");

    assert!(error.contains("Error loading configuration"));
    assert!(!fixture.output_path().exists());
}

#[test]
fn test_missing_config_file_is_rejected() {
    let fixture = TestFixture::new();
    fixture.create_note("note.md", "text");

    let mut args = fixture.args();
    args.config = Some(fixture.path().join("absent.toml"));

    assert!(run_cli(&args).is_err());
}

// ============================================================================
// Edge Cases and Error Scenarios
// ============================================================================

#[test]
fn test_no_notes_is_an_error() {
    let fixture = TestFixture::new();

    let error = fixture.run().expect_err("Run should fail");

    assert!(error.contains("No markdown files found"));
    assert!(!fixture.output_path().exists());
}

#[test]
fn test_archive_without_notes_is_an_error() {
    let fixture = TestFixture::new();
    fixture.create_note("fine.md", "text");
    fixture.create_zip("junk.zip", &[("data.bin", &b"\x00\x01"[..])]);

    let error = fixture.run().expect_err("Run should fail");

    assert!(error.contains("junk.zip"));
    assert!(error.contains("No markdown files found in ZIP archive"));
    assert!(!fixture.output_path().exists());
}

#[test]
fn test_malformed_note_is_skipped() {
    let fixture = TestFixture::new();
    fixture.create_note("broken.md", "---\ntags: [work]\nno closing line");
    fixture.create_note("good.md", "---\ntags: [work]\n---\nfine");

    fixture.run().expect("Run should succeed");

    let entries = fixture.read_output_text();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries["work/good.md"], "fine");
}

#[test]
fn test_all_notes_malformed_is_an_error() {
    let fixture = TestFixture::new();
    fixture.create_note("broken.md", "---\ntags: [work]\nno closing line");

    assert!(fixture.run().is_err());
    assert!(!fixture.output_path().exists());
}

#[test]
fn test_missing_input_path_is_an_error() {
    let fixture = TestFixture::new();

    let mut args = fixture.args();
    args.inputs = vec![fixture.path().join("nowhere")];

    assert!(run_cli(&args).is_err());
}
