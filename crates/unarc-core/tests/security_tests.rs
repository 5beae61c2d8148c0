//! Security tests for path traversal and unsupported entry types.
//!
//! Every malicious archive must abort extraction with an error naming the
//! offending entry, and nothing may be written outside of the destination.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;
use std::path::PathBuf;

use tempfile::TempDir;
use unarc_core::ArchiveError;
use unarc_core::ExtractOptions;
use unarc_core::extract;
use unarc_core::test_utils::TarTestBuilder;
use unarc_core::test_utils::ZipTestBuilder;

/// Temp root plus a `dest` directory inside it, so escapes land in the root.
fn create_test_dest() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("failed to create temp dir");
    let dest = temp.path().join("dest");
    std::fs::create_dir(&dest).expect("failed to create dest");
    (temp, dest)
}

fn assert_tainted(result: unarc_core::Result<unarc_core::ExtractionReport>, expected: &str) {
    match result {
        Err(ArchiveError::TaintedPath { name }) => assert_eq!(name, expected),
        other => panic!("expected TaintedPath for {expected}, got {other:?}"),
    }
}

#[test]
fn test_tar_parent_traversal_rejected() {
    let (temp, dest) = create_test_dest();
    let data = TarTestBuilder::new()
        .add_raw_file("../escape.txt", b"evil")
        .build();

    let result = extract(Cursor::new(data), &dest, &ExtractOptions::new("tar"));

    assert_tainted(result, "../escape.txt");
    assert!(!temp.path().join("escape.txt").exists());
}

#[test]
fn test_tar_nested_traversal_rejected() {
    let (temp, dest) = create_test_dest();
    let data = TarTestBuilder::new()
        .add_raw_file("a/b/../../../escape.txt", b"evil")
        .build();

    let result = extract(Cursor::new(data), &dest, &ExtractOptions::new("tar"));

    assert_tainted(result, "a/b/../../../escape.txt");
    assert!(!temp.path().join("escape.txt").exists());
}

#[test]
fn test_tar_inner_parent_that_stays_inside_is_allowed() {
    let (_temp, dest) = create_test_dest();
    let data = TarTestBuilder::new()
        .add_raw_file("a/../inside.txt", b"fine")
        .build();

    extract(Cursor::new(data), &dest, &ExtractOptions::new("tar")).unwrap();
    assert!(dest.join("inside.txt").is_file());
}

#[test]
fn test_zip_parent_traversal_rejected() {
    let (temp, dest) = create_test_dest();
    let data = ZipTestBuilder::new()
        .add_file("../escape.txt", b"evil")
        .build();

    let result = extract(Cursor::new(data), &dest, &ExtractOptions::new("zip"));

    assert_tainted(result, "../escape.txt");
    assert!(!temp.path().join("escape.txt").exists());
}

#[test]
#[cfg(unix)]
fn test_absolute_path_rejected() {
    let (_temp, dest) = create_test_dest();
    let data = TarTestBuilder::new()
        .add_raw_file("/tmp/unarc-absolute.txt", b"evil")
        .build();

    let result = extract(Cursor::new(data), &dest, &ExtractOptions::new("tar"));

    assert_tainted(result, "/tmp/unarc-absolute.txt");
}

#[test]
fn test_sibling_with_common_prefix_rejected() {
    let (temp, dest) = create_test_dest();
    let data = TarTestBuilder::new()
        .add_raw_file("../dest-evil/payload.txt", b"evil")
        .build();

    let result = extract(Cursor::new(data), &dest, &ExtractOptions::new("tar"));

    assert_tainted(result, "../dest-evil/payload.txt");
    assert!(!temp.path().join("dest-evil").exists());
}

#[test]
fn test_entries_before_violation_remain() {
    let (_temp, dest) = create_test_dest();
    let data = TarTestBuilder::new()
        .add_file("first.txt", b"1")
        .add_raw_file("../escape.txt", b"evil")
        .add_file("never.txt", b"2")
        .build();

    let result = extract(Cursor::new(data), &dest, &ExtractOptions::new("tar"));

    assert!(result.unwrap_err().is_security_violation());
    assert!(dest.join("first.txt").is_file());
    assert!(!dest.join("never.txt").exists());
}

#[test]
fn test_tar_symlink_rejected() {
    let (temp, dest) = create_test_dest();
    let data = TarTestBuilder::new()
        .add_symlink("link", "../../etc/passwd")
        .build();

    let err = extract(Cursor::new(data), &dest, &ExtractOptions::new("tar")).unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::UnsupportedEntryType { ref name, ref type_tag }
            if name == "link" && type_tag == "symlink"
    ));
    assert!(err.to_string().contains("link"));
    assert!(!dest.join("link").exists());
    assert!(!temp.path().join("link").exists());
}

#[test]
fn test_tar_hardlink_rejected() {
    let (_temp, dest) = create_test_dest();
    let data = TarTestBuilder::new()
        .add_file("target.txt", b"data")
        .add_hardlink("alias", "target.txt")
        .build();

    let err = extract(Cursor::new(data), &dest, &ExtractOptions::new("tar")).unwrap_err();

    assert_eq!(err.entry_name(), Some("alias"));
    assert!(matches!(
        err,
        ArchiveError::UnsupportedEntryType { ref type_tag, .. } if type_tag == "hardlink"
    ));
    assert!(!dest.join("alias").exists());
}

#[test]
fn test_tar_fifo_rejected() {
    let (_temp, dest) = create_test_dest();
    let data = TarTestBuilder::new().add_fifo("pipe").build();

    let err = extract(Cursor::new(data), &dest, &ExtractOptions::new("tar")).unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::UnsupportedEntryType { ref name, ref type_tag }
            if name == "pipe" && type_tag == "fifo"
    ));
}

#[test]
#[cfg(unix)]
fn test_zip_symlink_rejected() {
    let (_temp, dest) = create_test_dest();
    let data = ZipTestBuilder::new()
        .add_symlink("link", "/etc/passwd")
        .build();

    let err = extract(Cursor::new(data), &dest, &ExtractOptions::new("zip")).unwrap_err();

    assert_eq!(err.entry_name(), Some("link"));
    assert!(matches!(err, ArchiveError::UnsupportedEntryType { .. }));
    assert!(!dest.join("link").exists());
}

#[test]
fn test_destination_that_is_a_file_rejected() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("file");
    std::fs::write(&not_a_dir, b"x").unwrap();
    let data = TarTestBuilder::new().add_file("a.txt", b"a").build();

    let result = extract(Cursor::new(data), &not_a_dir, &ExtractOptions::new("tar"));

    assert!(matches!(result, Err(ArchiveError::Filesystem { .. })));
}
