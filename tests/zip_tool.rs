//! End-to-end verification of archives produced by the platform's real
//! `zip` executable. These tests skip on hosts without the tool, the same
//! way fixture-dependent suites skip on a missing golden image.

mod common;

use std::collections::BTreeSet;
use std::fs;

use checkzip::harness::{SAMPLE_NAME, ZipTool, sample_payload, single_file_corpus, tree_corpus};
use checkzip::verify::conformance;
use checkzip::verify::integrity;
use checkzip::{Archive, ExtractError, NamePolicy};
use tempfile::tempdir;

macro_rules! skip_without_zip_tool {
    ($tool:ident) => {
        let $tool = ZipTool::default();
        if !$tool.is_available() {
            eprintln!("zip executable not found; skipping");
            return;
        }
    };
}

#[test]
fn single_file_archive_end_to_end() {
    skip_without_zip_tool!(tool);

    let dir = tempdir().unwrap();
    let expected = single_file_corpus(dir.path()).unwrap();
    tool.create(dir.path(), "testsample.zip", SAMPLE_NAME).unwrap();

    let archive_path = dir.path().join("testsample.zip");
    assert!(archive_path.exists(), "archiver produced no file");

    let data = fs::read(&archive_path).unwrap();
    let archive = Archive::parse(&data, &NamePolicy::Utf8).unwrap();

    // One member, the right name
    assert_eq!(archive.len(), 1);
    let entry = &archive.entries()[0];
    assert_eq!(entry.name, SAMPLE_NAME);

    // Content round-trips and matches both checksums
    let content = archive.extract(entry).unwrap();
    assert_eq!(content, sample_payload());
    assert!(integrity::verify(entry, &content).is_valid());
    assert_eq!(entry.crc32, integrity::crc32(&sample_payload()));

    // 520 repetitive bytes must shrink
    assert_eq!(entry.uncompressed_size, 520);
    assert!(entry.compressed_size < 520, "the sample was not compressed");
    assert!(integrity::was_compressed(entry));

    // The whole suite agrees
    let report = conformance::run(&archive, &expected, &["wrong_sample_test"]);
    assert!(report.is_pass(), "{:?}", report.issues);
}

#[test]
fn directory_tree_name_set_matches_corpus() {
    skip_without_zip_tool!(tool);

    let dir = tempdir().unwrap();
    let expected = tree_corpus(dir.path(), 3, 2).unwrap();
    tool.create_recursive(dir.path(), "tree.zip", SAMPLE_NAME).unwrap();

    let data = fs::read(dir.path().join("tree.zip")).unwrap();
    let archive = Archive::parse(&data, &NamePolicy::Utf8).unwrap();

    // Exact set equality: every directory marker and file path, canonical
    // separators, no extras and no omissions.
    let manifest: BTreeSet<String> =
        archive.entries().iter().map(|e| e.name.clone()).collect();
    assert_eq!(manifest, expected);

    let report = conformance::check_name_set(&archive, &expected);
    assert!(report.is_pass(), "{:?}", report.issues);
}

#[test]
fn directory_tree_members_verify() {
    skip_without_zip_tool!(tool);

    let dir = tempdir().unwrap();
    let _expected = tree_corpus(dir.path(), 3, 2).unwrap();
    tool.create_recursive(dir.path(), "tree.zip", SAMPLE_NAME).unwrap();

    let data = fs::read(dir.path().join("tree.zip")).unwrap();
    let archive = Archive::parse(&data, &NamePolicy::Utf8).unwrap();

    let report = conformance::check_integrity(&archive);
    assert!(report.is_pass(), "{:?}", report.issues);
    assert_eq!(report.verified_entries, 14);

    // Spot-check one member against the known payload
    let entry = archive
        .entries()
        .iter()
        .find(|e| !e.is_directory)
        .unwrap();
    let content = archive.extract(entry).unwrap();
    assert_eq!(content, sample_payload());
    assert_eq!(integrity::crc32(&content), entry.crc32);
}

#[test]
fn absent_member_fails_without_side_effects() {
    skip_without_zip_tool!(tool);

    let dir = tempdir().unwrap();
    single_file_corpus(dir.path()).unwrap();
    tool.create(dir.path(), "testsample.zip", SAMPLE_NAME).unwrap();

    let data = fs::read(dir.path().join("testsample.zip")).unwrap();
    let archive = Archive::parse(&data, &NamePolicy::Utf8).unwrap();

    let err = archive.extract_by_name("wrong_sample_test").unwrap_err();
    assert!(matches!(err, ExtractError::NotFound(_)));

    // The failed lookup must not have created anything on disk
    assert!(!dir.path().join("wrong_sample_test").exists());
}

#[test]
fn real_archive_parses_idempotently() {
    skip_without_zip_tool!(tool);

    let dir = tempdir().unwrap();
    tree_corpus(dir.path(), 3, 2).unwrap();
    tool.create_recursive(dir.path(), "tree.zip", SAMPLE_NAME).unwrap();

    let data = fs::read(dir.path().join("tree.zip")).unwrap();
    let first = Archive::parse(&data, &NamePolicy::Utf8).unwrap();
    let second = Archive::parse(&data, &NamePolicy::Utf8).unwrap();
    assert_eq!(first.entries(), second.entries());
}

#[test]
fn external_tool_reports_nonzero_exit() {
    skip_without_zip_tool!(tool);

    let dir = tempdir().unwrap();
    // No such member on disk: the archiver exits non-zero and the error
    // carries the status instead of being swallowed.
    let err = tool.create(dir.path(), "out.zip", "does_not_exist").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("exited with"), "unexpected error: {msg}");
}
