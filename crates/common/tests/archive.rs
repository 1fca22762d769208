//! Integration tests for downloads, archive merging and zip import

mod common;

use std::fs;
use std::io::{Cursor, Write};

use ::common::archive::ArchiveBuilder;
use ::common::security::AccessRight;
use zip::write::FileOptions;

use common::{setup_contest, zip_names, zip_text};

#[test]
fn test_full_download_of_series() {
    let repo = setup_contest(-60);
    let download = repo.admin("s1").download().unwrap();
    assert_eq!(download.filename, "s1.zip");

    let names = zip_names(&download.bytes);
    for expected in [
        "s1/series.json",
        "s1/_security.json",
        "s1/_files/",
        "s1/c1/contest.json",
        "s1/c1/p1/problem.json",
        "s1/c1/p1/checker.cpp",
        "s1/c1/p1/test.01.ans",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {}", expected);
    }

    let contest: serde_json::Value =
        serde_json::from_str(&zip_text(&download.bytes, "s1/c1/contest.json")).unwrap();
    assert_eq!(contest["notes"], "judges only");
}

#[test]
fn test_viewer_download_before_start() {
    let repo = setup_contest(-60);
    repo.grant("s1", "viewer", AccessRight::View);
    repo.write_file("s1/_files/secret.txt", "secret");

    let download = repo.node("s1", "viewer").download().unwrap();
    let names = zip_names(&download.bytes);
    assert_eq!(
        names,
        vec!["s1/_public_files/", "s1/c1/contest.json", "s1/series.json"]
    );

    let contest: serde_json::Value =
        serde_json::from_str(&zip_text(&download.bytes, "s1/c1/contest.json")).unwrap();
    assert!(contest.get("notes").is_none());
    assert!(contest.get("problem_order").is_none());
}

#[test]
fn test_viewer_download_after_start() {
    let repo = setup_contest(10);
    repo.grant("s1", "viewer", AccessRight::View);

    let download = repo.node("s1/c1", "viewer").download().unwrap();
    let names = zip_names(&download.bytes);
    assert_eq!(
        names,
        vec![
            "c1/_public_files/",
            "c1/contest.json",
            "c1/p1/_public_files/",
            "c1/p1/description.md",
            "c1/p1/problem.json",
        ]
    );
}

#[test]
fn test_hidden_children_are_not_merged() {
    let repo = setup_contest(10);
    repo.admin("").add_resource("s2").unwrap();
    repo.grant("s1/c1", "judge", AccessRight::ViewFull);

    let children = repo.node("", "judge").load_child_resources();
    assert!(children.is_empty());

    let download = repo.node("s1/c1", "judge").download().unwrap();
    assert!(zip_names(&download.bytes).contains(&"c1/p1/test.00.in".to_string()));

    let report = repo.node("s1", "judge").download().unwrap_err();
    assert!(report.has_error("access"));
}

#[test]
fn test_problem_file_download() {
    let repo = setup_contest(10);
    repo.grant("s1", "viewer", AccessRight::View);

    let download = repo.node("s1/c1/p1/description.md", "viewer").download().unwrap();
    assert_eq!(download.filename, "description.md");
    assert_eq!(download.bytes, b"Add two numbers.");

    let report = repo.node("s1/c1/p1/test.00.in", "viewer").download().unwrap_err();
    assert!(report.has_error("access"));

    let download = repo.admin("s1/c1/p1/test.00.in").download().unwrap();
    assert_eq!(download.bytes, b"1 2");
}

#[test]
fn test_system_file_download() {
    let repo = setup_contest(10);
    repo.grant("s1", "viewer", AccessRight::View);

    let report = repo.node("s1/_security.json", "viewer").download().unwrap_err();
    assert!(report.has_error("access"));
    assert!(repo.admin("s1/_security.json").download().is_ok());

    let download = repo.node("s1/c1/contest.json", "viewer").download().unwrap();
    let contest: serde_json::Value = serde_json::from_slice(&download.bytes).unwrap();
    assert!(contest.get("notes").is_none());
    assert_eq!(contest["problem_order"], serde_json::json!(["p1"]));
}

#[test]
fn test_attachment_download() {
    let repo = setup_contest(10);
    repo.grant("s1", "viewer", AccessRight::View);
    repo.write_file("s1/_public_files/rules.txt", "be nice");
    repo.write_file("s1/_public_files/docs/faq.txt", "faq");
    repo.write_file("s1/_files/secret.txt", "secret");

    let download = repo.node("s1/_public_files", "viewer").download().unwrap();
    assert_eq!(download.filename, "_public_files.zip");
    assert_eq!(
        zip_names(&download.bytes),
        vec!["_public_files/docs/faq.txt", "_public_files/rules.txt"]
    );

    let download = repo.node("s1/_public_files/rules.txt", "viewer").download().unwrap();
    assert_eq!(download.bytes, b"be nice");

    let report = repo.node("s1/_files/secret.txt", "viewer").download().unwrap_err();
    assert!(report.has_error("access"));

    let report = repo.admin("s1/_files/missing.txt").download().unwrap_err();
    assert!(report.has_error("access"));
}

#[test]
fn test_root_is_not_downloadable() {
    let repo = setup_contest(10);
    let report = repo.admin("").download().unwrap_err();
    assert!(report.has_error("download"));
}

#[test]
fn test_merge_law() {
    let repo = setup_contest(10);
    repo.write_file("s1/_files/a.txt", "a");
    repo.write_file("s1/_files/b.txt", "b");

    let mut child = ArchiveBuilder::new();
    child.add_inline("one.txt", "1");
    child.add_inline("two.txt", "2");
    child.add_ref("a.txt", repo.path("s1/_files/a.txt"));

    let mut parent = ArchiveBuilder::new();
    parent.add_inline("root/own.txt", "own");
    parent.add_ref("root/a.txt", repo.path("s1/_files/b.txt"));
    parent.add_ref("root/two.txt", repo.path("s1/_files/b.txt"));
    let before = parent.len();

    parent.merge("root/", child);
    // "root/a.txt" is replaced by the child's ref; "root/two.txt" now
    // exists as both inline and ref
    assert_eq!(parent.len(), before + 3 - 1);

    let bytes = parent.serialize().unwrap();
    assert_eq!(
        zip_names(&bytes),
        vec!["root/a.txt", "root/one.txt", "root/own.txt", "root/two.txt"]
    );
    assert_eq!(zip_text(&bytes, "root/two.txt"), "2");
    assert_eq!(zip_text(&bytes, "root/a.txt"), "a");
}

#[test]
fn test_import_round_trip() {
    let repo = setup_contest(10);
    let download = repo.admin("s1/c1").download().unwrap();

    repo.admin("s1/c1").delete().unwrap();
    assert!(!repo.path("s1/c1").exists());

    repo.admin("s1").add_zip(Cursor::new(download.bytes)).unwrap();
    assert!(repo.path("s1/c1/p1/test.01.ans").is_file());
    assert!(repo.path("s1/c1/_files").is_dir());
    repo.admin("s1/c1").validate_resource().unwrap();
}

#[test]
fn test_import_replaces_existing_child() {
    let repo = setup_contest(10);
    let download = repo.admin("s1/c1").download().unwrap();
    repo.write_file("s1/c1/_files/stale.txt", "stale");

    repo.admin("s1").add_zip(Cursor::new(download.bytes)).unwrap();
    assert!(!repo.path("s1/c1/_files/stale.txt").exists());
}

#[test]
fn test_invalid_import_leaves_tree_untouched() {
    let repo = setup_contest(10);
    let download = repo.admin("s1/c1").download().unwrap();
    fs::remove_file(repo.path("s1/c1/p1/test.01.ans")).unwrap();
    let broken = repo.admin("s1/c1").download().unwrap();

    let report = repo.admin("s1").add_zip(Cursor::new(broken.bytes)).unwrap_err();
    assert!(report.has_error("child_0.file_tests"), "{}", report);
    assert!(repo.path("s1/c1/p1/test.00.ans").is_file());

    repo.admin("s1").add_zip(Cursor::new(download.bytes)).unwrap();
    assert!(repo.path("s1/c1/p1/test.01.ans").is_file());
}

#[test]
fn test_import_rejections() {
    let repo = setup_contest(10);
    repo.grant("s1", "viewer", AccessRight::View);

    let report = repo.admin("s1").add_zip(Cursor::new(b"not a zip".to_vec())).unwrap_err();
    assert!(report.has_error("zip"));

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for name in ["c2/contest.json", "c3/contest.json"] {
        writer.start_file(name, FileOptions::default()).unwrap();
        writer.write_all(b"{}").unwrap();
    }
    let two_roots = writer.finish().unwrap().into_inner();
    let report = repo.admin("s1").add_zip(Cursor::new(two_roots)).unwrap_err();
    assert!(report.has_error("root"));

    let problem = repo.admin("s1/c1/p1").download().unwrap();
    let report = repo.admin("s1").add_zip(Cursor::new(problem.bytes.clone())).unwrap_err();
    assert!(report.has_error("json"));

    let report = repo.admin("s1/c1/p1").add_zip(Cursor::new(problem.bytes.clone())).unwrap_err();
    assert!(report.has_error("zip"));

    let report = repo.node("s1", "viewer").add_zip(Cursor::new(problem.bytes)).unwrap_err();
    assert!(report.has_error("access"));
}
