//! Shared fixtures for repository integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use chrono::{Duration, Utc};
use common::browse::Node;
use common::layout::DATETIME_FORMAT;
use common::repository::Repository;
use common::security::{AccessRight, GrantFile};
use tempfile::TempDir;

/// Login holding `VIEW_FULL` on the series root of every fixture.
pub const ADMIN: &str = "admin";

pub struct TestRepo {
    pub repository: Repository,
    _temp: TempDir,
}

/// An initialized, empty repository administered by [`ADMIN`].
pub fn setup_repo() -> TestRepo {
    let temp = TempDir::new().unwrap();
    let repository = Repository::new(temp.path(), "series");
    repository.init(Some(ADMIN)).unwrap();
    TestRepo {
        repository,
        _temp: temp,
    }
}

/// `s1/c1/p1` where the contest started `started_minutes_ago` minutes ago
/// (negative: starts in the future), runs for two hours and validates cleanly.
pub fn setup_contest(started_minutes_ago: i64) -> TestRepo {
    let repo = setup_repo();
    repo.create("", "s1");
    repo.create("s1", "c1");
    repo.create("s1/c1", "p1");

    let start_time = minutes_from_now(-started_minutes_ago);
    repo.set(
        "s1/c1",
        &[
            ("title", "Qualification"),
            ("start_time", start_time.as_str()),
            ("duration", "120"),
            ("problem_order", "p1"),
            ("problem_scores", "100"),
            ("notes", "judges only"),
        ],
    );
    repo.set(
        "s1/c1/p1",
        &[
            ("title", "Sum"),
            ("checker", "custom"),
            ("test_weights", "1, 2"),
        ],
    );
    for (name, contents) in [
        ("description.md", "Add two numbers."),
        ("checker.cpp", "int main() {}"),
        ("test.00.in", "1 2"),
        ("test.00.ans", "3"),
        ("test.01.in", "2 2"),
        ("test.01.ans", "4"),
    ] {
        repo.write_file(&format!("s1/c1/p1/{}", name), contents);
    }
    repo
}

impl TestRepo {
    pub fn root(&self) -> PathBuf {
        self.repository.series_root()
    }

    pub fn path(&self, path: &str) -> PathBuf {
        self.root().join(path)
    }

    pub fn node(&self, path: &str, login: &str) -> Node {
        self.repository.node(path, login)
    }

    pub fn admin(&self, path: &str) -> Node {
        self.node(path, ADMIN)
    }

    /// Creates `<parent>/<id>` as the administrator.
    pub fn create(&self, parent: &str, id: &str) {
        self.admin(parent).add_resource(id).unwrap();
    }

    pub fn grant(&self, path: &str, login: &str, right: AccessRight) {
        let directory = self.path(path);
        let mut grants = GrantFile::read(&directory).unwrap();
        grants.set(login, right);
        grants.write(&directory).unwrap();
    }

    pub fn write_file(&self, path: &str, contents: &str) {
        let path = self.path(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read_file(&self, path: &str) -> String {
        fs::read_to_string(self.path(path)).unwrap()
    }

    /// Unconditionally sets descriptor fields as the administrator.
    pub fn set(&self, path: &str, pairs: &[(&str, &str)]) {
        let mut node = self.admin(path);
        node.update_resource(&BTreeMap::new(), &values(pairs)).unwrap();
    }
}

pub fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub fn minutes_from_now(minutes: i64) -> String {
    (Utc::now() + Duration::minutes(minutes))
        .format(DATETIME_FORMAT)
        .to_string()
}

/// Sorted entry names of a zip archive.
pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names = archive.file_names().map(str::to_string).collect::<Vec<_>>();
    names.sort();
    names
}

pub fn zip_text(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    text
}
