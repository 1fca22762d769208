//! # On-disk layout
//!
//! Every name and pattern the repository recognizes on disk lives here:
//!
//! ```text
//! <series root>/
//!   _security.json
//!   <series-id>/
//!     series.json  _security.json  _files/  _public_files/
//!     <contest-id>/
//!       contest.json  _security.json  _files/  _public_files/
//!       <problem-id>/
//!         problem.json  _security.json  _files/  _public_files/
//!         description.*  checker.*  solution.*  test[.NN].{in,ans}
//! ```
//!
//! Patterns are anchored: a name either matches entirely or not at all.

use std::sync::LazyLock;

use regex::Regex;

/// Extension of every descriptor and grant file.
pub const JSON_FILE_EXTENSION: &str = ".json";
/// Extension appended to downloads that are packaged as archives.
pub const ZIP_FILE_EXTENSION: &str = ".zip";
/// Separator for node paths and archive entries.
pub const PATH_SEPARATOR: &str = "/";

/// Per-directory grant file.
pub const SECURITY_FILENAME: &str = "_security.json";
/// Top-level key of the grant file.
pub const GRANTS_PROP_NAME: &str = "grants";

/// Attachments visible to anyone who can view the resource.
pub const PUBLIC_FILES_DIRECTORY: &str = "_public_files";
/// Attachments visible only with full access.
pub const PRIVATE_FILES_DIRECTORY: &str = "_files";
/// Both attachment directories, in the order they are created.
pub const ATTACHMENT_DIRECTORIES: [&str; 2] = [PUBLIC_FILES_DIRECTORY, PRIVATE_FILES_DIRECTORY];

pub const SERIES_FORMAT: &str = "core-series-1";
pub const CONTEST_FORMAT: &str = "core-contest-1";
pub const PROBLEM_FORMAT: &str = "core-problem-1";

/// Accepted grading styles; the first one is the default.
pub const GRADING_STYLES: [&str; 2] = ["acm", "ioi"];
/// Accepted checker kinds; the first one is the default.
pub const PROBLEM_CHECKERS: [&str; 2] = ["diff", "custom"];
/// Checker kind that requires a `checker.*` file next to the problem.
pub const CUSTOM_CHECKER: &str = "custom";

/// Start time layout, always UTC.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const RESOURCE_ID: &str = r"[a-z0-9][a-z0-9_-]*";
const NEW_DIRECTORY: &str = r"[a-z0-9][a-z0-9_ -]*";
const PROBLEM_TEST_FILE: &str = r"test\.([0-9]{2}\.)?(in|ans)";
const PROBLEM_DESCRIPTION_FILE: &str = r"description.*";
const PROBLEM_CHECKER_FILE: &str = r"checker.*";
const PROBLEM_SOLUTION_FILE: &str = r"solution.*";

fn anchored(patterns: &[&str]) -> Regex {
    let alternatives = patterns
        .iter()
        .map(|p| format!("(?:{})", p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("^(?:{})$", alternatives)).expect("layout patterns are valid regexes")
}

pub static RESOURCE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| anchored(&[RESOURCE_ID]));
pub static NEW_DIRECTORY_REGEX: LazyLock<Regex> = LazyLock::new(|| anchored(&[NEW_DIRECTORY]));

pub static PROBLEM_TEST_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| anchored(&[PROBLEM_TEST_FILE]));
pub static PROBLEM_DESCRIPTION_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| anchored(&[PROBLEM_DESCRIPTION_FILE]));
pub static PROBLEM_CHECKER_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| anchored(&[PROBLEM_CHECKER_FILE]));
pub static PROBLEM_SOLUTION_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| anchored(&[PROBLEM_SOLUTION_FILE]));

/// Any file a problem directory may hold besides the common ones.
pub static PROBLEM_EXTRA_FILES_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    anchored(&[
        PROBLEM_TEST_FILE,
        PROBLEM_DESCRIPTION_FILE,
        PROBLEM_CHECKER_FILE,
        PROBLEM_SOLUTION_FILE,
    ])
});

pub static SINGLE_TEST_IN_REGEX: LazyLock<Regex> = LazyLock::new(|| anchored(&[r"test\.in"]));
pub static SINGLE_TEST_ANS_REGEX: LazyLock<Regex> = LazyLock::new(|| anchored(&[r"test\.ans"]));
pub static NUMBERED_TEST_IN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| anchored(&[r"test\.([0-9]{2})\.in"]));
pub static NUMBERED_TEST_ANS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| anchored(&[r"test\.([0-9]{2})\.ans"]));

pub fn is_resource_id(name: &str) -> bool {
    RESOURCE_ID_REGEX.is_match(name)
}

pub fn is_new_directory_name(name: &str) -> bool {
    NEW_DIRECTORY_REGEX.is_match(name)
}

pub fn is_attachment_directory(name: &str) -> bool {
    ATTACHMENT_DIRECTORIES.contains(&name)
}

pub fn is_problem_extra_file(name: &str) -> bool {
    PROBLEM_EXTRA_FILES_REGEX.is_match(name)
}

/// A plain file name: no separators and no relative components.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
