use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ResourceInfo;
use crate::fs_util;
use crate::kind::ResourceKind;
use crate::layout::{
    self, CUSTOM_CHECKER, NUMBERED_TEST_ANS_REGEX, NUMBERED_TEST_IN_REGEX,
    PROBLEM_CHECKERS, PROBLEM_CHECKER_FILE_REGEX, PROBLEM_DESCRIPTION_FILE_REGEX,
    PROBLEM_FORMAT, PROBLEM_SOLUTION_FILE_REGEX, PROBLEM_TEST_FILE_REGEX, PUBLIC_FILES_DIRECTORY,
    SECURITY_FILENAME, SINGLE_TEST_ANS_REGEX, SINGLE_TEST_IN_REGEX,
};
use crate::report::ValidationReport;
use crate::security::AccessRight;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Problem {
    #[serde(flatten)]
    pub info: ResourceInfo,
    pub authors: Vec<String>,
    /// Seconds.
    pub time_limit: f64,
    /// Megabytes.
    pub memory_limit: i32,
    pub origin: String,
    pub checker: String,
    pub test_weights: Vec<i32>,
}

impl Default for Problem {
    fn default() -> Self {
        Self {
            info: ResourceInfo::new(PROBLEM_FORMAT),
            authors: Vec::new(),
            time_limit: 0.0,
            memory_limit: 0,
            origin: String::new(),
            checker: PROBLEM_CHECKERS[0].to_string(),
            test_weights: Vec::new(),
        }
    }
}

fn count_matches(files: &[String], pattern: &Regex) -> usize {
    files.iter().filter(|name| pattern.is_match(name)).count()
}

/// Numeric suffixes `NN` of every `test.NN.<ext>` file, sorted.
fn numbered_indices(files: &[String], pattern: &Regex) -> Vec<u32> {
    let mut indices = files
        .iter()
        .filter_map(|name| pattern.captures(name))
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .collect::<Vec<_>>();
    indices.sort_unstable();
    indices
}

impl Problem {
    /// `parent_started` tells whether the enclosing contest is running or over.
    pub(super) fn files_list(&self, access: AccessRight, parent_started: bool) -> Vec<PathBuf> {
        let descriptor = ResourceKind::Problem.descriptor_filename();
        let directory = &self.info.directory;

        if access.includes(AccessRight::ViewFull) {
            fs_util::matching_entries(directory, |name| {
                PROBLEM_DESCRIPTION_FILE_REGEX.is_match(name)
                    || PROBLEM_TEST_FILE_REGEX.is_match(name)
                    || PROBLEM_CHECKER_FILE_REGEX.is_match(name)
                    || PROBLEM_SOLUTION_FILE_REGEX.is_match(name)
                    || name == SECURITY_FILENAME
                    || layout::is_attachment_directory(name)
                    || name == descriptor
            })
        } else if access.includes(AccessRight::View) {
            fs_util::matching_entries(directory, |name| {
                let public = parent_started
                    && (PROBLEM_DESCRIPTION_FILE_REGEX.is_match(name)
                        || name == PUBLIC_FILES_DIRECTORY);
                public || name == descriptor
            })
        } else {
            Vec::new()
        }
    }

    /// Checks the statement, checker and test files present next to the descriptor.
    pub(super) fn validate_files(&self, files: &[String]) -> ValidationReport {
        let mut report = ValidationReport::new();

        match count_matches(files, &PROBLEM_DESCRIPTION_FILE_REGEX) {
            0 => report.add_error("file_description", "description file is missing"),
            1 => {}
            _ => report.add_error("file_description", "multiple description files"),
        }

        if self.checker == CUSTOM_CHECKER {
            match count_matches(files, &PROBLEM_CHECKER_FILE_REGEX) {
                0 => report.add_error("file_checker", "checker file is missing"),
                1 => {}
                _ => report.add_error("file_checker", "multiple checker files"),
            }
        }

        let single_in = count_matches(files, &SINGLE_TEST_IN_REGEX) > 0;
        let single_ans = count_matches(files, &SINGLE_TEST_ANS_REGEX) > 0;
        let numbered_in = numbered_indices(files, &NUMBERED_TEST_IN_REGEX);
        let numbered_ans = numbered_indices(files, &NUMBERED_TEST_ANS_REGEX);

        let single = single_in && single_ans;
        let numbered = !numbered_in.is_empty() && !numbered_ans.is_empty();

        let mut tests_valid = true;
        if single == numbered {
            tests_valid = false;
            report.add_error("file_tests", "tests files are missing");
        }

        if numbered {
            let contiguous = numbered_in.len() == numbered_ans.len()
                && numbered_in
                    .iter()
                    .zip(&numbered_ans)
                    .enumerate()
                    .all(|(i, (t_in, t_ans))| *t_in as usize == i && *t_ans as usize == i);
            if !contiguous {
                tests_valid = false;
                report.add_error(
                    "file_tests",
                    "some test.xx.in or test.xx.ans file is missing",
                );
            }
        }

        if numbered && tests_valid && numbered_in.len() != self.test_weights.len() {
            report.add_error("test_weights", "test files and test weights mismatch");
        }

        report
    }
}
