use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Resource, ResourceInfo, View};
use crate::fs_util;
use crate::kind::ResourceKind;
use crate::layout::{
    self, CONTEST_FORMAT, DATETIME_FORMAT, GRADING_STYLES, PUBLIC_FILES_DIRECTORY,
    SECURITY_FILENAME,
};
use crate::report::ValidationReport;
use crate::security::AccessRight;

/// Where a contest stands relative to its time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContestState {
    NotStarted,
    Started,
    Ended,
}

impl ContestState {
    /// Descriptor view shown to non-owners in this state.
    pub fn view(&self) -> View {
        match self {
            ContestState::NotStarted => View::BeforeStart,
            ContestState::Started => View::AfterStart,
            ContestState::Ended => View::AfterEnd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contest {
    #[serde(flatten)]
    pub info: ResourceInfo,
    /// UTC, `YYYY-MM-DDTHH:MM:SSZ`.
    pub start_time: String,
    /// Minutes.
    pub duration: i32,
    pub grading_style: String,
    pub problem_scores: Vec<i32>,
    pub problem_order: Vec<String>,
}

impl Default for Contest {
    fn default() -> Self {
        Self {
            info: ResourceInfo::new(CONTEST_FORMAT),
            start_time: String::new(),
            duration: 0,
            grading_style: GRADING_STYLES[0].to_string(),
            problem_scores: Vec::new(),
            problem_order: Vec::new(),
        }
    }
}

pub fn parse_start_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

impl Contest {
    pub fn start(&self) -> Option<DateTime<Utc>> {
        parse_start_time(&self.start_time)
    }

    /// A contest without a readable start time never starts.
    pub fn state_at(&self, now: DateTime<Utc>) -> ContestState {
        let Some(start) = self.start() else {
            return ContestState::NotStarted;
        };
        // An end past the representable range never arrives.
        let end = start.checked_add_signed(Duration::minutes(i64::from(self.duration)));
        if end.is_some_and(|end| now >= end) {
            ContestState::Ended
        } else if now >= start {
            ContestState::Started
        } else {
            ContestState::NotStarted
        }
    }

    pub fn state(&self) -> ContestState {
        self.state_at(Utc::now())
    }

    pub fn has_started(&self) -> bool {
        self.state() != ContestState::NotStarted
    }

    /// Unknown styles are ignored and the current one is kept.
    pub fn set_grading_style(&mut self, style: &str) {
        if GRADING_STYLES.contains(&style) {
            self.grading_style = style.to_string();
        }
    }

    pub(super) fn files_list(&self, access: AccessRight) -> Vec<PathBuf> {
        let descriptor = ResourceKind::Contest.descriptor_filename();
        let directory = &self.info.directory;

        if access.includes(AccessRight::ViewFull) {
            fs_util::matching_entries(directory, |name| {
                name == SECURITY_FILENAME
                    || layout::is_attachment_directory(name)
                    || name == descriptor
            })
        } else if access.includes(AccessRight::View) {
            let started = self.has_started();
            fs_util::matching_entries(directory, |name| {
                (started && name == PUBLIC_FILES_DIRECTORY) || name == descriptor
            })
        } else {
            Vec::new()
        }
    }

    /// Rules tying the descriptor to the problems stored below it.
    pub(super) fn validate_rules(&self, children: &[Resource]) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.start().is_none() {
            report.add_error("start_time", "Invalid start time");
        }

        if children.len() != self.problem_scores.len() {
            report.add_error("mismatch_problem_scores", "problems and scores mismatch");
        }

        if children.len() != self.problem_order.len() {
            report.add_error("mismatch_problem_order", "problems and order mismatch");
        } else {
            let ids = children.iter().map(Resource::id).collect::<BTreeSet<_>>();
            let order = self
                .problem_order
                .iter()
                .map(String::as_str)
                .collect::<BTreeSet<_>>();
            if ids != order {
                report.add_error("mismatch_problem_ids", "problems and order ids mismatch");
            }
        }

        report
    }
}
