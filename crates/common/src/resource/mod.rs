//! Resources: the typed content of a series, contest or problem directory.
//!
//! Every resource is one directory holding a descriptor (`<kind>.json`), a
//! grant file and two attachment directories. The descriptor is the only
//! part modeled in memory; [`Resource`] dispatches per kind for
//! - the files a given access level may see,
//! - the filtered descriptor JSON,
//! - the recursive archive export,
//! - structural validation.

mod contest;
mod problem;
mod schema;
mod series;
mod store;
mod update;
mod view;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use contest::{parse_start_time, Contest, ContestState};
pub use problem::Problem;
pub use schema::validate_document;
pub use series::Series;
pub use store::{child_directories, LoadError, ResourceError};
pub use update::{editable_fields, FieldType, FieldValue};
pub use view::{field_view, project, View};

use crate::archive::ArchiveBuilder;
use crate::fs_util;
use crate::kind::ResourceKind;
use crate::layout::{self, SECURITY_FILENAME};
use crate::report::ValidationReport;
use crate::security::{AccessResolver, AccessRight, GrantReader};

/// Fields shared by every kind. `id` and `directory` come from the location
/// on disk and are never written to the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub directory: PathBuf,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub notes: String,
}

impl ResourceInfo {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Series(Series),
    Contest(Contest),
    Problem(Problem),
}

impl Resource {
    /// A default-valued resource of `kind` with no location yet.
    pub fn new(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Series => Resource::Series(Series::default()),
            ResourceKind::Contest => Resource::Contest(Contest::default()),
            ResourceKind::Problem => Resource::Problem(Problem::default()),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Series(_) => ResourceKind::Series,
            Resource::Contest(_) => ResourceKind::Contest,
            Resource::Problem(_) => ResourceKind::Problem,
        }
    }

    pub fn info(&self) -> &ResourceInfo {
        match self {
            Resource::Series(series) => &series.info,
            Resource::Contest(contest) => &contest.info,
            Resource::Problem(problem) => &problem.info,
        }
    }

    pub fn info_mut(&mut self) -> &mut ResourceInfo {
        match self {
            Resource::Series(series) => &mut series.info,
            Resource::Contest(contest) => &mut contest.info,
            Resource::Problem(problem) => &mut problem.info,
        }
    }

    pub fn id(&self) -> &str {
        &self.info().id
    }

    pub fn directory(&self) -> &Path {
        &self.info().directory
    }

    /// Points the resource at `directory`; the id becomes its name.
    pub fn set_location(&mut self, directory: PathBuf) {
        let info = self.info_mut();
        info.id = fs_util::file_name(&directory).unwrap_or_default();
        info.directory = directory;
    }

    pub fn descriptor_filename(&self) -> String {
        self.kind().descriptor_filename()
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.directory().join(self.descriptor_filename())
    }

    /// Directory holding all series: one level above the series directory.
    pub fn series_root(&self) -> PathBuf {
        let mut root = self.directory();
        for _ in 0..=self.kind().depth() {
            root = root.parent().unwrap_or(root);
        }
        root.to_path_buf()
    }

    /// The whole descriptor as a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        let value = match self {
            Resource::Series(series) => serde_json::to_value(series),
            Resource::Contest(contest) => serde_json::to_value(contest),
            Resource::Problem(problem) => serde_json::to_value(problem),
        };
        value.unwrap_or_else(|e| {
            tracing::error!(id = self.id(), "unable to serialize resource: {}", e);
            serde_json::Value::Null
        })
    }

    /// Pretty JSON restricted to the fields visible in `view`.
    pub fn to_json(&self, view: View) -> String {
        format!("{:#}", project(self.kind(), self.to_value(), view))
    }

    /// The view a holder of `access` gets of this descriptor.
    pub fn view_for(&self, access: AccessRight) -> View {
        if access.includes(AccessRight::ViewFull) {
            return View::Private;
        }
        match self {
            Resource::Series(_) => View::Public,
            Resource::Contest(contest) => contest.state().view(),
            Resource::Problem(_) => self.parent_state().view(),
        }
    }

    pub fn json_string(&self, access: AccessRight) -> String {
        self.to_json(self.view_for(access))
    }

    /// State of the enclosing contest, `NotStarted` when there is none.
    fn parent_state(&self) -> ContestState {
        match self.load_parent() {
            Some(Resource::Contest(contest)) => contest.state(),
            _ => ContestState::NotStarted,
        }
    }

    /// Entries of the resource directory visible with `access`.
    pub fn files_list(&self, access: AccessRight) -> Vec<PathBuf> {
        match self {
            Resource::Series(series) => series.files_list(access),
            Resource::Contest(contest) => contest.files_list(access),
            Resource::Problem(problem) => {
                let parent_started =
                    access.includes(AccessRight::View) && self.parent_state() != ContestState::NotStarted;
                problem.files_list(access, parent_started)
            }
        }
    }

    /// Resources of the successor kind stored below this one, sorted by id.
    pub fn load_children(&self) -> Vec<Resource> {
        match self.kind().successor() {
            Some(kind) => Resource::load_children_of(self.directory(), kind),
            None => Vec::new(),
        }
    }

    pub fn load_parent(&self) -> Option<Resource> {
        let kind = self.kind().predecessor()?;
        let parent = self.directory().parent()?;
        Resource::try_load(parent, kind)
    }

    pub fn access_right(&self, login: &str) -> AccessRight {
        self.access_right_with(&AccessResolver::new(), login)
    }

    pub fn access_right_with<R: GrantReader>(
        &self,
        resolver: &AccessResolver<R>,
        login: &str,
    ) -> AccessRight {
        resolver.resolve(&self.series_root(), self.directory(), login)
    }

    /// Archive of this resource as seen by `login` holding `access`.
    ///
    /// Entries live under `<id>/`. Containers merge the archives of their
    /// children; a contest only does so once started, unless the viewer
    /// holds `VIEW_FULL`.
    pub fn archive<R: GrantReader>(
        &self,
        resolver: &AccessResolver<R>,
        login: &str,
        access: AccessRight,
    ) -> ArchiveBuilder {
        let root = format!("{}/", self.id());

        let mut builder = ArchiveBuilder::new();
        builder.add_inline(
            format!("{}{}", root, self.descriptor_filename()),
            self.json_string(access).into_bytes(),
        );
        builder.add_refs(&root, self.files_list(access));

        let expose_children = match self {
            Resource::Series(_) => true,
            Resource::Contest(contest) => {
                access.includes(AccessRight::ViewFull) || contest.has_started()
            }
            Resource::Problem(_) => false,
        };
        if !expose_children {
            return builder;
        }

        let children = self.load_children();
        let directories = children
            .iter()
            .map(|child| child.directory().to_path_buf())
            .collect::<Vec<_>>();
        let rights =
            resolver.resolve_children(&self.series_root(), self.directory(), &directories, login);

        for (child, child_access) in children.iter().zip(rights) {
            if child_access.includes(AccessRight::View) {
                builder.merge(&root, child.archive(resolver, login, child_access));
            }
        }

        builder
    }

    /// Schema, structural and kind-specific checks, recursing into children.
    pub fn validate(&self) -> ValidationReport {
        let mut report = validate_document(self.kind(), &self.to_value());
        report.merge(self.validate_location());

        let children = self.load_children();
        if self.directory().is_dir() {
            report.merge(self.validate_entries(&children));
        }

        match self {
            Resource::Contest(contest) => report.merge(contest.validate_rules(&children)),
            Resource::Problem(problem) => {
                if self.directory().is_dir() {
                    report.merge(problem.validate_files(&fs_util::entry_names(self.directory())));
                }
            }
            Resource::Series(_) => {}
        }

        for (index, child) in children.iter().enumerate() {
            report.merge_prefixed(&format!("child_{}", index), child.validate());
        }

        report
    }

    fn validate_location(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let directory = self.directory();

        if !directory.is_dir() {
            report.add_error(
                "directory_exists",
                format!("Directory for resource does not exist: {}", directory.display()),
            );
        }

        let descriptor = self.descriptor_path();
        if !descriptor.is_file() {
            report.add_error(
                "file",
                format!("JSON file for resource does not exist: {}", descriptor.display()),
            );
        }

        let directory_name = fs_util::file_name(directory).unwrap_or_default();
        if directory_name != self.id() {
            report.add_error(
                "directory_id",
                format!(
                    "Resource ID and directory name mismatch: {} - {}",
                    directory_name,
                    self.id()
                ),
            );
        }
        if !layout::is_resource_id(&directory_name) {
            report.add_error(
                "directory",
                format!("Directory name is invalid: {}", directory_name),
            );
        }
        if !layout::is_resource_id(self.id()) {
            report.add_error("id", format!("Resource ID is invalid: {}", self.id()));
        }

        report
    }

    /// Flags any directory entry that is neither a known file nor a child.
    fn validate_entries(&self, children: &[Resource]) -> ValidationReport {
        let descriptor = self.descriptor_filename();
        let is_problem = self.kind() == ResourceKind::Problem;

        let unknown = fs_util::entry_names(self.directory())
            .into_iter()
            .filter(|name| {
                let known = name == SECURITY_FILENAME
                    || *name == descriptor
                    || layout::is_attachment_directory(name)
                    || (is_problem && layout::is_problem_extra_file(name))
                    || children.iter().any(|child| child.id() == name);
                !known
            })
            .collect::<Vec<_>>();

        if unknown.is_empty() {
            ValidationReport::new()
        } else {
            tracing::debug!(id = self.id(), ?unknown, "unknown entries in resource directory");
            ValidationReport::error("file_extra", "contains unknown files")
        }
    }
}
