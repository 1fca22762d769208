use std::fs;
use std::path::{Path, PathBuf};

use crate::browse::Node;
use crate::kind::ResourceKind;
use crate::report::ValidationReport;
use crate::resource::Resource;
use crate::security::{AccessRight, GrantFile, GrantsError};

pub const DEFAULT_SERIES_DIRNAME: &str = "series";

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("grant file error: {0}")]
    Grants(#[from] GrantsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry point over a repository directory: the series root lives at
/// `<repo_root>/<series_dirname>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    repo_root: PathBuf,
    series_dirname: String,
}

impl Repository {
    pub fn new(repo_root: impl Into<PathBuf>, series_dirname: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            series_dirname: series_dirname.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn series_root(&self) -> PathBuf {
        self.repo_root.join(&self.series_dirname)
    }

    /// Creates the series root; `admin`, when given, gets `VIEW_FULL` on it.
    pub fn init(&self, admin: Option<&str>) -> Result<(), RepositoryError> {
        let series_root = self.series_root();
        fs::create_dir_all(&series_root)?;

        let mut grants = GrantFile::read(&series_root)?;
        if let Some(admin) = admin {
            grants.set(admin, AccessRight::ViewFull);
        }
        grants.write(&series_root)?;

        tracing::info!(series_root = %series_root.display(), admin, "initialized repository");
        Ok(())
    }

    pub fn node(&self, path: &str, login: &str) -> Node {
        Node::new(self.series_root(), path, login)
    }

    /// Validates the resource of `kind` stored in `directory`, without any
    /// access checks.
    pub fn validate(directory: &Path, kind: ResourceKind) -> ValidationReport {
        match Resource::load(directory, kind) {
            Ok(resource) => resource.validate(),
            Err(e) => ValidationReport::error("load", e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::NodeType;

    #[test]
    fn test_init_grants_admin() {
        let dir = tempfile::tempdir().unwrap();
        let repository = Repository::new(dir.path(), DEFAULT_SERIES_DIRNAME);
        repository.init(Some("root")).unwrap();

        let root = repository.node("", "root");
        assert_eq!(root.node_type(), NodeType::Root);
        assert_eq!(root.access(), AccessRight::ViewFull);
        assert_eq!(repository.node("", "guest").access(), AccessRight::None);
    }

    #[test]
    fn test_init_keeps_existing_grants() {
        let dir = tempfile::tempdir().unwrap();
        let repository = Repository::new(dir.path(), "data");
        repository.init(Some("ann")).unwrap();
        repository.init(Some("bob")).unwrap();

        let grants = GrantFile::read(&dir.path().join("data")).unwrap();
        assert_eq!(grants.get("ann"), AccessRight::ViewFull);
        assert_eq!(grants.get("bob"), AccessRight::ViewFull);
    }

    #[test]
    fn test_validate_reports_load_failures() {
        let dir = tempfile::tempdir().unwrap();
        let report = Repository::validate(&dir.path().join("missing"), ResourceKind::Series);
        assert!(report.has_error("load"));
    }
}
