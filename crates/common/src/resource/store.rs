use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{Contest, Problem, Resource, Series};
use crate::fs_util;
use crate::kind::ResourceKind;
use crate::layout::{self, ATTACHMENT_DIRECTORIES, SECURITY_FILENAME};
use crate::report::ValidationReport;
use crate::security::{GrantFile, GrantsError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("directory not found: {0}")]
    NotFound(PathBuf),
    #[error("descriptor not found: {0}")]
    MissingDescriptor(PathBuf),
    #[error("malformed descriptor {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed descriptor: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("resource directory does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("grant file error: {0}")]
    Grants(#[from] GrantsError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Subdirectories of `directory` whose names are valid resource ids.
pub fn child_directories(directory: &Path) -> Vec<PathBuf> {
    fs_util::matching_entries(directory, layout::is_resource_id)
        .into_iter()
        .filter(|path| path.is_dir())
        .collect()
}

impl Resource {
    /// Parses a descriptor of `kind` without touching the filesystem.
    ///
    /// A missing or empty `format` takes the kind's own format tag.
    pub fn from_json_str(json: &str, kind: ResourceKind) -> Result<Resource, serde_json::Error> {
        let mut resource = match kind {
            ResourceKind::Series => Resource::Series(serde_json::from_str::<Series>(json)?),
            ResourceKind::Contest => Resource::Contest(serde_json::from_str::<Contest>(json)?),
            ResourceKind::Problem => Resource::Problem(serde_json::from_str::<Problem>(json)?),
        };
        if resource.info().format.is_empty() {
            resource.info_mut().format = Resource::new(kind).info().format.clone();
        }
        Ok(resource)
    }

    /// Parses a descriptor from a stream and names it `id`; it has no directory.
    pub fn from_reader<R: Read>(
        mut reader: R,
        id: &str,
        kind: ResourceKind,
    ) -> Result<Resource, LoadError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        let mut resource = Resource::from_json_str(&json, kind)?;
        resource.info_mut().id = id.to_string();
        Ok(resource)
    }

    /// Loads the descriptor of `kind` stored in `directory`.
    pub fn load(directory: &Path, kind: ResourceKind) -> Result<Resource, LoadError> {
        if !directory.is_dir() {
            return Err(LoadError::NotFound(directory.to_path_buf()));
        }

        let path = directory.join(kind.descriptor_filename());
        if !path.is_file() {
            return Err(LoadError::MissingDescriptor(path));
        }

        let json = fs::read_to_string(&path)?;
        let mut resource = Resource::from_json_str(&json, kind)
            .map_err(|source| LoadError::Parse { path, source })?;
        resource.set_location(directory.to_path_buf());
        Ok(resource)
    }

    /// Like [`Resource::load`], but logs the failure and reports it as absent.
    pub fn try_load(directory: &Path, kind: ResourceKind) -> Option<Resource> {
        match Resource::load(directory, kind) {
            Ok(resource) => Some(resource),
            Err(e @ (LoadError::Parse { .. } | LoadError::Io(_) | LoadError::Json(_))) => {
                tracing::warn!(kind = %kind, "unable to load resource: {}", e);
                None
            }
            Err(e) => {
                tracing::debug!(kind = %kind, "no resource: {}", e);
                None
            }
        }
    }

    /// Every loadable resource of `kind` directly below `directory`, sorted by id.
    pub fn load_children_of(directory: &Path, kind: ResourceKind) -> Vec<Resource> {
        child_directories(directory)
            .iter()
            .filter_map(|child| Resource::try_load(child, kind))
            .collect()
    }

    /// Creates `<parent>/<id>` holding a default resource of `kind`.
    ///
    /// Fails under `"id"` when the id is malformed or already taken; nothing
    /// is written in that case.
    pub fn create(parent: &Path, id: &str, kind: ResourceKind) -> ValidationReport {
        if !layout::is_resource_id(id) {
            return ValidationReport::error("id", "Invalid resource id");
        }

        let directory = parent.join(id);
        if directory.exists() {
            return ValidationReport::error("id", format!("Resource with id '{}' exists", id));
        }

        let mut resource = Resource::new(kind);
        resource.set_location(directory.clone());

        let result = fs::create_dir(&directory)
            .map_err(ResourceError::from)
            .and_then(|_| resource.save());
        match result {
            Ok(()) => {
                tracing::info!(kind = %kind, path = %directory.display(), "created resource");
                ValidationReport::new()
            }
            Err(e) => {
                tracing::error!(kind = %kind, path = %directory.display(), "unable to create resource: {}", e);
                ValidationReport::error("create", "Unable to create resource")
            }
        }
    }

    /// Writes the descriptor and makes sure the grant file and both
    /// attachment directories exist.
    pub fn save(&self) -> Result<(), ResourceError> {
        let directory = self.directory();
        if !directory.is_dir() {
            return Err(ResourceError::MissingDirectory(directory.to_path_buf()));
        }

        let json = serde_json::to_string_pretty(&self.to_value())?;
        fs::write(self.descriptor_path(), json)?;

        let security = directory.join(SECURITY_FILENAME);
        if !security.is_file() {
            if security.is_dir() {
                fs::remove_dir_all(&security)?;
            }
            GrantFile::default().write(directory)?;
        }

        for name in ATTACHMENT_DIRECTORIES {
            let attachments = directory.join(name);
            if attachments.is_file() {
                fs::remove_file(&attachments)?;
            }
            if !attachments.exists() {
                fs::create_dir(&attachments)?;
            }
        }

        tracing::debug!(id = self.id(), kind = %self.kind(), "saved resource");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PRIVATE_FILES_DIRECTORY, PUBLIC_FILES_DIRECTORY};

    #[test]
    fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = Resource::load(&dir.path().join("nope"), ResourceKind::Series);
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_load_missing_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let result = Resource::load(dir.path(), ResourceKind::Contest);
        assert!(matches!(result, Err(LoadError::MissingDescriptor(_))));
        assert!(Resource::try_load(dir.path(), ResourceKind::Contest).is_none());
    }

    #[test]
    fn test_load_malformed_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("problem.json"), "{ nope").unwrap();
        let result = Resource::load(dir.path(), ResourceKind::Problem);
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_load_sets_location() {
        let dir = tempfile::tempdir().unwrap();
        let series = dir.path().join("autumn");
        fs::create_dir(&series).unwrap();
        fs::write(series.join("series.json"), r#"{"title": "Autumn"}"#).unwrap();

        let resource = Resource::load(&series, ResourceKind::Series).unwrap();
        assert_eq!(resource.id(), "autumn");
        assert_eq!(resource.directory(), series.as_path());
        assert_eq!(resource.info().title, "Autumn");
        assert_eq!(resource.info().format, "core-series-1");
    }

    #[test]
    fn test_missing_format_takes_kind_default() {
        for (kind, format) in [
            (ResourceKind::Series, "core-series-1"),
            (ResourceKind::Contest, "core-contest-1"),
            (ResourceKind::Problem, "core-problem-1"),
        ] {
            let resource = Resource::from_json_str(r#"{"title": "Autumn"}"#, kind).unwrap();
            assert_eq!(resource.info().format, format);

            let resource = Resource::from_json_str(r#"{"format": ""}"#, kind).unwrap();
            assert_eq!(resource.info().format, format);
        }

        let resource =
            Resource::from_json_str(r#"{"format": "legacy-1"}"#, ResourceKind::Series).unwrap();
        assert_eq!(resource.info().format, "legacy-1");
    }

    #[test]
    fn test_from_reader_names_resource() {
        let json = r#"{"title": "Sum", "checker": "custom"}"#;
        let resource = Resource::from_reader(json.as_bytes(), "temp", ResourceKind::Problem).unwrap();
        assert_eq!(resource.id(), "temp");
        match resource {
            Resource::Problem(problem) => assert_eq!(problem.checker, "custom"),
            other => panic!("unexpected resource {:?}", other),
        }
    }

    #[test]
    fn test_create_writes_layout() {
        let dir = tempfile::tempdir().unwrap();
        let report = Resource::create(dir.path(), "c1", ResourceKind::Contest);
        assert!(report.is_valid(), "{}", report);

        let contest = dir.path().join("c1");
        assert!(contest.join("contest.json").is_file());
        assert!(contest.join(PUBLIC_FILES_DIRECTORY).is_dir());
        assert!(contest.join(PRIVATE_FILES_DIRECTORY).is_dir());
        let grants: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(contest.join(SECURITY_FILENAME)).unwrap())
                .unwrap();
        assert_eq!(grants, serde_json::json!({"grants": {}}));
    }

    #[test]
    fn test_create_rejects_bad_and_taken_ids() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Resource::create(dir.path(), "Bad Id", ResourceKind::Series).has_error("id"));

        fs::create_dir(dir.path().join("taken")).unwrap();
        let report = Resource::create(dir.path(), "taken", ResourceKind::Series);
        assert!(report.has_error("id"));
        assert!(fs_util::entry_names(&dir.path().join("taken")).is_empty());
    }

    #[test]
    fn test_save_replaces_file_in_attachment_slot() {
        let dir = tempfile::tempdir().unwrap();
        let series = dir.path().join("s1");
        fs::create_dir(&series).unwrap();
        fs::write(series.join(PRIVATE_FILES_DIRECTORY), "not a dir").unwrap();

        let mut resource = Resource::new(ResourceKind::Series);
        resource.set_location(series.clone());
        resource.save().unwrap();

        assert!(series.join(PRIVATE_FILES_DIRECTORY).is_dir());
    }

    #[test]
    fn test_save_keeps_existing_grants() {
        let dir = tempfile::tempdir().unwrap();
        let series = dir.path().join("s1");
        fs::create_dir(&series).unwrap();
        fs::write(
            series.join(SECURITY_FILENAME),
            r#"{"grants": {"alice": "VIEW_FULL"}}"#,
        )
        .unwrap();

        let mut resource = Resource::new(ResourceKind::Series);
        resource.set_location(series.clone());
        resource.save().unwrap();

        let grants = GrantFile::read(&series).unwrap();
        assert_eq!(grants.get("alice"), crate::security::AccessRight::ViewFull);
    }

    #[test]
    fn test_save_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut resource = Resource::new(ResourceKind::Problem);
        resource.set_location(dir.path().join("missing"));
        assert!(matches!(
            resource.save(),
            Err(ResourceError::MissingDirectory(_))
        ));
    }
}
