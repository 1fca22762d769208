use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AccessRight;
use crate::layout::SECURITY_FILENAME;

#[derive(Debug, thiserror::Error)]
pub enum GrantsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed grant file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Contents of a `_security.json` file: `{"grants": {login: right}}`.
///
/// Rights are kept as written so that an unknown value in one entry
/// doesn't invalidate the whole file; they are parsed leniently on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantFile {
    #[serde(default)]
    pub grants: BTreeMap<String, String>,
}

impl GrantFile {
    pub fn get(&self, login: &str) -> AccessRight {
        self.grants
            .get(login)
            .map(|value| AccessRight::parse(value))
            .unwrap_or_default()
    }

    pub fn set(&mut self, login: impl Into<String>, right: AccessRight) {
        self.grants.insert(login.into(), right.to_string());
    }

    pub fn remove(&mut self, login: &str) -> bool {
        self.grants.remove(login).is_some()
    }

    pub fn from_json(json: &str) -> Result<Self, GrantsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, GrantsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads the grant file of `directory`; a missing file yields no grants,
    /// and so does a `directory` that is really a file.
    pub fn read(directory: &Path) -> Result<Self, GrantsError> {
        match fs::read_to_string(directory.join(SECURITY_FILENAME)) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == io::ErrorKind::NotFound || !directory.is_dir() => {
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, directory: &Path) -> Result<(), GrantsError> {
        fs::write(directory.join(SECURITY_FILENAME), self.to_json()?)?;
        Ok(())
    }
}

/// Source of per-directory grants for the access resolver.
pub trait GrantReader {
    /// The right granted to `login` directly on `directory`, ignoring ancestors.
    fn grant(&self, directory: &Path, login: &str) -> AccessRight;
}

/// Reads grants straight from `_security.json` on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsGrantReader;

impl GrantReader for FsGrantReader {
    fn grant(&self, directory: &Path, login: &str) -> AccessRight {
        match GrantFile::read(directory) {
            Ok(grants) => grants.get(login),
            Err(e) => {
                tracing::warn!(directory = %directory.display(), "unreadable grant file: {}", e);
                AccessRight::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let grants = GrantFile::read(dir.path()).unwrap();
        assert!(grants.grants.is_empty());
        assert_eq!(grants.get("anyone"), AccessRight::None);
    }

    #[test]
    fn test_file_path_has_no_grants() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("statement.md");
        fs::write(&file, "text").unwrap();

        let grants = GrantFile::read(&file).unwrap();
        assert!(grants.grants.is_empty());
        assert_eq!(FsGrantReader.grant(&file, "alice"), AccessRight::None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut grants = GrantFile::default();
        grants.set("alice", AccessRight::ViewFull);
        grants.set("bob", AccessRight::List);
        grants.write(dir.path()).unwrap();

        let read = GrantFile::read(dir.path()).unwrap();
        assert_eq!(read.get("alice"), AccessRight::ViewFull);
        assert_eq!(read.get("bob"), AccessRight::List);
        assert_eq!(read.get("carol"), AccessRight::None);
    }

    #[test]
    fn test_empty_file_shape() {
        let json = GrantFile::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!({"grants": {}}));
    }

    #[test]
    fn test_unknown_right_reads_as_none() {
        let grants = GrantFile::from_json(r#"{"grants":{"alice":"owner","bob":"view"}}"#).unwrap();
        assert_eq!(grants.get("alice"), AccessRight::None);
        assert_eq!(grants.get("bob"), AccessRight::View);
    }

    #[test]
    fn test_malformed_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SECURITY_FILENAME), "{not json").unwrap();
        assert!(GrantFile::read(dir.path()).is_err());
        assert_eq!(FsGrantReader.grant(dir.path(), "alice"), AccessRight::None);
    }
}
