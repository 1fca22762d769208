//! Composable zip export.
//!
//! An [`ArchiveBuilder`] collects two kinds of entries keyed by their path
//! inside the archive:
//!
//! - **inline** entries hold bytes produced in memory (a filtered descriptor),
//! - **ref** entries point at a file or directory on disk.
//!
//! Builders are merged by prefixing keys; nothing is read from disk until
//! [`ArchiveBuilder::serialize`]. When an inline and a ref entry end up at the
//! same path the inline one is kept.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::fs_util;
use crate::layout::PATH_SEPARATOR;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveBuilder {
    inline: BTreeMap<String, Vec<u8>>,
    refs: BTreeMap<String, PathBuf>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_inline(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.inline.insert(path.into(), bytes.into());
    }

    pub fn add_ref(&mut self, path: impl Into<String>, location: impl Into<PathBuf>) {
        self.refs.insert(path.into(), location.into());
    }

    /// Adds each location under `prefix` followed by its own base name.
    pub fn add_refs<I, P>(&mut self, prefix: &str, locations: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for location in locations {
            let location = location.as_ref();
            if let Some(name) = fs_util::file_name(location) {
                self.add_ref(format!("{}{}", prefix, name), location);
            }
        }
    }

    /// Moves every entry of `other` into this builder under `prefix`.
    pub fn merge(&mut self, prefix: &str, other: ArchiveBuilder) {
        for (path, bytes) in other.inline {
            self.inline.insert(format!("{}{}", prefix, path), bytes);
        }
        for (path, location) in other.refs {
            self.refs.insert(format!("{}{}", prefix, path), location);
        }
    }

    pub fn inline(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.inline
    }

    pub fn refs(&self) -> &BTreeMap<String, PathBuf> {
        &self.refs
    }

    pub fn len(&self) -> usize {
        self.inline.len() + self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.refs.is_empty()
    }

    /// Writes every entry into a single zip archive.
    ///
    /// Inline entries go first. Ref entries are expanded recursively and
    /// skipped wherever a path has already been written; empty directories
    /// become a trailing-slash entry.
    pub fn serialize(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        let mut written = BTreeSet::new();

        for (path, bytes) in &self.inline {
            writer.start_file(path.as_str(), options)?;
            writer.write_all(bytes)?;
            written.insert(path.clone());
        }

        for (path, location) in &self.refs {
            if written.contains(path) {
                tracing::debug!(path, "ref shadowed by inline entry");
                continue;
            }
            write_ref(&mut writer, options, path, location, &mut written)?;
        }

        Ok(writer.finish()?.into_inner())
    }
}

fn write_ref<W: Write + io::Seek>(
    writer: &mut ZipWriter<W>,
    options: FileOptions,
    path: &str,
    location: &Path,
    written: &mut BTreeSet<String>,
) -> Result<(), ArchiveError> {
    for entry in WalkDir::new(location).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(location)
            .map_err(io::Error::other)?
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        let name = std::iter::once(path.to_string())
            .chain(relative)
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR);

        if entry.file_type().is_dir() {
            let is_empty = fs::read_dir(entry.path())?.next().is_none();
            let name = format!("{}{}", name, PATH_SEPARATOR);
            if is_empty && written.insert(name.clone()) {
                writer.add_directory(name.as_str(), options)?;
            }
        } else if written.insert(name.clone()) {
            writer.start_file(name.as_str(), options)?;
            let mut file = fs::File::open(entry.path())?;
            io::copy(&mut file, writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names = archive.file_names().map(str::to_string).collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn test_add_refs_uses_base_names() {
        let mut builder = ArchiveBuilder::new();
        builder.add_refs("s1/", ["/tmp/x/_files", "/tmp/x/series.json"]);
        assert!(builder.refs().contains_key("s1/_files"));
        assert!(builder.refs().contains_key("s1/series.json"));
    }

    #[test]
    fn test_merge_prefixes_both_maps() {
        let mut child = ArchiveBuilder::new();
        child.add_inline("c1/contest.json", "{}");
        child.add_ref("c1/_files", "/somewhere");

        let mut parent = ArchiveBuilder::new();
        parent.add_inline("s1/series.json", "{}");
        parent.merge("s1/", child);

        assert_eq!(parent.len(), 3);
        assert!(parent.inline().contains_key("s1/c1/contest.json"));
        assert!(parent.refs().contains_key("s1/c1/_files"));
    }

    #[test]
    fn test_serialize_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let files = dir.path().join("_files");
        fs::create_dir_all(files.join("empty")).unwrap();
        fs::write(files.join("a.txt"), "a").unwrap();

        let mut builder = ArchiveBuilder::new();
        builder.add_ref("p/_files", &files);
        builder.add_inline("p/problem.json", "{}");

        let names = entry_names(builder.serialize().unwrap());
        assert_eq!(
            names,
            vec!["p/_files/a.txt", "p/_files/empty/", "p/problem.json"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_keep_their_place() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let files = dir.path().join("_files");
        let nested = files.join(OsStr::from_bytes(b"dir\xff"));
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("a.txt"), "a").unwrap();

        let mut builder = ArchiveBuilder::new();
        builder.add_ref("p/_files", &files);
        assert_eq!(
            entry_names(builder.serialize().unwrap()),
            vec!["p/_files/dir\u{fffd}/a.txt"]
        );
    }

    #[test]
    fn test_inline_wins_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = dir.path().join("series.json");
        fs::write(&on_disk, "from disk").unwrap();

        let mut builder = ArchiveBuilder::new();
        builder.add_inline("s1/series.json", "inline");
        builder.add_ref("s1/series.json", &on_disk);

        let bytes = builder.serialize().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
        let mut content = String::new();
        archive
            .by_name("s1/series.json")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "inline");
    }

    #[test]
    fn test_empty_ref_directory_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("_public_files");
        fs::create_dir(&empty).unwrap();

        let mut builder = ArchiveBuilder::new();
        builder.add_ref("s1/_public_files", &empty);
        assert_eq!(
            entry_names(builder.serialize().unwrap()),
            vec!["s1/_public_files/"]
        );
    }
}
