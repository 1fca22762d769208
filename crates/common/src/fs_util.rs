//! Small blocking filesystem helpers shared by the store, the archive
//! builder and the node operations.

use std::fs;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::report::ValidationReport;

/// Entries of `directory`, sorted by name. Unreadable directories are empty.
pub fn list_entries(directory: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(directory = %directory.display(), "unable to list directory: {}", e);
            return Vec::new();
        }
    };

    let mut paths = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    paths.sort();
    paths
}

pub fn entry_names(directory: &Path) -> Vec<String> {
    list_entries(directory)
        .iter()
        .filter_map(|path| file_name(path))
        .collect()
}

/// Entries of `directory` whose name satisfies `accept`, sorted by name.
pub fn matching_entries<F>(directory: &Path, accept: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> bool,
{
    list_entries(directory)
        .into_iter()
        .filter(|path| file_name(path).is_some_and(|name| accept(&name)))
        .collect()
}

pub fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Removes a file or a whole directory tree.
pub fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Recursively copies `source` into `destination`, creating it if needed.
pub fn copy_dir(source: &Path, destination: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Writes `input` to `destination`.
///
/// Fails under `"file"` when the destination exists and `overwrite` is off,
/// and under `"error"` when the write itself fails.
pub fn save_stream<R: Read>(
    mut input: R,
    destination: &Path,
    overwrite: bool,
) -> ValidationReport {
    if destination.exists() && !overwrite {
        return ValidationReport::error("file", "File already exists");
    }
    if destination.is_dir() {
        return ValidationReport::error("file", "A directory with that name exists");
    }

    let result = fs::File::create(destination).and_then(|mut output| io::copy(&mut input, &mut output));
    match result {
        Ok(bytes) => {
            tracing::info!(path = %destination.display(), bytes, "saved file");
            ValidationReport::new()
        }
        Err(e) => {
            tracing::error!(path = %destination.display(), "unable to save file: {}", e);
            ValidationReport::error("error", e.to_string())
        }
    }
}

/// Extracts a zip archive into `destination`.
pub fn unzip<R: Read + Seek>(input: R, destination: &Path) -> zip::result::ZipResult<()> {
    let mut archive = zip::ZipArchive::new(input)?;
    archive.extract(destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_entries_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b", "a", "c"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        assert_eq!(entry_names(dir.path()), vec!["a", "b", "c"]);
        assert!(entry_names(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_copy_dir_keeps_empty_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir_all(source.join("empty")).unwrap();
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("nested/file.txt"), "hello").unwrap();

        let destination = dir.path().join("destination");
        copy_dir(&source, &destination).unwrap();

        assert!(destination.join("empty").is_dir());
        assert_eq!(
            fs::read_to_string(destination.join("nested/file.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_save_stream_respects_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");

        assert!(save_stream("one".as_bytes(), &path, false).is_valid());
        let report = save_stream("two".as_bytes(), &path, false);
        assert!(report.has_error("file"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "one");

        assert!(save_stream("two".as_bytes(), &path, true).is_valid());
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn test_remove_path() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("f"), "").unwrap();
        remove_path(&dir.path().join("a")).unwrap();
        assert!(!dir.path().join("a").exists());
    }
}
