use std::path::{Path, PathBuf};

use super::grants::{FsGrantReader, GrantReader};
use super::AccessRight;

/// Computes the effective access right of a login on a file or directory.
///
/// The walk starts at the target and climbs to the series root, inclusive:
///
/// - `LIST` counts only when granted on the target itself.
/// - Any other grant on the chain replaces the running result when it is at
///   least as strong, so `VIEW` and `VIEW_FULL` flow down to every descendant.
///
/// Paths are compared lexically; directories outside the series root resolve
/// to `NONE`. Nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct AccessResolver<R = FsGrantReader> {
    reader: R,
}

impl AccessResolver<FsGrantReader> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: GrantReader> AccessResolver<R> {
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    pub fn resolve(&self, series_root: &Path, target: &Path, login: &str) -> AccessRight {
        if login.is_empty() || !target.exists() {
            return AccessRight::None;
        }

        target
            .ancestors()
            .take_while(|dir| dir.starts_with(series_root))
            .enumerate()
            .fold(AccessRight::None, |acc, (step, dir)| {
                let grant = self.reader.grant(dir, login);
                match grant {
                    AccessRight::List if step == 0 => AccessRight::List,
                    AccessRight::List => acc,
                    grant if grant.includes(acc) => grant,
                    _ => acc,
                }
            })
    }

    /// Resolves every child of `parent` at once, reading the shared ancestor
    /// chain a single time. Agrees with [`AccessResolver::resolve`] per child.
    pub fn resolve_children(
        &self,
        series_root: &Path,
        parent: &Path,
        children: &[PathBuf],
        login: &str,
    ) -> Vec<AccessRight> {
        if login.is_empty() {
            return vec![AccessRight::None; children.len()];
        }

        let inherited = self.inherited(series_root, parent, login);
        children
            .iter()
            .map(|child| {
                if !child.is_dir() || !child.starts_with(series_root) {
                    return AccessRight::None;
                }
                self.reader.grant(child, login).max(inherited)
            })
            .collect()
    }

    /// Strongest non-`LIST` grant on `directory` and its ancestors.
    fn inherited(&self, series_root: &Path, directory: &Path, login: &str) -> AccessRight {
        directory
            .ancestors()
            .take_while(|dir| dir.starts_with(series_root))
            .map(|dir| self.reader.grant(dir, login))
            .filter(|grant| *grant != AccessRight::List)
            .max()
            .unwrap_or_default()
    }
}
