use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ResourceInfo;
use crate::fs_util;
use crate::kind::ResourceKind;
use crate::layout::{self, PUBLIC_FILES_DIRECTORY, SECURITY_FILENAME, SERIES_FORMAT};
use crate::security::AccessRight;

/// Top-level grouping of contests. Carries only the common fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Series {
    #[serde(flatten)]
    pub info: ResourceInfo,
}

impl Default for Series {
    fn default() -> Self {
        Self {
            info: ResourceInfo::new(SERIES_FORMAT),
        }
    }
}

impl Series {
    pub(super) fn files_list(&self, access: AccessRight) -> Vec<PathBuf> {
        let descriptor = ResourceKind::Series.descriptor_filename();
        let directory = &self.info.directory;

        if access.includes(AccessRight::ViewFull) {
            fs_util::matching_entries(directory, |name| {
                name == SECURITY_FILENAME
                    || layout::is_attachment_directory(name)
                    || name == descriptor
            })
        } else if access.includes(AccessRight::View) {
            fs_util::matching_entries(directory, |name| {
                name == PUBLIC_FILES_DIRECTORY || name == descriptor
            })
        } else {
            Vec::new()
        }
    }
}
