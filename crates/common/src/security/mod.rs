//! Access control: ordered rights, per-directory grant files and the
//! ancestry walk that combines them.

mod access;
mod grants;
mod resolver;

pub use access::{AccessRight, UnknownAccessRight};
pub use grants::{FsGrantReader, GrantFile, GrantReader, GrantsError};
pub use resolver::AccessResolver;

/// What a login may do with one listed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ResourceGrants {
    pub can_view_basic: bool,
    pub can_view_details: bool,
    pub can_edit: bool,
    /// Deletion is governed by the parent directory, not the resource.
    pub can_delete: bool,
}

impl ResourceGrants {
    pub fn new(access: AccessRight, parent_access: AccessRight) -> Self {
        Self {
            can_view_basic: access.includes(AccessRight::List),
            can_view_details: access.includes(AccessRight::View),
            can_edit: access.includes(AccessRight::ViewFull),
            can_delete: parent_access.includes(AccessRight::ViewFull),
        }
    }
}
