/**
 * Zip export of a permission-filtered resource tree,
 *  built from inline and on-disk entries.
 */
pub mod archive;
/**
 * Classification of repository paths into nodes
 *  and the access-gated operations on them.
 */
pub mod browse;
pub mod fs_util;
/**
 * The series / contest / problem nesting.
 */
pub mod kind;
/**
 * On-disk names, formats and file patterns.
 */
pub mod layout;
pub mod report;
pub mod repository;
/**
 * Resource descriptors: loading, saving,
 *  views, updates and validation.
 */
pub mod resource;
/**
 * Access rights, grant files and the
 *  ancestry walk that resolves them.
 */
pub mod security;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::archive::{ArchiveBuilder, ArchiveError};
    pub use crate::browse::{ChildResource, Download, Node, NodeType};
    pub use crate::kind::ResourceKind;
    pub use crate::report::ValidationReport;
    pub use crate::repository::{Repository, RepositoryError, DEFAULT_SERIES_DIRNAME};
    pub use crate::resource::{LoadError, Resource, ResourceError};
    pub use crate::security::{AccessResolver, AccessRight, GrantFile, ResourceGrants};
    pub use crate::version::build_info;
}
