use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use super::path::{join_path, split_path};
use super::NodeType;
use crate::archive::ArchiveBuilder;
use crate::fs_util;
use crate::kind::ResourceKind;
use crate::layout::{self, PATH_SEPARATOR, PUBLIC_FILES_DIRECTORY, SECURITY_FILENAME, ZIP_FILE_EXTENSION};
use crate::report::ValidationReport;
use crate::resource::Resource;
use crate::security::{AccessResolver, AccessRight, GrantFile, ResourceGrants};

/// Payload of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A child resource visible to the requesting login.
#[derive(Debug, Clone)]
pub struct ChildResource {
    pub resource: Resource,
    pub access: AccessRight,
    pub grants: ResourceGrants,
}

/// A path below the series root, classified and resolved for one login.
///
/// Nodes are cheap to build and are never cached: every operation that needs
/// a neighbour (`parent`, `child`) classifies a fresh one. All mutating
/// operations check access on the node they run on and report failures as a
/// [`ValidationReport`].
#[derive(Debug, Clone)]
pub struct Node {
    series_root: PathBuf,
    login: String,
    parts: Vec<String>,
    resource_parts: Vec<String>,
    additional_parts: Vec<String>,
    ignored_parts: Vec<String>,
    node_type: NodeType,
    access: AccessRight,
    resource: Option<Resource>,
}

#[derive(Debug, PartialEq, Eq)]
struct Classification {
    parts: Vec<String>,
    resource_parts: Vec<String>,
    additional_parts: Vec<String>,
    ignored_parts: Vec<String>,
    node_type: NodeType,
}

/// Single left-to-right pass; the first unrecognized segment ends it and
/// everything from there on is returned as ignored.
fn classify(segments: Vec<String>) -> Classification {
    let depth = ResourceKind::NESTING.len();

    let mut parts = Vec::new();
    let mut resource_parts = Vec::new();
    let mut additional_parts = Vec::new();
    let mut ignored_parts = Vec::new();
    let mut terminal = None;
    let mut in_attachments = false;

    let mut segments = segments.into_iter();
    for segment in segments.by_ref() {
        let consumed = resource_parts.len();

        if in_attachments {
            // relative components would escape the attachment directory
            if !layout::is_plain_file_name(&segment) {
                ignored_parts.push(segment);
                break;
            }
            parts.push(segment.clone());
            additional_parts.push(segment);
        } else if consumed < depth && layout::is_resource_id(&segment) {
            parts.push(segment.clone());
            resource_parts.push(segment);
        } else if consumed == depth && layout::is_problem_extra_file(&segment) {
            parts.push(segment);
            terminal = Some(NodeType::ProblemFile);
            break;
        } else if consumed >= 1 && is_system_file(consumed, &segment) {
            parts.push(segment);
            terminal = Some(NodeType::SystemFile);
            break;
        } else if consumed >= 1 && layout::is_attachment_directory(&segment) {
            in_attachments = true;
            parts.push(segment.clone());
            additional_parts.push(segment);
        } else {
            ignored_parts.push(segment);
            break;
        }
    }
    ignored_parts.extend(segments);

    let node_type = match terminal {
        Some(node_type) => node_type,
        None if in_attachments => NodeType::SystemDirectory,
        None if !resource_parts.is_empty() => NodeType::Resource,
        None => NodeType::Root,
    };

    Classification {
        parts,
        resource_parts,
        additional_parts,
        ignored_parts,
        node_type,
    }
}

fn is_system_file(consumed: usize, segment: &str) -> bool {
    segment == SECURITY_FILENAME
        || ResourceKind::at_depth(consumed)
            .is_some_and(|kind| segment == kind.descriptor_filename())
}

fn join_parts(root: &Path, parts: &[String]) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(parts);
    path
}

fn read_file(path: &Path) -> Result<Vec<u8>, ValidationReport> {
    fs::read(path).map_err(|e| {
        tracing::error!(path = %path.display(), "unable to read file: {}", e);
        ValidationReport::error("file", "Unable to read file")
    })
}

impl Node {
    pub fn new(series_root: impl Into<PathBuf>, path: &str, login: &str) -> Self {
        let series_root = series_root.into();
        let Classification {
            parts,
            resource_parts,
            additional_parts,
            ignored_parts,
            node_type,
        } = classify(split_path(path));

        if !ignored_parts.is_empty() {
            tracing::debug!(path, ignored = ?ignored_parts, "ignoring unrecognized path segments");
        }

        let access =
            AccessResolver::new().resolve(&series_root, &join_parts(&series_root, &parts), login);

        let resource = match ResourceKind::at_depth(resource_parts.len()) {
            Some(kind) if access.includes(AccessRight::View) => {
                Resource::try_load(&join_parts(&series_root, &resource_parts), kind)
            }
            _ => None,
        };

        tracing::debug!(path, %node_type, %access, login, "classified node");

        Self {
            series_root,
            login: login.to_string(),
            parts,
            resource_parts,
            additional_parts,
            ignored_parts,
            node_type,
            access,
            resource,
        }
    }

    pub fn series_root(&self) -> &Path {
        &self.series_root
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn access(&self) -> AccessRight {
        self.access
    }

    /// The loaded resource; absent below `VIEW` or when it can't be read.
    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn resource_parts(&self) -> &[String] {
        &self.resource_parts
    }

    pub fn additional_parts(&self) -> &[String] {
        &self.additional_parts
    }

    /// Segments dropped after the first unrecognized one.
    pub fn ignored_parts(&self) -> &[String] {
        &self.ignored_parts
    }

    pub fn is_root(&self) -> bool {
        self.node_type == NodeType::Root
    }

    /// The classified path, without ignored segments.
    pub fn path(&self) -> String {
        join_path(&self.parts)
    }

    pub fn resource_path(&self) -> String {
        join_path(&self.resource_parts)
    }

    pub fn additional_path(&self) -> String {
        join_path(&self.additional_parts)
    }

    /// Location of the node on disk.
    pub fn file(&self) -> PathBuf {
        join_parts(&self.series_root, &self.parts)
    }

    /// Directory of the innermost resource on the path.
    pub fn resource_directory(&self) -> PathBuf {
        join_parts(&self.series_root, &self.resource_parts)
    }

    pub fn resource_kind(&self) -> Option<ResourceKind> {
        ResourceKind::at_depth(self.resource_parts.len())
    }

    /// Kind of resource that can be created or imported below this node.
    pub fn successor_kind(&self) -> Option<ResourceKind> {
        match self.resource_kind() {
            Some(kind) => kind.successor(),
            None => ResourceKind::NESTING.first().copied(),
        }
    }

    pub fn parent(&self) -> Node {
        let parts = self.parts.split_last().map_or(&[][..], |(_, rest)| rest);
        Node::new(self.series_root.clone(), &join_path(parts), &self.login)
    }

    pub fn child(&self, name: &str) -> Node {
        let path = format!("{}{}{}", self.path(), PATH_SEPARATOR, name);
        Node::new(self.series_root.clone(), &path, &self.login)
    }

    pub fn download_filename(&self) -> String {
        let file = self.file();
        let name = fs_util::file_name(&file).unwrap_or_default();
        if self.node_type == NodeType::Resource || file.is_dir() {
            format!("{}{}", name, ZIP_FILE_EXTENSION)
        } else {
            name
        }
    }

    fn in_public_attachments(&self) -> bool {
        self.additional_parts
            .first()
            .is_some_and(|part| part == PUBLIC_FILES_DIRECTORY)
    }

    fn can_browse_attachments(&self) -> bool {
        self.access.includes(AccessRight::ViewFull)
            || (self.access.includes(AccessRight::View) && self.in_public_attachments())
    }

    /// Files the login may see at this node.
    pub fn visible_files(&self) -> Vec<PathBuf> {
        match self.node_type {
            NodeType::Resource => self
                .resource
                .as_ref()
                .map(|resource| resource.files_list(self.access))
                .unwrap_or_default(),
            NodeType::SystemDirectory if self.can_browse_attachments() => {
                fs_util::list_entries(&self.file())
            }
            _ => Vec::new(),
        }
    }

    /// Resources one level down that the login may at least list.
    pub fn load_child_resources(&self) -> Vec<ChildResource> {
        let Some(kind) = self.successor_kind() else {
            return Vec::new();
        };
        let children = match self.node_type {
            NodeType::Root => Resource::load_children_of(&self.series_root, kind),
            NodeType::Resource => self
                .resource
                .as_ref()
                .map(Resource::load_children)
                .unwrap_or_default(),
            _ => return Vec::new(),
        };

        let directories = children
            .iter()
            .map(|child| child.directory().to_path_buf())
            .collect::<Vec<_>>();
        let rights = AccessResolver::new().resolve_children(
            &self.series_root,
            &self.file(),
            &directories,
            &self.login,
        );

        children
            .into_iter()
            .zip(rights)
            .filter(|(_, access)| access.includes(AccessRight::List))
            .map(|(resource, access)| ChildResource {
                resource,
                access,
                grants: ResourceGrants::new(access, self.access),
            })
            .collect()
    }

    fn require(&self, right: AccessRight) -> Result<(), ValidationReport> {
        if self.access.includes(right) {
            Ok(())
        } else {
            Err(ValidationReport::error(
                "access",
                format!("{} access is required", right),
            ))
        }
    }

    /// Mutations never run on a path that was only partly recognized.
    fn require_exact_path(&self) -> Result<(), ValidationReport> {
        if self.ignored_parts.is_empty() {
            Ok(())
        } else {
            Err(ValidationReport::error(
                "path",
                format!("Unrecognized path: {}", join_path(&self.ignored_parts)),
            ))
        }
    }

    fn loaded(&self) -> Result<&Resource, ValidationReport> {
        self.resource
            .as_ref()
            .ok_or_else(|| ValidationReport::error("resource", "Resource not found"))
    }

    fn container_successor(&self) -> Option<ResourceKind> {
        match self.node_type {
            NodeType::Root | NodeType::Resource => self.successor_kind(),
            _ => None,
        }
    }

    /// Creates a subdirectory inside an attachment directory.
    pub fn add_directory(&self, name: &str) -> Result<(), ValidationReport> {
        self.require_exact_path()?;
        let directory = self.file();
        if !directory.is_dir() {
            return Err(ValidationReport::error("access", "Parent directory does not exist"));
        }
        if self.node_type != NodeType::SystemDirectory {
            return Err(ValidationReport::error(
                "access",
                "Directories can only be created inside attachments",
            ));
        }
        self.require(AccessRight::ViewFull)?;
        if !layout::is_new_directory_name(name) {
            return Err(ValidationReport::error("name", "Invalid directory name"));
        }

        let target = directory.join(name);
        if target.exists() {
            return Err(ValidationReport::error("newdir", "Directory already exists"));
        }
        fs::create_dir(&target).map_err(|e| {
            tracing::error!(path = %target.display(), "unable to create directory: {}", e);
            ValidationReport::error("newdir", "Unable to create directory")
        })?;

        tracing::info!(path = %target.display(), login = %self.login, "created directory");
        Ok(())
    }

    /// Stores `input` as `name` inside this node's directory.
    ///
    /// Attachments take any file. In a resource directory the descriptor and
    /// grant file can be replaced (both must parse), and a problem also
    /// accepts its statement, checker, solution and test files.
    pub fn add_file<R: Read>(
        &self,
        input: R,
        name: &str,
        overwrite: bool,
    ) -> Result<(), ValidationReport> {
        self.require_exact_path()?;
        let directory = self.file();
        if !directory.is_dir() {
            return Err(ValidationReport::error("parent", "Parent directory does not exist"));
        }
        self.require(AccessRight::ViewFull)?;
        if !layout::is_plain_file_name(name) {
            return Err(ValidationReport::error("name", "Invalid file name"));
        }

        let destination = directory.join(name);
        match (self.node_type, self.resource_kind()) {
            (NodeType::SystemDirectory, _) => {
                fs_util::save_stream(input, &destination, overwrite).into_result()
            }
            (NodeType::Resource, Some(kind)) if name == kind.descriptor_filename() => {
                self.replace_descriptor(input, kind)
            }
            (NodeType::Resource, _) if name == SECURITY_FILENAME => self.replace_grants(input),
            (NodeType::Resource, Some(ResourceKind::Problem))
                if layout::is_problem_extra_file(name) =>
            {
                fs_util::save_stream(input, &destination, overwrite).into_result()
            }
            _ => Err(ValidationReport::error("file", "File not allowed")),
        }
    }

    fn replace_descriptor<R: Read>(&self, input: R, kind: ResourceKind) -> Result<(), ValidationReport> {
        let mut resource = Resource::from_reader(input, "temp", kind).map_err(|e| {
            tracing::warn!(path = %self.path(), "rejected descriptor: {}", e);
            ValidationReport::error("file", "Invalid json file")
        })?;
        resource.set_location(self.resource_directory());
        resource.save().map_err(|e| {
            tracing::error!(path = %self.path(), "unable to save descriptor: {}", e);
            ValidationReport::error("error", e.to_string())
        })
    }

    fn replace_grants<R: Read>(&self, mut input: R) -> Result<(), ValidationReport> {
        let mut json = String::new();
        let grants = input
            .read_to_string(&mut json)
            .map_err(|e| e.to_string())
            .and_then(|_| GrantFile::from_json(&json).map_err(|e| e.to_string()))
            .map_err(|e| {
                tracing::warn!(path = %self.path(), "rejected grant file: {}", e);
                ValidationReport::error("file", "Invalid security file")
            })?;
        grants.write(&self.file()).map_err(|e| {
            tracing::error!(path = %self.path(), "unable to write grant file: {}", e);
            ValidationReport::error("error", e.to_string())
        })
    }

    /// Imports a zipped resource of the successor kind, replacing the child
    /// with the same id. Nothing is touched unless the archive holds exactly
    /// one directory that loads and validates cleanly.
    pub fn add_zip<R: Read>(&self, mut input: R) -> Result<(), ValidationReport> {
        self.require_exact_path()?;
        self.require(AccessRight::ViewFull)?;
        let kind = self.container_successor().ok_or_else(|| {
            ValidationReport::error("zip", "Archives can only be imported into the root, a series or a contest")
        })?;

        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(|_| ValidationReport::error("zip", "Unable to read zip."))?;

        let scratch = tempfile::tempdir().map_err(|e| {
            tracing::error!("unable to create scratch directory: {}", e);
            ValidationReport::error("error", e.to_string())
        })?;
        fs_util::unzip(Cursor::new(bytes), scratch.path()).map_err(|e| {
            tracing::warn!(path = %self.path(), "rejected archive: {}", e);
            ValidationReport::error("zip", "Unable to open zip.")
        })?;

        let roots = fs_util::list_entries(scratch.path())
            .into_iter()
            .filter(|entry| entry.is_dir())
            .collect::<Vec<_>>();
        let [root] = roots.as_slice() else {
            return Err(ValidationReport::error(
                "root",
                "The archive must contain exactly one top level directory",
            ));
        };

        let resource = Resource::try_load(root, kind)
            .ok_or_else(|| ValidationReport::error("json", "Unable to parse resource."))?;
        resource.validate().into_result()?;

        let target = self.file().join(resource.id());
        let replaced = if target.exists() {
            fs_util::remove_path(&target)
        } else {
            Ok(())
        };
        replaced
            .and_then(|_| fs_util::copy_dir(root, &target))
            .map_err(|e| {
                tracing::error!(path = %target.display(), "unable to import resource: {}", e);
                ValidationReport::error("copy", "Unable to copy resource")
            })?;

        tracing::info!(path = %target.display(), %kind, login = %self.login, "imported resource");
        Ok(())
    }

    /// Creates an empty child resource of the successor kind.
    pub fn add_resource(&self, name: &str) -> Result<(), ValidationReport> {
        self.require_exact_path()?;
        let directory = self.file();
        if !directory.is_dir() {
            return Err(ValidationReport::error("access", "Parent resource does not exist"));
        }
        self.require(AccessRight::ViewFull)?;
        let kind = self
            .container_successor()
            .ok_or_else(|| ValidationReport::error("id", "Resources cannot be created here"))?;
        Resource::create(&directory, name, kind).into_result()
    }

    /// Applies a field-level update and saves the resource when every field
    /// went through. The loaded resource is refreshed on success.
    pub fn update_resource(
        &mut self,
        old_values: &BTreeMap<String, String>,
        new_values: &BTreeMap<String, String>,
    ) -> Result<(), ValidationReport> {
        self.require_exact_path()?;
        self.require(AccessRight::ViewFull)?;
        if self.node_type != NodeType::Resource {
            return Err(ValidationReport::error("resource", "Not a resource"));
        }

        let mut updated = self.loaded()?.clone();
        updated.update(old_values, new_values).into_result()?;
        updated.save().map_err(|e| {
            tracing::error!(path = %self.path(), "unable to save resource: {}", e);
            ValidationReport::error("error", e.to_string())
        })?;

        tracing::info!(path = %self.path(), login = %self.login, "updated resource");
        self.resource = Some(updated);
        Ok(())
    }

    /// Removes the node from disk. Governed by the parent's access.
    pub fn delete(&self) -> Result<(), ValidationReport> {
        self.require_exact_path()?;
        if self.is_root() {
            return Err(ValidationReport::error("delete", "The series root cannot be deleted"));
        }
        self.parent().require(AccessRight::ViewFull)?;

        let target = self.file();
        if !target.exists() {
            return Err(ValidationReport::error("delete", "Nothing to delete"));
        }
        fs_util::remove_path(&target).map_err(|e| {
            tracing::error!(path = %target.display(), "unable to delete: {}", e);
            ValidationReport::error("delete", "Unable to delete resource")
        })?;

        tracing::info!(path = %target.display(), login = %self.login, "deleted");
        Ok(())
    }

    pub fn validate_resource(&self) -> Result<(), ValidationReport> {
        self.require(AccessRight::ViewFull)?;
        self.loaded()?.validate().into_result()
    }

    /// Rewrites the grant of `login` on this resource or the root.
    /// `NONE` removes the entry.
    pub fn set_grant(&self, login: &str, right: AccessRight) -> Result<(), ValidationReport> {
        self.require_exact_path()?;
        self.require(AccessRight::ViewFull)?;
        if !matches!(self.node_type, NodeType::Root | NodeType::Resource) {
            return Err(ValidationReport::error(
                "grants",
                "Grants can only be set on the root or a resource",
            ));
        }
        if login.is_empty() {
            return Err(ValidationReport::error("login", "Login is required"));
        }

        let directory = self.file();
        let grants_error = |e: crate::security::GrantsError| {
            tracing::error!(path = %directory.display(), "unable to update grants: {}", e);
            ValidationReport::error("grants", e.to_string())
        };
        let mut grants = GrantFile::read(&directory).map_err(grants_error)?;
        if right == AccessRight::None {
            grants.remove(login);
        } else {
            grants.set(login, right);
        }
        grants.write(&directory).map_err(grants_error)?;

        tracing::info!(path = %self.path(), grantee = login, %right, "updated grant");
        Ok(())
    }

    /// The bytes a download of this node yields for the login.
    pub fn download(&self) -> Result<Download, ValidationReport> {
        self.require(AccessRight::View)?;
        let file = self.file();

        let bytes = match self.node_type {
            NodeType::Root => {
                return Err(ValidationReport::error("download", "Nothing to download"));
            }
            NodeType::Resource => {
                let resource = self.loaded()?;
                resource
                    .archive(&AccessResolver::new(), &self.login, self.access)
                    .serialize()
                    .map_err(|e| {
                        tracing::error!(path = %self.path(), "unable to build archive: {}", e);
                        ValidationReport::error("zip", "Unable to build archive")
                    })?
            }
            NodeType::ProblemFile => {
                if !self.loaded()?.files_list(self.access).contains(&file) {
                    return Err(ValidationReport::error("access", "File is not visible"));
                }
                read_file(&file)?
            }
            NodeType::SystemFile => {
                if fs_util::file_name(&file).as_deref() == Some(SECURITY_FILENAME) {
                    self.require(AccessRight::ViewFull)?;
                    read_file(&file)?
                } else {
                    self.loaded()?.json_string(self.access).into_bytes()
                }
            }
            NodeType::SystemDirectory => {
                if !self.can_browse_attachments() {
                    return Err(ValidationReport::error("access", "Attachments are not visible"));
                }
                if file.is_file() {
                    read_file(&file)?
                } else if file.is_dir() {
                    let mut builder = ArchiveBuilder::new();
                    builder.add_ref(fs_util::file_name(&file).unwrap_or_default(), file.clone());
                    builder.serialize().map_err(|e| {
                        tracing::error!(path = %self.path(), "unable to build archive: {}", e);
                        ValidationReport::error("zip", "Unable to build archive")
                    })?
                } else {
                    return Err(ValidationReport::error("file", "File not found"));
                }
            }
        };

        tracing::info!(path = %self.path(), login = %self.login, bytes = bytes.len(), "download");
        Ok(Download {
            filename: self.download_filename(),
            bytes,
        })
    }
}
