use clap::Args;

use common::prelude::{ChildResource, Node};

use crate::cli::op::SessionError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Repository path to list (defaults to the series root)
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.node(&self.path);
        Ok(render(&node))
    }
}

fn render(node: &Node) -> String {
    let mut lines = vec![format!(
        "/{} ({}, {})",
        node.path(),
        node.node_type(),
        node.access()
    )];

    if let Some(resource) = node.resource() {
        lines.push(format!(
            "{} {}: {}",
            resource.kind(),
            resource.id(),
            resource.info().title
        ));
    }
    if !node.ignored_parts().is_empty() {
        lines.push(format!("ignored: {}", node.ignored_parts().join("/")));
    }

    let files = node.visible_files();
    if !files.is_empty() {
        lines.push("files:".to_string());
        for file in files {
            let Some(name) = file.file_name() else {
                continue;
            };
            let suffix = if file.is_dir() { "/" } else { "" };
            lines.push(format!("  {}{}", name.to_string_lossy(), suffix));
        }
    }

    let children = node.load_child_resources();
    if !children.is_empty() {
        lines.push("children:".to_string());
        lines.extend(children.iter().map(render_child));
    }

    lines.join("\n")
}

fn render_child(child: &ChildResource) -> String {
    let mut flags = Vec::new();
    if child.grants.can_view_details {
        flags.push("view");
    }
    if child.grants.can_edit {
        flags.push("edit");
    }
    if child.grants.can_delete {
        flags.push("delete");
    }
    format!(
        "  {}  {}  [{}]",
        child.resource.id(),
        child.resource.info().title,
        flags.join(", ")
    )
}
