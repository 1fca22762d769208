//! Path classification and the access-gated operations on a classified path.

mod node;
mod node_type;
mod path;

pub use node::{ChildResource, Download, Node};
pub use node_type::NodeType;
pub use path::{join_path, split_path};
