use std::fmt;

use serde::Serialize;

/// Classification of a path below the series root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// The series root itself.
    Root,
    /// A series, contest or problem directory.
    Resource,
    /// A descriptor or grant file of a resource.
    SystemFile,
    /// An attachment directory, or anything below one.
    SystemDirectory,
    /// A statement, checker, solution or test file of a problem.
    ProblemFile,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Root => "root",
            NodeType::Resource => "resource",
            NodeType::SystemFile => "system file",
            NodeType::SystemDirectory => "system directory",
            NodeType::ProblemFile => "problem file",
        };
        write!(f, "{}", name)
    }
}
