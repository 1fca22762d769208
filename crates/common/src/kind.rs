use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::JSON_FILE_EXTENSION;

/// The three flavors of resource, in nesting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Series,
    Contest,
    Problem,
}

impl ResourceKind {
    /// Nesting of the kinds below the series root: depth `d` holds `NESTING[d - 1]`.
    pub const NESTING: [ResourceKind; 3] = [
        ResourceKind::Series,
        ResourceKind::Contest,
        ResourceKind::Problem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Series => "series",
            ResourceKind::Contest => "contest",
            ResourceKind::Problem => "problem",
        }
    }

    /// Name of the descriptor file, e.g. `contest.json`.
    pub fn descriptor_filename(&self) -> String {
        format!("{}{}", self.name(), JSON_FILE_EXTENSION)
    }

    /// Zero-based position in [`ResourceKind::NESTING`].
    pub fn depth(&self) -> usize {
        match self {
            ResourceKind::Series => 0,
            ResourceKind::Contest => 1,
            ResourceKind::Problem => 2,
        }
    }

    /// Kind of the resources nested directly below this one.
    pub fn successor(&self) -> Option<ResourceKind> {
        Self::NESTING.get(self.depth() + 1).copied()
    }

    /// Kind of the resource this one is nested in.
    pub fn predecessor(&self) -> Option<ResourceKind> {
        self.depth()
            .checked_sub(1)
            .and_then(|index| Self::NESTING.get(index).copied())
    }

    /// Kind of a resource whose path has `parts` resource segments.
    pub fn at_depth(parts: usize) -> Option<ResourceKind> {
        parts
            .checked_sub(1)
            .and_then(|index| Self::NESTING.get(index).copied())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown resource kind: {0}")]
pub struct UnknownKind(String);

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "series" | "s" => Ok(ResourceKind::Series),
            "contest" | "c" => Ok(ResourceKind::Contest),
            "problem" | "p" => Ok(ResourceKind::Problem),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_chain() {
        assert_eq!(ResourceKind::Series.successor(), Some(ResourceKind::Contest));
        assert_eq!(ResourceKind::Contest.successor(), Some(ResourceKind::Problem));
        assert_eq!(ResourceKind::Problem.successor(), None);
    }

    #[test]
    fn test_predecessor_chain() {
        assert_eq!(ResourceKind::Series.predecessor(), None);
        assert_eq!(ResourceKind::Contest.predecessor(), Some(ResourceKind::Series));
        assert_eq!(ResourceKind::Problem.predecessor(), Some(ResourceKind::Contest));
    }

    #[test]
    fn test_at_depth() {
        assert_eq!(ResourceKind::at_depth(0), None);
        for depth in 1..=3 {
            assert_eq!(
                ResourceKind::at_depth(depth),
                Some(ResourceKind::NESTING[depth - 1])
            );
        }
        assert_eq!(ResourceKind::at_depth(4), None);
    }

    #[test]
    fn test_descriptor_filename() {
        assert_eq!(ResourceKind::Series.descriptor_filename(), "series.json");
        assert_eq!(ResourceKind::Contest.descriptor_filename(), "contest.json");
        assert_eq!(ResourceKind::Problem.descriptor_filename(), "problem.json");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("PROBLEM".parse::<ResourceKind>().unwrap(), ResourceKind::Problem);
        assert_eq!("c".parse::<ResourceKind>().unwrap(), ResourceKind::Contest);
        assert!("folder".parse::<ResourceKind>().is_err());
    }
}
