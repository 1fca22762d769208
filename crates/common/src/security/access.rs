use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permission level a login holds for a directory.
///
/// Levels are totally ordered; a higher level implies every lower one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessRight {
    #[default]
    None,
    /// May see that the resource exists.
    List,
    /// May read the resource and its public attachments.
    View,
    /// May read and modify everything below the directory.
    ViewFull,
}

impl AccessRight {
    pub const ALL: [AccessRight; 4] = [
        AccessRight::None,
        AccessRight::List,
        AccessRight::View,
        AccessRight::ViewFull,
    ];

    pub fn includes(&self, other: AccessRight) -> bool {
        *self >= other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRight::None => "NONE",
            AccessRight::List => "LIST",
            AccessRight::View => "VIEW",
            AccessRight::ViewFull => "VIEW_FULL",
        }
    }

    /// Lenient parse used for grant files: anything unrecognized is `None`.
    pub fn parse(value: &str) -> AccessRight {
        value.parse().unwrap_or(AccessRight::None)
    }
}

impl fmt::Display for AccessRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown access right: {0}")]
pub struct UnknownAccessRight(String);

impl FromStr for AccessRight {
    type Err = UnknownAccessRight;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        AccessRight::ALL
            .into_iter()
            .find(|right| right.as_str() == normalized)
            .ok_or_else(|| UnknownAccessRight(s.to_string()))
    }
}
