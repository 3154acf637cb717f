//! Change tags reported by the deployment change-detection subsystem.

use serde::{Deserialize, Serialize};

/// What changed between two revisions of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeTag {
    /// Nothing changed.
    None,
    /// Only the dependency set changed.
    Dependency,
    /// Only the job script changed.
    Script,
    /// Both dependencies and script changed.
    All,
}

impl ChangeTag {
    /// Look up a tag by its stable numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Dependency),
            2 => Some(Self::Script),
            3 => Some(Self::All),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Dependency => 1,
            Self::Script => 2,
            Self::All => 3,
        }
    }

    pub fn is_no_change(self) -> bool {
        self == Self::None
    }

    pub fn is_dependency_change(self) -> bool {
        self == Self::Dependency
    }

    pub fn is_script_change(self) -> bool {
        self == Self::Script
    }

    pub fn is_all_change(self) -> bool {
        self == Self::All
    }
}
