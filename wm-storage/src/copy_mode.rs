//! Duplication contracts shared by every entity

use serde::{Deserialize, Serialize};

/// How a duplicate relates to its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CopyMode {
    /// Every field and identifier is shared with the source
    Identical,
    /// Every owned entity gets a fresh identifier; cross references are
    /// rewritten into the new subtree
    WithDifferentIds,
}

impl CopyMode {
    pub fn from_different_ids(different_ids: bool) -> Self {
        if different_ids {
            CopyMode::WithDifferentIds
        } else {
            CopyMode::Identical
        }
    }
}
