//! Committed tree state snapshots

use serde::{Deserialize, Serialize};
use wst_primitives::Felt;

/// A tree's committed state at a point in time. Every operation consumes
/// one snapshot; writes produce a replacement with the new root, so a root
/// change always pairs with a snapshot replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendOnlyTreeSnapshot {
    pub root: Felt,
    pub next_available_leaf_index: u64,
}

impl AppendOnlyTreeSnapshot {
    pub fn new(root: Felt, next_available_leaf_index: u64) -> Self {
        Self {
            root,
            next_available_leaf_index,
        }
    }
}
