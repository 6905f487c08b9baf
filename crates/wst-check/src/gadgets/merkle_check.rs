//! Merkle path gadget
//!
//! Recomputes a root from a leaf, its index and a sibling path, hashing
//! `(current, sibling)` when the running index is even and
//! `(sibling, current)` when it is odd, halving the index at each level.
//! Reads assert membership; writes additionally re-walk the same path with
//! the new leaf substituted to derive the new root. Both are pure functions
//! of their inputs plus the hash primitive.

use serde::{Deserialize, Serialize};
use wst_primitives::{hash_pair, Felt};

use crate::error::{CheckError, CheckResult};
use crate::events::EventEmitter;

/// One membership check or write, with the full path witness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerkleCheckEvent {
    pub leaf_value: Felt,
    pub new_leaf_value: Option<Felt>,
    pub leaf_index: u64,
    pub sibling_path: Vec<Felt>,
    pub root: Felt,
    pub new_root: Option<Felt>,
}

/// The Merkle path gadget. Owns its event log.
#[derive(Debug, Default)]
pub struct MerkleCheck {
    events: EventEmitter<MerkleCheckEvent>,
}

impl MerkleCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert that `leaf_value` sits at `leaf_index` under `root`.
    pub fn assert_membership(
        &mut self,
        leaf_value: Felt,
        leaf_index: u64,
        sibling_path: &[Felt],
        root: Felt,
    ) -> CheckResult<()> {
        let computed = walk(leaf_value, leaf_index, sibling_path)?;
        if computed != root {
            return Err(CheckError::RootMismatch {
                computed,
                expected: root,
            });
        }
        self.events.emit(MerkleCheckEvent {
            leaf_value,
            new_leaf_value: None,
            leaf_index,
            sibling_path: sibling_path.to_vec(),
            root,
            new_root: None,
        });
        Ok(())
    }

    /// Prove `current_value` under `current_root`, substitute
    /// `new_value` at the leaf and return the resulting root. Both walks
    /// share one pass over the path.
    pub fn write(
        &mut self,
        current_value: Felt,
        new_value: Felt,
        leaf_index: u64,
        sibling_path: &[Felt],
        current_root: Felt,
    ) -> CheckResult<Felt> {
        let mut read_node = current_value;
        let mut write_node = new_value;
        let mut index = leaf_index;
        for &sibling in sibling_path {
            if index & 1 == 0 {
                read_node = hash_pair(read_node, sibling);
                write_node = hash_pair(write_node, sibling);
            } else {
                read_node = hash_pair(sibling, read_node);
                write_node = hash_pair(sibling, write_node);
            }
            index >>= 1;
        }
        if index > 1 {
            return Err(CheckError::MalformedPath { final_index: index });
        }
        if read_node != current_root {
            return Err(CheckError::RootMismatch {
                computed: read_node,
                expected: current_root,
            });
        }
        self.events.emit(MerkleCheckEvent {
            leaf_value: current_value,
            new_leaf_value: Some(new_value),
            leaf_index,
            sibling_path: sibling_path.to_vec(),
            root: current_root,
            new_root: Some(write_node),
        });
        Ok(write_node)
    }

    pub fn take_events(&mut self) -> Vec<MerkleCheckEvent> {
        self.events.take()
    }
}

fn walk(leaf_value: Felt, leaf_index: u64, sibling_path: &[Felt]) -> CheckResult<Felt> {
    let mut node = leaf_value;
    let mut index = leaf_index;
    for &sibling in sibling_path {
        node = if index & 1 == 0 {
            hash_pair(node, sibling)
        } else {
            hash_pair(sibling, node)
        };
        index >>= 1;
    }
    if index > 1 {
        return Err(CheckError::MalformedPath { final_index: index });
    }
    Ok(node)
}

/// Unconstrained root derivation, shared with the in-memory tree oracle and
/// the tests. Discharges no proof obligations.
pub fn root_from_path(leaf_value: Felt, leaf_index: u64, sibling_path: &[Felt]) -> Felt {
    let mut node = leaf_value;
    let mut index = leaf_index;
    for &sibling in sibling_path {
        node = if index & 1 == 0 {
            hash_pair(node, sibling)
        } else {
            hash_pair(sibling, node)
        };
        index >>= 1;
    }
    node
}
