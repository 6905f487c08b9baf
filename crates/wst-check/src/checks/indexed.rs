//! Shared indexed-tree check core
//!
//! All low-leaf based tree checks run the same algorithm: prove the low
//! leaf's membership, decide existence by key equality, validate the chain
//! ordering for absent keys, and (for writes) update the low leaf and
//! optionally splice in a new leaf. The per-tree services are thin wrappers
//! over these two functions supplying domain key derivation and events.

use serde::{Deserialize, Serialize};
use wst_primitives::{Felt, FELT_ZERO};

use crate::error::{CheckError, CheckResult};
use crate::gadgets::Gadgets;
use crate::tree::{AppendOnlyTreeSnapshot, IndexedLeaf, IndexedLeafValue};

/// Outcome of a read-path check
#[derive(Debug, Clone, Copy)]
pub struct ReadCheck {
    pub exists: bool,
    pub low_leaf_hash: Felt,
}

/// Hashes and intermediate root proving a low-leaf update (and, for
/// appends, the new leaf insertion)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WriteWitness {
    pub updated_low_leaf_hash: Felt,
    pub intermediate_root: Felt,
    pub new_leaf_hash: Option<Felt>,
}

/// Outcome of a write-path check
#[derive(Debug, Clone, Copy)]
pub struct WriteCheck {
    pub exists: bool,
    pub low_leaf_hash: Felt,
    pub next_snapshot: AppendOnlyTreeSnapshot,
    pub witness: Option<WriteWitness>,
}

/// How a write treats a key that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fatal `DuplicateInsert` on an existing key (nullifiers)
    InsertOnly,
    /// Replace the stored payload, pointers unchanged (public data)
    Upsert,
    /// Membership check only, no mutation (deduplicating sets)
    SetInsert,
}

/// Prove the low leaf and decide existence for `key` against `snapshot`.
pub fn check_read<V: IndexedLeafValue>(
    gadgets: &mut Gadgets,
    key: Felt,
    low_leaf: &IndexedLeaf<V>,
    low_leaf_index: u64,
    sibling_path: &[Felt],
    snapshot: AppendOnlyTreeSnapshot,
) -> CheckResult<ReadCheck> {
    let low_leaf_hash = low_leaf.hash();
    gadgets
        .merkle
        .assert_membership(low_leaf_hash, low_leaf_index, sibling_path, snapshot.root)?;

    let exists = low_leaf.value.key() == key;
    if !exists {
        assert_low_leaf_brackets(gadgets, key, low_leaf)?;
    }
    Ok(ReadCheck {
        exists,
        low_leaf_hash,
    })
}

/// Prove a write of `new_value` under `key`, per the mode's
/// existing-key policy. Appends insert at
/// `prev_snapshot.next_available_leaf_index` using `insertion_sibling_path`
/// against the post-low-leaf-update intermediate root.
#[allow(clippy::too_many_arguments)]
pub fn check_write<V: IndexedLeafValue>(
    gadgets: &mut Gadgets,
    key: Felt,
    new_value: V,
    mode: WriteMode,
    low_leaf: &IndexedLeaf<V>,
    low_leaf_index: u64,
    low_leaf_sibling_path: &[Felt],
    prev_snapshot: AppendOnlyTreeSnapshot,
    insertion_sibling_path: &[Felt],
) -> CheckResult<WriteCheck> {
    let low_leaf_hash = low_leaf.hash();
    let exists = low_leaf.value.key() == key;

    if exists {
        return match mode {
            WriteMode::InsertOnly => Err(CheckError::DuplicateInsert { key }),
            WriteMode::SetInsert => {
                gadgets.merkle.assert_membership(
                    low_leaf_hash,
                    low_leaf_index,
                    low_leaf_sibling_path,
                    prev_snapshot.root,
                )?;
                Ok(WriteCheck {
                    exists,
                    low_leaf_hash,
                    next_snapshot: prev_snapshot,
                    witness: None,
                })
            }
            WriteMode::Upsert => {
                let updated_low_leaf =
                    IndexedLeaf::new(new_value, low_leaf.next_index, low_leaf.next_key);
                let updated_low_leaf_hash = updated_low_leaf.hash();
                let intermediate_root = gadgets.merkle.write(
                    low_leaf_hash,
                    updated_low_leaf_hash,
                    low_leaf_index,
                    low_leaf_sibling_path,
                    prev_snapshot.root,
                )?;
                Ok(WriteCheck {
                    exists,
                    low_leaf_hash,
                    next_snapshot: AppendOnlyTreeSnapshot::new(
                        intermediate_root,
                        prev_snapshot.next_available_leaf_index,
                    ),
                    witness: Some(WriteWitness {
                        updated_low_leaf_hash,
                        intermediate_root,
                        new_leaf_hash: None,
                    }),
                })
            }
        };
    }

    assert_low_leaf_brackets(gadgets, key, low_leaf)?;

    // Repoint the low leaf at the slot the new leaf will occupy
    let new_leaf_index = prev_snapshot.next_available_leaf_index;
    let mut updated_low_leaf = low_leaf.clone();
    updated_low_leaf.next_index = new_leaf_index;
    updated_low_leaf.next_key = key;
    let updated_low_leaf_hash = updated_low_leaf.hash();

    let intermediate_root = gadgets.merkle.write(
        low_leaf_hash,
        updated_low_leaf_hash,
        low_leaf_index,
        low_leaf_sibling_path,
        prev_snapshot.root,
    )?;

    // The new leaf inherits the original low leaf's pointer, splicing
    // itself into the chain; its slot must previously hash to zero.
    let new_leaf = IndexedLeaf::new(new_value, low_leaf.next_index, low_leaf.next_key);
    let new_leaf_hash = new_leaf.hash();
    let new_root = gadgets.merkle.write(
        FELT_ZERO,
        new_leaf_hash,
        new_leaf_index,
        insertion_sibling_path,
        intermediate_root,
    )?;

    Ok(WriteCheck {
        exists,
        low_leaf_hash,
        next_snapshot: AppendOnlyTreeSnapshot::new(new_root, new_leaf_index + 1),
        witness: Some(WriteWitness {
            updated_low_leaf_hash,
            intermediate_root,
            new_leaf_hash: Some(new_leaf_hash),
        }),
    })
}

/// The linked-list invariant for an absent key: the low leaf strictly
/// precedes it, and strictly jumps over it unless the low leaf is the
/// current maximum.
fn assert_low_leaf_brackets<V: IndexedLeafValue>(
    gadgets: &mut Gadgets,
    key: Felt,
    low_leaf: &IndexedLeaf<V>,
) -> CheckResult<()> {
    let low_key = low_leaf.value.key();
    if !gadgets.field_gt.ff_gt(&mut gadgets.range, key, low_key)? {
        return Err(CheckError::OrderingViolation {
            reason: "low leaf does not precede key",
            key,
            bound: low_key,
        });
    }
    if low_leaf.next_key != FELT_ZERO
        && !gadgets
            .field_gt
            .ff_gt(&mut gadgets.range, low_leaf.next_key, key)?
    {
        return Err(CheckError::OrderingViolation {
            reason: "low leaf does not jump over key",
            key,
            bound: low_leaf.next_key,
        });
    }
    Ok(())
}
