//! Public data tree check trace
//!
//! One row per read or write event. Leaf slot derivation and the leaf
//! preimage hashes are re-run in parallel over the substantive events
//! before any row is filled; a disagreement with the recorded event means
//! corrupted witness material.

use rayon::prelude::*;
use wst_check::{
    compute_leaf_slot, IndexedLeaf, PublicDataLeafValue, PublicDataTreeCheckEvent, ScopedEvent,
};
use wst_primitives::{felt_from_u64, FELT_ONE, FELT_ZERO};

use crate::discard::replay_scoped;
use crate::error::{TraceError, TraceResult};
use crate::matrix::TraceMatrix;

/// Column indices for the public data tree trace
pub mod cols {
    pub const CONTRACT_ADDRESS: usize = 0;
    pub const SLOT: usize = 1;
    pub const LEAF_SLOT: usize = 2;
    pub const VALUE: usize = 3;
    pub const EXISTS: usize = 4;
    pub const EXECUTION_ID: usize = 5;
    pub const PREV_ROOT: usize = 6;
    pub const PREV_LEAF_COUNT: usize = 7;
    pub const NEXT_ROOT: usize = 8;
    pub const NEXT_LEAF_COUNT: usize = 9;
    pub const LOW_LEAF_SLOT: usize = 10;
    pub const LOW_LEAF_VALUE: usize = 11;
    pub const LOW_LEAF_NEXT_INDEX: usize = 12;
    pub const LOW_LEAF_NEXT_KEY: usize = 13;
    pub const LOW_LEAF_HASH: usize = 14;
    pub const LOW_LEAF_INDEX: usize = 15;
    pub const WRITE: usize = 16;
    pub const UPDATED_LOW_LEAF_HASH: usize = 17;
    pub const INTERMEDIATE_ROOT: usize = 18;
    pub const NEW_LEAF_HASH: usize = 19;
    pub const DISCARD: usize = 20;
}

pub const WIDTH: usize = 21;

pub fn build_trace(
    events: &[ScopedEvent<PublicDataTreeCheckEvent>],
) -> TraceResult<TraceMatrix> {
    // Hash re-derivation dominates; run it across events up front
    events
        .par_iter()
        .filter_map(|event| match event {
            ScopedEvent::Event(event) => Some(event),
            ScopedEvent::Checkpoint(_) => None,
        })
        .try_for_each(|event| {
            if compute_leaf_slot(event.contract_address, event.slot) != event.leaf_slot {
                return Err(TraceError::WitnessMismatch {
                    context: "public data event leaf slot does not match its derivation",
                });
            }
            if event.low_leaf_preimage.hash() != event.low_leaf_hash {
                return Err(TraceError::WitnessMismatch {
                    context: "public data event low leaf hash does not match its preimage",
                });
            }
            if let Some(witness) = &event.write_witness {
                let written = PublicDataLeafValue::new(event.leaf_slot, event.value);
                if witness.new_leaf_hash.is_some() {
                    // Append: the low leaf repoints at the new slot and the
                    // new leaf inherits its original pointers
                    let mut updated_low_leaf = event.low_leaf_preimage.clone();
                    updated_low_leaf.next_index = event.prev_snapshot.next_available_leaf_index;
                    updated_low_leaf.next_key = event.leaf_slot;
                    if updated_low_leaf.hash() != witness.updated_low_leaf_hash {
                        return Err(TraceError::WitnessMismatch {
                            context:
                                "public data event updated low leaf hash does not match its preimage",
                        });
                    }
                    let new_leaf = IndexedLeaf::new(
                        written,
                        event.low_leaf_preimage.next_index,
                        event.low_leaf_preimage.next_key,
                    );
                    if witness.new_leaf_hash != Some(new_leaf.hash()) {
                        return Err(TraceError::WitnessMismatch {
                            context: "public data event new leaf hash does not match its preimage",
                        });
                    }
                } else {
                    // Upsert in place: payload replaced, pointers unchanged
                    let updated_low_leaf = IndexedLeaf::new(
                        written,
                        event.low_leaf_preimage.next_index,
                        event.low_leaf_preimage.next_key,
                    );
                    if updated_low_leaf.hash() != witness.updated_low_leaf_hash {
                        return Err(TraceError::WitnessMismatch {
                            context:
                                "public data event updated low leaf hash does not match its preimage",
                        });
                    }
                }
            }
            Ok(())
        })?;

    let mut matrix = TraceMatrix::new(WIDTH);
    replay_scoped(events, &mut matrix, cols::DISCARD, fill_event)?;
    Ok(matrix)
}

fn fill_event(event: &PublicDataTreeCheckEvent, matrix: &mut TraceMatrix) -> TraceResult<()> {
    let row = matrix.push_row();
    matrix.set(row, cols::CONTRACT_ADDRESS, event.contract_address);
    matrix.set(row, cols::SLOT, event.slot);
    matrix.set(row, cols::LEAF_SLOT, event.leaf_slot);
    matrix.set(row, cols::VALUE, event.value);
    if event.exists {
        matrix.set(row, cols::EXISTS, FELT_ONE);
    }
    matrix.set(
        row,
        cols::EXECUTION_ID,
        felt_from_u64(event.execution_id as u64),
    );
    matrix.set(row, cols::PREV_ROOT, event.prev_snapshot.root);
    matrix.set(
        row,
        cols::PREV_LEAF_COUNT,
        felt_from_u64(event.prev_snapshot.next_available_leaf_index),
    );
    matrix.set(row, cols::NEXT_ROOT, event.next_snapshot.root);
    matrix.set(
        row,
        cols::NEXT_LEAF_COUNT,
        felt_from_u64(event.next_snapshot.next_available_leaf_index),
    );
    matrix.set(row, cols::LOW_LEAF_SLOT, event.low_leaf_preimage.value.slot);
    matrix.set(row, cols::LOW_LEAF_VALUE, event.low_leaf_preimage.value.value);
    matrix.set(
        row,
        cols::LOW_LEAF_NEXT_INDEX,
        felt_from_u64(event.low_leaf_preimage.next_index),
    );
    matrix.set(
        row,
        cols::LOW_LEAF_NEXT_KEY,
        event.low_leaf_preimage.next_key,
    );
    matrix.set(row, cols::LOW_LEAF_HASH, event.low_leaf_hash);
    matrix.set(row, cols::LOW_LEAF_INDEX, felt_from_u64(event.low_leaf_index));
    if event.write {
        matrix.set(row, cols::WRITE, FELT_ONE);
    }
    if let Some(witness) = &event.write_witness {
        matrix.set(row, cols::UPDATED_LOW_LEAF_HASH, witness.updated_low_leaf_hash);
        matrix.set(row, cols::INTERMEDIATE_ROOT, witness.intermediate_root);
        matrix.set(
            row,
            cols::NEW_LEAF_HASH,
            witness.new_leaf_hash.unwrap_or(FELT_ZERO),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wst_check::tree::PUBLIC_DATA_TREE_HEIGHT;
    use wst_check::{
        Gadgets, MemoryIndexedTree, PublicDataLeafValue, PublicDataTreeCheck,
    };
    use wst_primitives::felt_from_u64;

    fn write(
        tree: &mut MemoryIndexedTree<PublicDataLeafValue>,
        check: &mut PublicDataTreeCheck,
        gadgets: &mut Gadgets,
        contract: u64,
        slot: u64,
        value: u64,
        execution_id: u32,
    ) {
        let contract = felt_from_u64(contract);
        let slot = felt_from_u64(slot);
        let leaf_slot = compute_leaf_slot(contract, slot);
        let prev = tree.snapshot();
        let low = tree.get_low_indexed_leaf(leaf_slot);
        let low_path = tree.get_sibling_path(low.index);
        tree.insert(PublicDataLeafValue::new(leaf_slot, felt_from_u64(value)));
        let insertion_path = tree.get_sibling_path(prev.next_available_leaf_index);
        check
            .write(
                gadgets,
                contract,
                slot,
                felt_from_u64(value),
                execution_id,
                low.preimage,
                low.index,
                &low_path,
                prev,
                &insertion_path,
            )
            .unwrap();
    }

    #[test]
    fn test_write_rows() {
        let mut tree = MemoryIndexedTree::new(PUBLIC_DATA_TREE_HEIGHT);
        let mut check = PublicDataTreeCheck::new();
        let mut gadgets = Gadgets::new();

        write(&mut tree, &mut check, &mut gadgets, 1, 5, 27, 1);
        write(&mut tree, &mut check, &mut gadgets, 1, 5, 28, 2);

        let matrix = build_trace(&check.take_events()).unwrap();
        assert_eq!(matrix.num_rows(), 2);
        assert_eq!(matrix.get(0, cols::WRITE), FELT_ONE);
        assert_eq!(matrix.get(0, cols::EXISTS), FELT_ZERO);
        // Second write hits the existing leaf
        assert_eq!(matrix.get(1, cols::EXISTS), FELT_ONE);
        assert_eq!(matrix.get(1, cols::VALUE), felt_from_u64(28));
        assert_eq!(matrix.get(1, cols::NEW_LEAF_HASH), FELT_ZERO);
    }

    #[test]
    fn test_corrupted_leaf_slot_rejected() {
        let mut tree = MemoryIndexedTree::new(PUBLIC_DATA_TREE_HEIGHT);
        let mut check = PublicDataTreeCheck::new();
        let mut gadgets = Gadgets::new();

        write(&mut tree, &mut check, &mut gadgets, 1, 5, 27, 1);
        let mut events = check.take_events();
        if let ScopedEvent::Event(event) = &mut events[0] {
            event.leaf_slot = felt_from_u64(999);
        }
        assert!(matches!(
            build_trace(&events),
            Err(TraceError::WitnessMismatch { .. })
        ));
    }

    #[test]
    fn test_tampered_leaf_hashes_rejected() {
        let mut tree = MemoryIndexedTree::new(PUBLIC_DATA_TREE_HEIGHT);
        let mut check = PublicDataTreeCheck::new();
        let mut gadgets = Gadgets::new();

        write(&mut tree, &mut check, &mut gadgets, 1, 5, 27, 1);
        write(&mut tree, &mut check, &mut gadgets, 1, 5, 28, 2);
        let events = check.take_events();

        let mut tampered = events.clone();
        if let ScopedEvent::Event(event) = &mut tampered[0] {
            event.low_leaf_hash = felt_from_u64(999);
        }
        assert!(matches!(
            build_trace(&tampered),
            Err(TraceError::WitnessMismatch { .. })
        ));

        // The second event is the in-place update; perturb its witness
        let mut tampered = events;
        if let ScopedEvent::Event(event) = &mut tampered[1] {
            if let Some(witness) = &mut event.write_witness {
                witness.updated_low_leaf_hash = felt_from_u64(999);
            }
        }
        assert!(matches!(
            build_trace(&tampered),
            Err(TraceError::WitnessMismatch { .. })
        ));
    }
}
