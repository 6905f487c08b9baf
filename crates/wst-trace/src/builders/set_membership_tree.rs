//! Set membership tree check trace
//!
//! Shared by the written-slots and retrieved-bytecodes trees, which differ
//! only in key derivation and leaf payload. One row per query or insert;
//! leaf hashes are re-derived from the recorded preimages.

use wst_check::{IndexedLeaf, ScopedEvent, SetLeafValue, SetMembershipTreeCheckEvent};
use wst_primitives::{felt_from_u64, FELT_ONE, FELT_ZERO};

use crate::discard::replay_scoped;
use crate::error::{TraceError, TraceResult};
use crate::matrix::TraceMatrix;

/// Column indices for a set membership tree trace
pub mod cols {
    pub const KEY: usize = 0;
    pub const EXISTS: usize = 1;
    pub const PREV_ROOT: usize = 2;
    pub const PREV_LEAF_COUNT: usize = 3;
    pub const NEXT_ROOT: usize = 4;
    pub const NEXT_LEAF_COUNT: usize = 5;
    pub const LOW_LEAF_KEY: usize = 6;
    pub const LOW_LEAF_NEXT_INDEX: usize = 7;
    pub const LOW_LEAF_NEXT_KEY: usize = 8;
    pub const LOW_LEAF_HASH: usize = 9;
    pub const LOW_LEAF_INDEX: usize = 10;
    pub const WRITE: usize = 11;
    pub const UPDATED_LOW_LEAF_HASH: usize = 12;
    pub const INTERMEDIATE_ROOT: usize = 13;
    pub const NEW_LEAF_HASH: usize = 14;
    pub const DISCARD: usize = 15;
}

pub const WIDTH: usize = 16;

pub fn build_trace<V: SetLeafValue>(
    events: &[ScopedEvent<SetMembershipTreeCheckEvent<V>>],
) -> TraceResult<TraceMatrix> {
    let mut matrix = TraceMatrix::new(WIDTH);
    replay_scoped(events, &mut matrix, cols::DISCARD, fill_event)?;
    Ok(matrix)
}

fn fill_event<V: SetLeafValue>(
    event: &SetMembershipTreeCheckEvent<V>,
    matrix: &mut TraceMatrix,
) -> TraceResult<()> {
    if event.low_leaf_preimage.hash() != event.low_leaf_hash {
        return Err(TraceError::WitnessMismatch {
            context: "set membership event low leaf hash does not match its preimage",
        });
    }
    if let Some(witness) = &event.write_witness {
        let mut updated_low_leaf = event.low_leaf_preimage.clone();
        updated_low_leaf.next_index = event.prev_snapshot.next_available_leaf_index;
        updated_low_leaf.next_key = event.key;
        if updated_low_leaf.hash() != witness.updated_low_leaf_hash {
            return Err(TraceError::WitnessMismatch {
                context: "set membership event updated low leaf hash does not match its preimage",
            });
        }
        let new_leaf = IndexedLeaf::new(
            V::from_key(event.key),
            event.low_leaf_preimage.next_index,
            event.low_leaf_preimage.next_key,
        );
        if witness.new_leaf_hash != Some(new_leaf.hash()) {
            return Err(TraceError::WitnessMismatch {
                context: "set membership event new leaf hash does not match its preimage",
            });
        }
    }

    let row = matrix.push_row();
    matrix.set(row, cols::KEY, event.key);
    if event.exists {
        matrix.set(row, cols::EXISTS, FELT_ONE);
    }
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
    matrix.set(row, cols::LOW_LEAF_KEY, event.low_leaf_preimage.value.key());
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
    use wst_check::{CheckpointListener, Gadgets, RetrievedBytecodesTreeCheck};
    use wst_primitives::felt_from_u64;

    #[test]
    fn test_insert_and_query_rows() {
        let mut check = RetrievedBytecodesTreeCheck::new();
        let mut gadgets = Gadgets::new();

        check.insert(&mut gadgets, felt_from_u64(42)).unwrap();
        check.contains(&mut gadgets, felt_from_u64(42)).unwrap();
        check.contains(&mut gadgets, felt_from_u64(7)).unwrap();

        let matrix = build_trace(&check.take_events()).unwrap();
        assert_eq!(matrix.num_rows(), 3);
        assert_eq!(matrix.get(0, cols::WRITE), FELT_ONE);
        assert_eq!(matrix.get(0, cols::EXISTS), FELT_ZERO);
        assert_eq!(matrix.get(1, cols::EXISTS), FELT_ONE);
        assert_eq!(matrix.get(2, cols::EXISTS), FELT_ZERO);
    }

    #[test]
    fn test_reverted_insert_discarded() {
        let mut check = RetrievedBytecodesTreeCheck::new();
        let mut gadgets = Gadgets::new();

        check.on_checkpoint_created();
        check.insert(&mut gadgets, felt_from_u64(1)).unwrap();
        check.on_checkpoint_reverted().unwrap();

        let matrix = build_trace(&check.take_events()).unwrap();
        assert_eq!(matrix.num_rows(), 1);
        assert_eq!(matrix.get(0, cols::DISCARD), FELT_ONE);
    }

    #[test]
    fn test_tampered_leaf_hashes_rejected() {
        let mut check = RetrievedBytecodesTreeCheck::new();
        let mut gadgets = Gadgets::new();
        check.insert(&mut gadgets, felt_from_u64(42)).unwrap();
        let events = check.take_events();

        let mut tampered = events.clone();
        if let ScopedEvent::Event(event) = &mut tampered[0] {
            event.low_leaf_hash = felt_from_u64(999);
        }
        assert!(matches!(
            build_trace(&tampered),
            Err(TraceError::WitnessMismatch { .. })
        ));

        let mut tampered = events;
        if let ScopedEvent::Event(event) = &mut tampered[0] {
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
