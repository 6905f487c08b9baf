//! Nullifier tree check trace
//!
//! One row per read or write event, replayed through the discard tracker
//! so rows emitted inside reverted checkpoint scopes are flagged rather
//! than removed. Every leaf hash carried by an event is re-derived from
//! its recorded preimage before the row is filled.

use wst_check::{
    IndexedLeaf, NullifierLeafValue, NullifierTreeCheckEvent, ScopedEvent,
};
use wst_primitives::{felt_from_u64, FELT_ONE, FELT_ZERO};

use crate::discard::replay_scoped;
use crate::error::{TraceError, TraceResult};
use crate::matrix::TraceMatrix;

/// Column indices for the nullifier tree trace
pub mod cols {
    pub const NULLIFIER: usize = 0;
    pub const CONTRACT_ADDRESS: usize = 1;
    pub const HAS_CONTRACT: usize = 2;
    pub const SILOED_NULLIFIER: usize = 3;
    pub const EXISTS: usize = 4;
    pub const COUNTER: usize = 5;
    pub const PREV_ROOT: usize = 6;
    pub const PREV_LEAF_COUNT: usize = 7;
    pub const NEXT_ROOT: usize = 8;
    pub const NEXT_LEAF_COUNT: usize = 9;
    pub const LOW_LEAF_NULLIFIER: usize = 10;
    pub const LOW_LEAF_NEXT_INDEX: usize = 11;
    pub const LOW_LEAF_NEXT_KEY: usize = 12;
    pub const LOW_LEAF_HASH: usize = 13;
    pub const LOW_LEAF_INDEX: usize = 14;
    pub const WRITE: usize = 15;
    pub const UPDATED_LOW_LEAF_HASH: usize = 16;
    pub const INTERMEDIATE_ROOT: usize = 17;
    pub const NEW_LEAF_HASH: usize = 18;
    pub const DISCARD: usize = 19;
}

pub const WIDTH: usize = 20;

pub fn build_trace(
    events: &[ScopedEvent<NullifierTreeCheckEvent>],
) -> TraceResult<TraceMatrix> {
    let mut matrix = TraceMatrix::new(WIDTH);
    replay_scoped(events, &mut matrix, cols::DISCARD, fill_event)?;
    Ok(matrix)
}

fn fill_event(event: &NullifierTreeCheckEvent, matrix: &mut TraceMatrix) -> TraceResult<()> {
    if event.low_leaf_preimage.hash() != event.low_leaf_hash {
        return Err(TraceError::WitnessMismatch {
            context: "nullifier event low leaf hash does not match its preimage",
        });
    }
    if let Some(witness) = &event.write_witness {
        let mut updated_low_leaf = event.low_leaf_preimage.clone();
        updated_low_leaf.next_index = event.prev_snapshot.next_available_leaf_index;
        updated_low_leaf.next_key = event.siloed_nullifier;
        if updated_low_leaf.hash() != witness.updated_low_leaf_hash {
            return Err(TraceError::WitnessMismatch {
                context: "nullifier event updated low leaf hash does not match its preimage",
            });
        }
        let new_leaf = IndexedLeaf::new(
            NullifierLeafValue::new(event.siloed_nullifier),
            event.low_leaf_preimage.next_index,
            event.low_leaf_preimage.next_key,
        );
        if witness.new_leaf_hash != Some(new_leaf.hash()) {
            return Err(TraceError::WitnessMismatch {
                context: "nullifier event new leaf hash does not match its preimage",
            });
        }
    }

    let row = matrix.push_row();
    matrix.set(row, cols::NULLIFIER, event.nullifier);
    if let Some(contract) = event.contract_address {
        matrix.set(row, cols::CONTRACT_ADDRESS, contract);
        matrix.set(row, cols::HAS_CONTRACT, FELT_ONE);
    }
    matrix.set(row, cols::SILOED_NULLIFIER, event.siloed_nullifier);
    if event.exists {
        matrix.set(row, cols::EXISTS, FELT_ONE);
    }
    matrix.set(row, cols::COUNTER, felt_from_u64(event.counter as u64));
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
    matrix.set(
        row,
        cols::LOW_LEAF_NULLIFIER,
        event.low_leaf_preimage.value.nullifier,
    );
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
