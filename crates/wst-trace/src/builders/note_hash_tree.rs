//! Note hash tree check trace
//!
//! One row per read or append, with selector columns for the optional
//! siloing and uniqueness transforms.

use wst_check::{NoteHashTreeCheckEvent, ScopedEvent};
use wst_primitives::{felt_from_u64, FELT_ONE};

use crate::discard::replay_scoped;
use crate::error::TraceResult;
use crate::matrix::TraceMatrix;

/// Column indices for the note hash tree trace
pub mod cols {
    pub const NOTE_HASH: usize = 0;
    pub const CONTRACT_ADDRESS: usize = 1;
    pub const SHOULD_SILO: usize = 2;
    pub const COUNTER: usize = 3;
    pub const SHOULD_UNIQUE: usize = 4;
    pub const SILOED_NOTE_HASH: usize = 5;
    pub const UNIQUE_NOTE_HASH: usize = 6;
    pub const LEAF_INDEX: usize = 7;
    pub const PREV_ROOT: usize = 8;
    pub const PREV_LEAF_COUNT: usize = 9;
    pub const NEXT_ROOT: usize = 10;
    pub const NEXT_LEAF_COUNT: usize = 11;
    pub const WRITE: usize = 12;
    pub const DISCARD: usize = 13;
}

pub const WIDTH: usize = 14;

pub fn build_trace(
    events: &[ScopedEvent<NoteHashTreeCheckEvent>],
) -> TraceResult<TraceMatrix> {
    let mut matrix = TraceMatrix::new(WIDTH);
    replay_scoped(events, &mut matrix, cols::DISCARD, fill_event)?;
    Ok(matrix)
}

fn fill_event(event: &NoteHashTreeCheckEvent, matrix: &mut TraceMatrix) -> TraceResult<()> {
    let row = matrix.push_row();
    matrix.set(row, cols::NOTE_HASH, event.note_hash);
    if let Some(contract) = event.contract_address {
        matrix.set(row, cols::CONTRACT_ADDRESS, contract);
        matrix.set(row, cols::SHOULD_SILO, FELT_ONE);
    }
    if let Some(counter) = event.counter {
        matrix.set(row, cols::COUNTER, felt_from_u64(counter as u64));
        matrix.set(row, cols::SHOULD_UNIQUE, FELT_ONE);
    }
    matrix.set(row, cols::SILOED_NOTE_HASH, event.siloed_note_hash);
    matrix.set(row, cols::UNIQUE_NOTE_HASH, event.unique_note_hash);
    matrix.set(row, cols::LEAF_INDEX, felt_from_u64(event.leaf_index));
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
    if event.write {
        matrix.set(row, cols::WRITE, FELT_ONE);
    }
    Ok(())
}
