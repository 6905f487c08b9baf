//! Squashed public data write trace
//!
//! One row per surviving write, already sorted by `(leaf_slot,
//! execution_id)` by the squasher. Sort-order proof obligations live in the
//! comparison and range check traces; this trace carries the survivors.

use wst_check::SquashedWriteEvent;
use wst_primitives::felt_from_u64;

use crate::error::TraceResult;
use crate::matrix::TraceMatrix;

/// Column indices for the squashed write trace
pub mod cols {
    pub const LEAF_SLOT: usize = 0;
    pub const VALUE: usize = 1;
    pub const EXECUTION_ID: usize = 2;
}

pub const WIDTH: usize = 3;

pub fn build_trace(events: &[SquashedWriteEvent]) -> TraceResult<TraceMatrix> {
    let mut matrix = TraceMatrix::new(WIDTH);
    for event in events {
        let row = matrix.push_row();
        matrix.set(row, cols::LEAF_SLOT, event.leaf_slot);
        matrix.set(row, cols::VALUE, event.value);
        matrix.set(
            row,
            cols::EXECUTION_ID,
            felt_from_u64(event.execution_id as u64),
        );
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wst_check::{FieldGreaterThan, RangeCheck, RecordedWrite, WriteSquasher};
    use wst_primitives::felt_from_u64;

    #[test]
    fn test_survivor_rows() {
        let mut squasher = WriteSquasher::new();
        squasher.record(RecordedWrite {
            leaf_slot: felt_from_u64(5),
            value: felt_from_u64(1),
            execution_id: 1,
        });
        squasher.record(RecordedWrite {
            leaf_slot: felt_from_u64(5),
            value: felt_from_u64(2),
            execution_id: 2,
        });
        let mut field_gt = FieldGreaterThan::default();
        let mut range = RangeCheck::default();
        squasher.squash(&mut field_gt, &mut range).unwrap();

        let matrix = build_trace(&squasher.take_events()).unwrap();
        assert_eq!(matrix.num_rows(), 1);
        assert_eq!(matrix.get(0, cols::VALUE), felt_from_u64(2));
        assert_eq!(matrix.get(0, cols::EXECUTION_ID), felt_from_u64(2));
    }
}
