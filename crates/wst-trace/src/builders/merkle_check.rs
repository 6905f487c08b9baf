//! Merkle check gadget trace
//!
//! One row per tree level per event. A read-only event fills the write
//! accumulator with a mirror of the read side so the same constraint set
//! applies to every row; a write event carries both hash chains. The
//! builder re-derives both chains from the recorded sibling path and
//! rejects events whose roots do not match.

use wst_check::MerkleCheckEvent;
use wst_primitives::{felt_from_u64, hash_pair, FELT_ONE};

use crate::error::{TraceError, TraceResult};
use crate::matrix::TraceMatrix;

/// Column indices for the Merkle check trace
pub mod cols {
    /// First row of an event
    pub const START: usize = 0;
    /// Last row of an event; the accumulators' parents are the roots
    pub const END: usize = 1;
    pub const LEVEL: usize = 2;
    pub const INDEX_BIT: usize = 3;
    pub const SIBLING: usize = 4;
    pub const READ_NODE: usize = 5;
    pub const WRITE_NODE: usize = 6;
    pub const IS_WRITE: usize = 7;
    pub const READ_ROOT: usize = 8;
    pub const WRITE_ROOT: usize = 9;
}

pub const WIDTH: usize = 10;

pub fn build_trace(events: &[MerkleCheckEvent]) -> TraceResult<TraceMatrix> {
    let mut matrix = TraceMatrix::new(WIDTH);
    for event in events {
        fill_event(event, &mut matrix)?;
    }
    Ok(matrix)
}

fn fill_event(event: &MerkleCheckEvent, matrix: &mut TraceMatrix) -> TraceResult<()> {
    let is_write = event.new_leaf_value.is_some();
    let mut read_node = event.leaf_value;
    let mut write_node = event.new_leaf_value.unwrap_or(event.leaf_value);
    let levels = event.sibling_path.len();

    let mut rows = Vec::with_capacity(levels);
    for (level, &sibling) in event.sibling_path.iter().enumerate() {
        let bit = (event.leaf_index >> level) & 1;
        rows.push((level, bit, sibling, read_node, write_node));
        let (read_l, read_r) = if bit == 0 {
            (read_node, sibling)
        } else {
            (sibling, read_node)
        };
        let (write_l, write_r) = if bit == 0 {
            (write_node, sibling)
        } else {
            (sibling, write_node)
        };
        read_node = hash_pair(read_l, read_r);
        write_node = hash_pair(write_l, write_r);
    }

    if read_node != event.root {
        return Err(TraceError::WitnessMismatch {
            context: "merkle event read root does not match sibling path",
        });
    }
    let write_root = event.new_root.unwrap_or(event.root);
    if write_node != write_root {
        return Err(TraceError::WitnessMismatch {
            context: "merkle event write root does not match sibling path",
        });
    }

    for (level, bit, sibling, read, write) in rows {
        let row = matrix.push_row();
        if level == 0 {
            matrix.set(row, cols::START, FELT_ONE);
        }
        if level == levels - 1 {
            matrix.set(row, cols::END, FELT_ONE);
        }
        matrix.set(row, cols::LEVEL, felt_from_u64(level as u64));
        matrix.set(row, cols::INDEX_BIT, felt_from_u64(bit));
        matrix.set(row, cols::SIBLING, sibling);
        matrix.set(row, cols::READ_NODE, read);
        matrix.set(row, cols::WRITE_NODE, write);
        if is_write {
            matrix.set(row, cols::IS_WRITE, FELT_ONE);
        }
        matrix.set(row, cols::READ_ROOT, event.root);
        matrix.set(row, cols::WRITE_ROOT, write_root);
    }
    Ok(())
}
