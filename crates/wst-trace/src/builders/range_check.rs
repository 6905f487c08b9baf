//! Range check gadget trace
//!
//! One row per checked value, decomposed into eight 16-bit registers in
//! little-endian order. The register columns are what a lookup argument
//! constrains; `NUM_BITS` selects how many registers participate.

use wst_check::RangeCheckEvent;
use wst_primitives::{felt_from_u128, felt_from_u64};

use crate::error::TraceResult;
use crate::matrix::TraceMatrix;

pub const NUM_REGISTERS: usize = 8;

/// Column indices for the range check trace
pub mod cols {
    pub const VALUE: usize = 0;
    pub const NUM_BITS: usize = 1;
    /// Eight 16-bit registers, least significant first
    pub const REGISTERS_START: usize = 2;
}

pub const WIDTH: usize = cols::REGISTERS_START + NUM_REGISTERS;

pub fn build_trace(events: &[RangeCheckEvent]) -> TraceResult<TraceMatrix> {
    let mut matrix = TraceMatrix::new(WIDTH);
    for event in events {
        let row = matrix.push_row();
        matrix.set(row, cols::VALUE, felt_from_u128(event.value));
        matrix.set(row, cols::NUM_BITS, felt_from_u64(event.num_bits as u64));
        for register in 0..NUM_REGISTERS {
            let chunk = (event.value >> (16 * register)) as u16;
            matrix.set(
                row,
                cols::REGISTERS_START + register,
                felt_from_u64(chunk as u64),
            );
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wst_check::RangeCheck;
    use wst_primitives::FELT_ZERO;

    #[test]
    fn test_register_decomposition() {
        let mut range = RangeCheck::default();
        range.assert_range(0x0003_0002_0001, 64).unwrap();

        let matrix = build_trace(&range.take_events()).unwrap();
        assert_eq!(matrix.num_rows(), 1);
        assert_eq!(matrix.get(0, cols::REGISTERS_START), felt_from_u64(1));
        assert_eq!(matrix.get(0, cols::REGISTERS_START + 1), felt_from_u64(2));
        assert_eq!(matrix.get(0, cols::REGISTERS_START + 2), felt_from_u64(3));
        for register in 3..NUM_REGISTERS {
            assert_eq!(matrix.get(0, cols::REGISTERS_START + register), FELT_ZERO);
        }
        assert_eq!(matrix.get(0, cols::NUM_BITS), felt_from_u64(64));
    }
}
