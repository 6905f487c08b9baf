//! Field greater-than gadget trace
//!
//! One row per comparison, carrying both operands, their canonical limb
//! decompositions, the two modulus-subtraction witnesses and the result
//! witness with its borrow.

use wst_check::FieldGreaterThanEvent;
use wst_primitives::{felt_from_u128, felt_from_u64, FELT_ONE};

use crate::error::TraceResult;
use crate::matrix::TraceMatrix;

/// Column indices for the comparison trace
pub mod cols {
    pub const A: usize = 0;
    pub const B: usize = 1;
    pub const A_LIMB_HI: usize = 2;
    pub const A_LIMB_LO: usize = 3;
    pub const P_SUB_A_HI: usize = 4;
    pub const P_SUB_A_LO: usize = 5;
    pub const P_SUB_A_BORROW: usize = 6;
    pub const B_LIMB_HI: usize = 7;
    pub const B_LIMB_LO: usize = 8;
    pub const P_SUB_B_HI: usize = 9;
    pub const P_SUB_B_LO: usize = 10;
    pub const P_SUB_B_BORROW: usize = 11;
    pub const RES_HI: usize = 12;
    pub const RES_LO: usize = 13;
    pub const RES_BORROW: usize = 14;
    pub const RESULT: usize = 15;
}

pub const WIDTH: usize = 16;

pub fn build_trace(events: &[FieldGreaterThanEvent]) -> TraceResult<TraceMatrix> {
    let mut matrix = TraceMatrix::new(WIDTH);
    for event in events {
        let row = matrix.push_row();
        matrix.set(row, cols::A, event.a);
        matrix.set(row, cols::B, event.b);
        matrix.set(row, cols::A_LIMB_HI, felt_from_u128(event.a_limbs.hi));
        matrix.set(row, cols::A_LIMB_LO, felt_from_u128(event.a_limbs.lo));
        matrix.set(
            row,
            cols::P_SUB_A_HI,
            felt_from_u128(event.p_sub_a_witness.limbs.hi),
        );
        matrix.set(
            row,
            cols::P_SUB_A_LO,
            felt_from_u128(event.p_sub_a_witness.limbs.lo),
        );
        matrix.set(
            row,
            cols::P_SUB_A_BORROW,
            felt_from_u64(event.p_sub_a_witness.borrow as u64),
        );
        matrix.set(row, cols::B_LIMB_HI, felt_from_u128(event.b_limbs.hi));
        matrix.set(row, cols::B_LIMB_LO, felt_from_u128(event.b_limbs.lo));
        matrix.set(
            row,
            cols::P_SUB_B_HI,
            felt_from_u128(event.p_sub_b_witness.limbs.hi),
        );
        matrix.set(
            row,
            cols::P_SUB_B_LO,
            felt_from_u128(event.p_sub_b_witness.limbs.lo),
        );
        matrix.set(
            row,
            cols::P_SUB_B_BORROW,
            felt_from_u64(event.p_sub_b_witness.borrow as u64),
        );
        matrix.set(row, cols::RES_HI, felt_from_u128(event.res_witness.limbs.hi));
        matrix.set(row, cols::RES_LO, felt_from_u128(event.res_witness.limbs.lo));
        matrix.set(
            row,
            cols::RES_BORROW,
            felt_from_u64(event.res_witness.borrow as u64),
        );
        if event.result {
            matrix.set(row, cols::RESULT, FELT_ONE);
        }
    }
    Ok(matrix)
}
