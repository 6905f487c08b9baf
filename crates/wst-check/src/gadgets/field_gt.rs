//! Field greater-than gadget
//!
//! Decides `a > b` for two elements of a field with no native ordering, by
//! lifting both operands to their canonical 256-bit representatives and
//! producing a decomposition witness the constraint system can re-check.
//!
//! The witness consists of five 128-bit limb pairs, every limb
//! range-checked: `a`, `p - a`, `b`, `p - b` (well-formedness of the
//! canonical representatives) and `res`, where `res = a - b - 1` when
//! `a > b` and `res = b - a` otherwise. The claimed direction is certified
//! by `res` staying within 128-bit limbs: a flipped claim forces an
//! underflow that the limb range checks reject.

use serde::{Deserialize, Serialize};
use wst_primitives::{felt_to_limbs, Felt, U256Limbs, MODULUS_LIMBS};

use crate::error::CheckResult;
use crate::events::EventEmitter;
use crate::gadgets::range_check::RangeCheck;

/// A borrow-tracked limb subtraction result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimbsComparisonWitness {
    pub limbs: U256Limbs,
    pub borrow: bool,
}

/// One comparison with every intermediate witness value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGreaterThanEvent {
    pub a: Felt,
    pub b: Felt,
    pub a_limbs: U256Limbs,
    pub p_sub_a_witness: LimbsComparisonWitness,
    pub b_limbs: U256Limbs,
    pub p_sub_b_witness: LimbsComparisonWitness,
    pub res_witness: LimbsComparisonWitness,
    pub result: bool,
}

/// The field comparison gadget. Owns its event log; range obligations go
/// through the injected range check gadget.
#[derive(Debug, Default)]
pub struct FieldGreaterThan {
    events: EventEmitter<FieldGreaterThanEvent>,
}

impl FieldGreaterThan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide `a > b` over the canonical representatives. Equal operands
    /// yield `false`. Emits exactly one event per call.
    pub fn ff_gt(&mut self, range: &mut RangeCheck, a: Felt, b: Felt) -> CheckResult<bool> {
        let a_limbs = felt_to_limbs(a);
        let b_limbs = felt_to_limbs(b);

        // The operand decompositions are obligations of their own, not just
        // the subtraction witnesses derived from them
        range.assert_range(a_limbs.lo, 128)?;
        range.assert_range(a_limbs.hi, 128)?;
        range.assert_range(b_limbs.lo, 128)?;
        range.assert_range(b_limbs.hi, 128)?;

        let p_sub_a_witness = constrained_subtract(MODULUS_LIMBS, a_limbs, range)?;
        let p_sub_b_witness = constrained_subtract(MODULUS_LIMBS, b_limbs, range)?;

        let result = a_limbs > b_limbs;
        let res_witness = if result {
            // a - b - 1; the subtrahend b + 1 cannot overflow 256 bits
            // because b < p < 2^254
            constrained_subtract(a_limbs, b_limbs.succ(), range)?
        } else {
            constrained_subtract(b_limbs, a_limbs, range)?
        };

        self.events.emit(FieldGreaterThanEvent {
            a,
            b,
            a_limbs,
            p_sub_a_witness,
            b_limbs,
            p_sub_b_witness,
            res_witness,
            result,
        });
        Ok(result)
    }

    pub fn take_events(&mut self) -> Vec<FieldGreaterThanEvent> {
        self.events.take()
    }
}

/// Limb subtraction with explicit borrow propagation, range-checking both
/// difference limbs to 128 bits.
fn constrained_subtract(
    minuend: U256Limbs,
    subtrahend: U256Limbs,
    range: &mut RangeCheck,
) -> CheckResult<LimbsComparisonWitness> {
    let (limbs, borrow) = minuend.borrowing_sub(subtrahend);
    range.assert_range(limbs.lo, 128)?;
    range.assert_range(limbs.hi, 128)?;
    Ok(LimbsComparisonWitness { limbs, borrow })
}
