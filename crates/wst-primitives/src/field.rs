//! Field arithmetic over the BN254 scalar field
//!
//! Every committed tree value in WST is an element of the BN254 scalar field
//! (a 256-bit prime field). The constraint system cannot compare field
//! elements natively, so this module also exposes the canonical-integer view
//! of an element as a pair of 128-bit limbs, which is what the comparison
//! gadget decomposes into.

use ff::PrimeField;
use halo2curves::bn256::Fr;
use serde::{Deserialize, Serialize};

/// The field element type used throughout WST
pub type Felt = Fr;

/// Zero in the field
pub const FELT_ZERO: Felt = <Fr as ff::Field>::ZERO;

/// One in the field
pub const FELT_ONE: Felt = <Fr as ff::Field>::ONE;

/// Low 128 bits of the field modulus
/// r = 0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001
pub const MODULUS_LO: u128 = 0x2833e84879b9709143e1f593f0000001;

/// High 128 bits of the field modulus
pub const MODULUS_HI: u128 = 0x30644e72e131a029b85045b68181585d;

/// Canonical integer representative of a field element, split into two
/// 128-bit limbs.
///
/// `hi` is declared before `lo` so the derived `Ord` is the 256-bit integer
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct U256Limbs {
    pub hi: u128,
    pub lo: u128,
}

/// The field modulus as limbs
pub const MODULUS_LIMBS: U256Limbs = U256Limbs {
    hi: MODULUS_HI,
    lo: MODULUS_LO,
};

impl U256Limbs {
    pub const ZERO: U256Limbs = U256Limbs { hi: 0, lo: 0 };

    /// Subtract `rhs` from `self`, returning the difference limbs and the
    /// borrow propagated from the low limb into the high limb.
    ///
    /// Caller must guarantee `self >= rhs`; both operands of every
    /// subtraction in the comparison gadget are canonical representatives,
    /// so the high limb never underflows.
    pub fn borrowing_sub(self, rhs: U256Limbs) -> (U256Limbs, bool) {
        let (lo, borrow) = self.lo.overflowing_sub(rhs.lo);
        let hi = self.hi.wrapping_sub(rhs.hi).wrapping_sub(borrow as u128);
        (U256Limbs { hi, lo }, borrow)
    }

    /// The integer successor, with carry from the low limb.
    pub fn succ(self) -> U256Limbs {
        let lo = self.lo.wrapping_add(1);
        let hi = self.hi.wrapping_add((lo == 0) as u128);
        U256Limbs { hi, lo }
    }
}

/// Convert a u64 to a field element
#[inline]
pub fn felt_from_u64(value: u64) -> Felt {
    Fr::from(value)
}

/// Convert a u128 to a field element
#[inline]
pub fn felt_from_u128(value: u128) -> Felt {
    Fr::from_u128(value)
}

/// Decompose a field element into its canonical 128-bit limbs
pub fn felt_to_limbs(value: Felt) -> U256Limbs {
    let repr = value.to_repr();
    let bytes: &[u8] = repr.as_ref();
    let mut lo = [0u8; 16];
    let mut hi = [0u8; 16];
    lo.copy_from_slice(&bytes[..16]);
    hi.copy_from_slice(&bytes[16..]);
    U256Limbs {
        hi: u128::from_le_bytes(hi),
        lo: u128::from_le_bytes(lo),
    }
}

/// Reassemble a field element from 128-bit limbs.
///
/// The limbs must form a canonical representative (strictly below the
/// modulus); `Fr::from_raw` reduces otherwise.
pub fn felt_from_limbs(limbs: U256Limbs) -> Felt {
    Fr::from_raw([
        limbs.lo as u64,
        (limbs.lo >> 64) as u64,
        limbs.hi as u64,
        (limbs.hi >> 64) as u64,
    ])
}

/// Integer comparison of two field elements via their canonical
/// representatives
pub fn felt_gt(a: Felt, b: Felt) -> bool {
    felt_to_limbs(a) > felt_to_limbs(b)
}

/// Hex rendering of a field element (big-endian, 0x-prefixed), for error
/// messages and debugging
pub fn felt_to_hex(value: Felt) -> String {
    let repr = value.to_repr();
    let mut bytes: Vec<u8> = repr.as_ref().to_vec();
    bytes.reverse();
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;

    #[test]
    fn test_limbs_roundtrip() {
        let samples = [
            FELT_ZERO,
            FELT_ONE,
            felt_from_u64(u64::MAX),
            felt_from_u128(u128::MAX),
            -FELT_ONE,
        ];
        for felt in samples {
            assert_eq!(felt_from_limbs(felt_to_limbs(felt)), felt);
        }
    }

    #[test]
    fn test_modulus_limbs_match_neg_one() {
        // -1 is the largest canonical representative: r - 1
        let neg_one = felt_to_limbs(-FELT_ONE);
        let (expected, borrow) = MODULUS_LIMBS.borrowing_sub(U256Limbs { hi: 0, lo: 1 });
        assert!(!borrow);
        assert_eq!(neg_one, expected);
    }

    #[test]
    fn test_limb_ordering() {
        assert!(felt_gt(FELT_ONE, FELT_ZERO));
        assert!(felt_gt(-FELT_ONE, FELT_ONE));
        assert!(!felt_gt(FELT_ONE, FELT_ONE));
        assert!(!felt_gt(FELT_ZERO, -FELT_ONE));
    }

    #[test]
    fn test_borrowing_sub_borrow_bit() {
        let a = U256Limbs { hi: 1, lo: 0 };
        let b = U256Limbs { hi: 0, lo: 1 };
        let (diff, borrow) = a.borrowing_sub(b);
        assert!(borrow);
        assert_eq!(diff, U256Limbs { hi: 0, lo: u128::MAX });
    }

    #[test]
    fn test_succ_carry() {
        let x = U256Limbs { hi: 0, lo: u128::MAX };
        assert_eq!(x.succ(), U256Limbs { hi: 1, lo: 0 });
    }

    #[test]
    fn test_felt_from_u128_matches_limbs() {
        let value = 0x1234_5678_9abc_def0_1122_3344_5566_7788u128;
        let limbs = felt_to_limbs(felt_from_u128(value));
        assert_eq!(limbs, U256Limbs { hi: 0, lo: value });
    }
}
