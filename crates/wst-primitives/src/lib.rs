//! WST Primitives
//!
//! Fundamental building blocks for the world-state tree check subsystem:
//! - Field arithmetic over the BN254 scalar field (256-bit prime field)
//! - Canonical-integer limb decomposition used by the comparison gadget
//! - The black-box hash primitive used for Merkle nodes and leaf preimages

pub mod field;
pub mod hash;

pub use field::{
    felt_from_limbs, felt_from_u128, felt_from_u64, felt_gt, felt_to_hex, felt_to_limbs, Felt,
    U256Limbs, FELT_ONE, FELT_ZERO, MODULUS_HI, MODULUS_LIMBS, MODULUS_LO,
};
pub use hash::{hash_fields, hash_pair};
