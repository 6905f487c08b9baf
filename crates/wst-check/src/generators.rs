//! Domain separator tags
//!
//! Each derived key hashes a small generator constant as its first input so
//! that values from different domains can never collide.

use wst_primitives::{felt_from_u64, Felt};

pub const NOTE_HASH_NONCE: u64 = 1;
pub const UNIQUE_NOTE_HASH: u64 = 2;
pub const SILOED_NOTE_HASH: u64 = 3;
pub const OUTER_NULLIFIER: u64 = 7;
pub const PUBLIC_LEAF_SLOT: u64 = 23;

#[inline]
pub fn generator(index: u64) -> Felt {
    felt_from_u64(index)
}
