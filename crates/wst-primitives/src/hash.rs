//! Black-box hash primitive
//!
//! Every Merkle node, leaf preimage and siloed key in WST is produced by a
//! single collision-resistant `hash(inputs) -> Felt` primitive. The check
//! subsystem treats it as opaque: nothing downstream depends on its
//! internals, only on determinism and collision resistance.
//!
//! The concrete instantiation hashes the canonical 32-byte representations
//! of the inputs with Blake2b (64-byte output, domain-separated personal
//! string) and maps the wide output uniformly into the field.

use blake2b_simd::Params;
use ff::{FromUniformBytes, PrimeField};

use crate::field::Felt;

/// Personalization string for the field-targeted hash
const HASH_PERSONAL: &[u8; 16] = b"wst.hash2field.1";

/// Hash a sequence of field elements into a single field element
pub fn hash_fields(inputs: &[Felt]) -> Felt {
    let mut state = Params::new()
        .hash_length(64)
        .personal(HASH_PERSONAL)
        .to_state();
    for input in inputs {
        state.update(input.to_repr().as_ref());
    }
    let digest = state.finalize();
    let mut wide = [0u8; 64];
    wide.copy_from_slice(digest.as_bytes());
    Felt::from_uniform_bytes(&wide)
}

/// Hash a pair of field elements; this is the Merkle node combiner
#[inline]
pub fn hash_pair(left: Felt, right: Felt) -> Felt {
    hash_fields(&[left, right])
}
