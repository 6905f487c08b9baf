//! Indexed tree leaf types
//!
//! Leaves of an indexed tree form a sorted singly-linked chain: each
//! preimage carries a forward pointer `(next_index, next_key)` to the leaf
//! with the next-higher key, with `(0, 0)` marking the current maximum. The
//! low leaf bracketing a queried key is what makes non-membership provable.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use wst_primitives::{felt_from_u64, hash_fields, Felt, FELT_ZERO};

/// Tree heights, fixed per tree type
pub const NULLIFIER_TREE_HEIGHT: usize = 40;
pub const PUBLIC_DATA_TREE_HEIGHT: usize = 40;
pub const NOTE_HASH_TREE_HEIGHT: usize = 40;
pub const WRITTEN_SLOTS_TREE_HEIGHT: usize = 10;
pub const RETRIEVED_BYTECODES_TREE_HEIGHT: usize = 10;

/// The domain payload of one indexed tree slot.
pub trait IndexedLeafValue: Clone + PartialEq + Debug {
    /// The key the linked-list chain is ordered by
    fn key(&self) -> Felt;

    /// Field encoding of the payload, in the fixed preimage hash order
    fn hash_inputs(&self) -> Vec<Felt>;

    /// The genesis/minimum leaf payload (key zero)
    fn empty() -> Self;
}

/// One slot of an indexed tree: payload plus chain pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedLeaf<V> {
    pub value: V,
    pub next_index: u64,
    pub next_key: Felt,
}

impl<V: IndexedLeafValue> IndexedLeaf<V> {
    pub fn new(value: V, next_index: u64, next_key: Felt) -> Self {
        Self {
            value,
            next_index,
            next_key,
        }
    }

    /// The genesis leaf: key zero, pointing to infinity
    pub fn genesis() -> Self {
        Self::new(V::empty(), 0, FELT_ZERO)
    }

    /// True when this leaf currently holds the maximum key in the tree
    pub fn points_to_infinity(&self) -> bool {
        self.next_index == 0 && self.next_key == FELT_ZERO
    }

    /// Hash inputs: payload fields, then the chain pointer
    pub fn hash_inputs(&self) -> Vec<Felt> {
        let mut inputs = self.value.hash_inputs();
        inputs.push(felt_from_u64(self.next_index));
        inputs.push(self.next_key);
        inputs
    }

    /// The Merkle-hashed preimage
    pub fn hash(&self) -> Felt {
        hash_fields(&self.hash_inputs())
    }
}

/// Nullifier tree payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierLeafValue {
    pub nullifier: Felt,
}

impl NullifierLeafValue {
    pub fn new(nullifier: Felt) -> Self {
        Self { nullifier }
    }
}

impl IndexedLeafValue for NullifierLeafValue {
    fn key(&self) -> Felt {
        self.nullifier
    }

    fn hash_inputs(&self) -> Vec<Felt> {
        vec![self.nullifier]
    }

    fn empty() -> Self {
        Self::new(FELT_ZERO)
    }
}

/// Public data (storage) tree payload: a slot and its stored word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDataLeafValue {
    pub slot: Felt,
    pub value: Felt,
}

impl PublicDataLeafValue {
    pub fn new(slot: Felt, value: Felt) -> Self {
        Self { slot, value }
    }
}

impl IndexedLeafValue for PublicDataLeafValue {
    fn key(&self) -> Felt {
        self.slot
    }

    fn hash_inputs(&self) -> Vec<Felt> {
        vec![self.slot, self.value]
    }

    fn empty() -> Self {
        Self::new(FELT_ZERO, FELT_ZERO)
    }
}

/// Presence-only payloads used by the deduplicating set trees. The key is
/// the entire payload.
pub trait SetLeafValue: IndexedLeafValue {
    fn from_key(key: Felt) -> Self;
}

/// Written public data slot set payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenSlotLeafValue {
    pub slot: Felt,
}

impl IndexedLeafValue for WrittenSlotLeafValue {
    fn key(&self) -> Felt {
        self.slot
    }

    fn hash_inputs(&self) -> Vec<Felt> {
        vec![self.slot]
    }

    fn empty() -> Self {
        Self { slot: FELT_ZERO }
    }
}

impl SetLeafValue for WrittenSlotLeafValue {
    fn from_key(key: Felt) -> Self {
        Self { slot: key }
    }
}

/// Retrieved bytecode class id set payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedBytecodeLeafValue {
    pub class_id: Felt,
}

impl IndexedLeafValue for RetrievedBytecodeLeafValue {
    fn key(&self) -> Felt {
        self.class_id
    }

    fn hash_inputs(&self) -> Vec<Felt> {
        vec![self.class_id]
    }

    fn empty() -> Self {
        Self {
            class_id: FELT_ZERO,
        }
    }
}

impl SetLeafValue for RetrievedBytecodeLeafValue {
    fn from_key(key: Felt) -> Self {
        Self { class_id: key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wst_primitives::felt_from_u64;

    #[test]
    fn test_genesis_points_to_infinity() {
        let genesis: IndexedLeaf<NullifierLeafValue> = IndexedLeaf::genesis();
        assert!(genesis.points_to_infinity());
        assert_eq!(genesis.value.key(), FELT_ZERO);
    }

    #[test]
    fn test_hash_inputs_order() {
        let leaf = IndexedLeaf::new(
            PublicDataLeafValue::new(felt_from_u64(5), felt_from_u64(27)),
            3,
            felt_from_u64(9),
        );
        assert_eq!(
            leaf.hash_inputs(),
            vec![
                felt_from_u64(5),
                felt_from_u64(27),
                felt_from_u64(3),
                felt_from_u64(9),
            ]
        );
    }

    #[test]
    fn test_pointer_affects_hash() {
        let a = IndexedLeaf::new(NullifierLeafValue::new(felt_from_u64(5)), 0, FELT_ZERO);
        let mut b = a.clone();
        b.next_index = 1;
        assert_ne!(a.hash(), b.hash());
    }
}
