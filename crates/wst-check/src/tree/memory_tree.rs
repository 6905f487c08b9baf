//! In-memory indexed tree oracle
//!
//! Answers the unconstrained witness queries the check services need: low
//! leaf lookup, sibling paths, leaf preimages and sequential insertion. It
//! discharges no proof obligations of its own; everything it hands out is
//! re-derived and validated by the gadgets.
//!
//! Nodes are stored sparsely per level with precomputed empty-subtree
//! hashes, so a height-40 tree costs memory proportional to its occupied
//! leaves.

use std::collections::BTreeMap;

use wst_primitives::{hash_pair, Felt, FELT_ZERO};

use crate::tree::leaves::{IndexedLeaf, IndexedLeafValue};
use crate::tree::snapshot::AppendOnlyTreeSnapshot;

/// Low leaf witness for a key query
#[derive(Debug, Clone, PartialEq)]
pub struct LowLeafWitness<V> {
    pub preimage: IndexedLeaf<V>,
    pub index: u64,
}

/// Sparse in-memory indexed Merkle tree
#[derive(Debug, Clone)]
pub struct MemoryIndexedTree<V> {
    height: usize,
    leaves: Vec<IndexedLeaf<V>>,
    /// Occupied nodes per level; level 0 holds leaf hashes
    nodes: Vec<BTreeMap<u64, Felt>>,
    /// Empty-subtree hash per level; an unset leaf slot hashes to zero
    zero_hashes: Vec<Felt>,
}

impl<V: IndexedLeafValue> MemoryIndexedTree<V> {
    /// Build a tree holding only the genesis leaf (key zero, pointing to
    /// infinity).
    pub fn new(height: usize) -> Self {
        let mut zero_hashes = Vec::with_capacity(height + 1);
        zero_hashes.push(FELT_ZERO);
        for level in 1..=height {
            let child = zero_hashes[level - 1];
            zero_hashes.push(hash_pair(child, child));
        }

        let mut tree = Self {
            height,
            leaves: Vec::new(),
            nodes: vec![BTreeMap::new(); height + 1],
            zero_hashes,
        };
        tree.append(IndexedLeaf::genesis());
        tree
    }

    /// Build a tree prefilled with `values`, inserted in order after the
    /// genesis leaf.
    pub fn from_values(height: usize, values: impl IntoIterator<Item = V>) -> Self {
        let mut tree = Self::new(height);
        for value in values {
            tree.insert(value);
        }
        tree
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of leaves, genesis included
    pub fn num_leaves(&self) -> u64 {
        self.leaves.len() as u64
    }

    pub fn root(&self) -> Felt {
        self.node(self.height, 0)
    }

    pub fn snapshot(&self) -> AppendOnlyTreeSnapshot {
        AppendOnlyTreeSnapshot::new(self.root(), self.num_leaves())
    }

    pub fn get_leaf_preimage(&self, index: u64) -> Option<&IndexedLeaf<V>> {
        self.leaves.get(index as usize)
    }

    /// Sibling path for a leaf index, leaf level first
    pub fn get_sibling_path(&self, index: u64) -> Vec<Felt> {
        (0..self.height)
            .map(|level| self.node(level, (index >> level) ^ 1))
            .collect()
    }

    /// The leaf bracketing `key`: the exact match if the key is present,
    /// otherwise the leaf with the greatest key strictly below it. The
    /// genesis leaf guarantees a result for every non-zero key.
    pub fn get_low_indexed_leaf(&self, key: Felt) -> LowLeafWitness<V> {
        let mut best = 0usize;
        let mut best_key = wst_primitives::felt_to_limbs(self.leaves[0].value.key());
        let key_limbs = wst_primitives::felt_to_limbs(key);
        for (i, leaf) in self.leaves.iter().enumerate() {
            let leaf_key = wst_primitives::felt_to_limbs(leaf.value.key());
            if leaf_key == key_limbs {
                return LowLeafWitness {
                    preimage: leaf.clone(),
                    index: i as u64,
                };
            }
            if leaf_key < key_limbs && leaf_key >= best_key {
                best = i;
                best_key = leaf_key;
            }
        }
        LowLeafWitness {
            preimage: self.leaves[best].clone(),
            index: best as u64,
        }
    }

    /// Insert or update a value, maintaining the sorted chain. An exact key
    /// match replaces the payload in place; otherwise the new leaf is
    /// spliced in after its low leaf and appended at the next free index.
    pub fn insert(&mut self, value: V) {
        let key = value.key();
        let low = self.get_low_indexed_leaf(key);
        let low_index = low.index as usize;

        if low.preimage.value.key() == key {
            self.leaves[low_index].value = value;
            let hash = self.leaves[low_index].hash();
            self.set_leaf_hash(low.index, hash);
            return;
        }

        let new_index = self.leaves.len() as u64;
        let new_leaf = IndexedLeaf::new(value, low.preimage.next_index, low.preimage.next_key);

        self.leaves[low_index].next_index = new_index;
        self.leaves[low_index].next_key = key;
        let updated_low_hash = self.leaves[low_index].hash();
        self.set_leaf_hash(low.index, updated_low_hash);

        self.append(new_leaf);
    }

    fn append(&mut self, leaf: IndexedLeaf<V>) {
        let index = self.leaves.len() as u64;
        let hash = leaf.hash();
        self.leaves.push(leaf);
        self.set_leaf_hash(index, hash);
    }

    fn node(&self, level: usize, index: u64) -> Felt {
        self.nodes[level]
            .get(&index)
            .copied()
            .unwrap_or(self.zero_hashes[level])
    }

    fn set_leaf_hash(&mut self, index: u64, hash: Felt) {
        self.nodes[0].insert(index, hash);
        let mut idx = index;
        for level in 1..=self.height {
            idx >>= 1;
            let parent = hash_pair(self.node(level - 1, idx * 2), self.node(level - 1, idx * 2 + 1));
            self.nodes[level].insert(idx, parent);
        }
    }
}
