//! Tree state: snapshots, leaf types and the in-memory oracle

pub mod leaves;
pub mod memory_tree;
pub mod snapshot;

pub use leaves::{
    IndexedLeaf, IndexedLeafValue, NullifierLeafValue, PublicDataLeafValue,
    RetrievedBytecodeLeafValue, SetLeafValue, WrittenSlotLeafValue, NOTE_HASH_TREE_HEIGHT,
    NULLIFIER_TREE_HEIGHT, PUBLIC_DATA_TREE_HEIGHT, RETRIEVED_BYTECODES_TREE_HEIGHT,
    WRITTEN_SLOTS_TREE_HEIGHT,
};
pub use memory_tree::{LowLeafWitness, MemoryIndexedTree};
pub use snapshot::AppendOnlyTreeSnapshot;
