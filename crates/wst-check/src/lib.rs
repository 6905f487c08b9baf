//! WST Check
//!
//! Checked world-state tree access for transaction simulation. Every tree
//! read or write runs through a witness-producing gadget (Merkle path
//! re-derivation, 256-bit field comparison, range checks) and a per-tree
//! service that derives domain keys, enforces the indexed-tree linked-list
//! invariants and logs one event per operation for later trace generation.
//!
//! # Architecture
//!
//! - `gadgets`: Merkle path, field greater-than and range check gadgets
//! - `tree`: indexed leaf types, snapshots and the in-memory witness oracle
//! - `checks`: the five per-tree services over the shared indexed core
//! - `squash`: end-of-simulation public data write squashing
//! - `events` / `checkpoint`: event logs and checkpoint scope plumbing

pub mod checkpoint;
pub mod checks;
pub mod error;
pub mod events;
pub mod gadgets;
pub mod generators;
pub mod squash;
pub mod tree;

pub use checkpoint::{CheckpointEvent, CheckpointListener};
pub use checks::{
    compute_leaf_slot, silo_note_hash, silo_nullifier, NoteHashTreeCheck, NoteHashTreeCheckEvent,
    NullifierTreeCheck, NullifierTreeCheckEvent, PublicDataTreeCheck, PublicDataTreeCheckEvent,
    RetrievedBytecodesTreeCheck, SetMembershipTreeCheck, SetMembershipTreeCheckEvent,
    WriteMode, WriteWitness, WrittenSlotsTreeCheck,
};
pub use error::{CheckError, CheckResult};
pub use events::{EventEmitter, ScopedEvent};
pub use gadgets::{
    FieldGreaterThan, FieldGreaterThanEvent, Gadgets, LimbsComparisonWitness, MerkleCheck,
    MerkleCheckEvent, RangeCheck, RangeCheckEvent,
};
pub use squash::{RecordedWrite, SquashedWriteEvent, WriteSquasher, PROTOCOL_EXECUTION_ID};
pub use tree::{
    AppendOnlyTreeSnapshot, IndexedLeaf, IndexedLeafValue, LowLeafWitness, MemoryIndexedTree,
    NullifierLeafValue, PublicDataLeafValue, RetrievedBytecodeLeafValue, SetLeafValue,
    WrittenSlotLeafValue, NOTE_HASH_TREE_HEIGHT, NULLIFIER_TREE_HEIGHT,
    PUBLIC_DATA_TREE_HEIGHT, RETRIEVED_BYTECODES_TREE_HEIGHT, WRITTEN_SLOTS_TREE_HEIGHT,
};
