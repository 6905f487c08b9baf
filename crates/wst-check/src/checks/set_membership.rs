//! Deduplicating set tree checks
//!
//! Unlike the nullifier and public data trees, whose state lives outside
//! the prover, the set trees are small and owned by the check service
//! itself: the tree is the only source of witness material, inserts of an
//! existing key degrade to membership checks, and checkpoints snapshot and
//! restore the whole tree. Two instances exist, one keyed by written public
//! data leaf slots and one by retrieved bytecode class ids.

use serde::{Deserialize, Serialize};
use wst_primitives::Felt;

use crate::checkpoint::{CheckpointEvent, CheckpointListener};
use crate::checks::indexed::{check_read, check_write, WriteMode, WriteWitness};
use crate::checks::public_data::compute_leaf_slot;
use crate::error::{CheckError, CheckResult};
use crate::events::{EventEmitter, ScopedEvent};
use crate::gadgets::Gadgets;
use crate::tree::{
    AppendOnlyTreeSnapshot, IndexedLeaf, MemoryIndexedTree, RetrievedBytecodeLeafValue,
    SetLeafValue, WrittenSlotLeafValue, RETRIEVED_BYTECODES_TREE_HEIGHT,
    WRITTEN_SLOTS_TREE_HEIGHT,
};

/// One set tree membership query or insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetMembershipTreeCheckEvent<V> {
    pub key: Felt,
    pub exists: bool,
    pub prev_snapshot: AppendOnlyTreeSnapshot,
    pub next_snapshot: AppendOnlyTreeSnapshot,
    pub low_leaf_preimage: IndexedLeaf<V>,
    pub low_leaf_hash: Felt,
    pub low_leaf_index: u64,
    pub write: bool,
    pub write_witness: Option<WriteWitness>,
}

/// Owned-state indexed set tree with checked inserts and membership
/// queries.
#[derive(Debug)]
pub struct SetMembershipTreeCheck<V: SetLeafValue> {
    tree: MemoryIndexedTree<V>,
    /// Tree states saved at checkpoint creation, innermost last
    saved: Vec<MemoryIndexedTree<V>>,
    events: EventEmitter<ScopedEvent<SetMembershipTreeCheckEvent<V>>>,
}

impl<V: SetLeafValue> SetMembershipTreeCheck<V> {
    pub fn new(height: usize) -> Self {
        Self {
            tree: MemoryIndexedTree::new(height),
            saved: Vec::new(),
            events: EventEmitter::new(),
        }
    }

    /// Number of keys inserted so far (the genesis leaf does not count)
    pub fn size(&self) -> u64 {
        self.tree.num_leaves() - 1
    }

    pub fn snapshot(&self) -> AppendOnlyTreeSnapshot {
        self.tree.snapshot()
    }

    /// Checked membership query against the owned tree.
    pub fn contains(&mut self, gadgets: &mut Gadgets, key: Felt) -> CheckResult<bool> {
        let snapshot = self.tree.snapshot();
        let low = self.tree.get_low_indexed_leaf(key);
        let sibling_path = self.tree.get_sibling_path(low.index);
        let read = check_read(
            gadgets,
            key,
            &low.preimage,
            low.index,
            &sibling_path,
            snapshot,
        )?;
        self.events
            .emit(ScopedEvent::Event(SetMembershipTreeCheckEvent {
                key,
                exists: read.exists,
                prev_snapshot: snapshot,
                next_snapshot: snapshot,
                low_leaf_preimage: low.preimage,
                low_leaf_hash: read.low_leaf_hash,
                low_leaf_index: low.index,
                write: false,
                write_witness: None,
            }));
        Ok(read.exists)
    }

    /// Insert `key`, a no-op with a membership proof when it is already
    /// present. Returns whether the key was already in the set.
    pub fn insert(&mut self, gadgets: &mut Gadgets, key: Felt) -> CheckResult<bool> {
        let prev_snapshot = self.tree.snapshot();
        let low = self.tree.get_low_indexed_leaf(key);
        let low_sibling_path = self.tree.get_sibling_path(low.index);

        // Stage the insert on a working copy: the insertion path is taken
        // against the tree state after the low leaf repoint, which is what
        // the append proof needs, but the owned tree only advances once the
        // write proof goes through.
        let mut staged = self.tree.clone();
        staged.insert(V::from_key(key));
        let insertion_sibling_path =
            staged.get_sibling_path(prev_snapshot.next_available_leaf_index);

        let write = check_write(
            gadgets,
            key,
            V::from_key(key),
            WriteMode::SetInsert,
            &low.preimage,
            low.index,
            &low_sibling_path,
            prev_snapshot,
            &insertion_sibling_path,
        )?;
        if write.next_snapshot != staged.snapshot() {
            return Err(CheckError::RootMismatch {
                computed: write.next_snapshot.root,
                expected: staged.root(),
            });
        }
        self.tree = staged;
        self.events
            .emit(ScopedEvent::Event(SetMembershipTreeCheckEvent {
                key,
                exists: write.exists,
                prev_snapshot,
                next_snapshot: write.next_snapshot,
                low_leaf_preimage: low.preimage,
                low_leaf_hash: write.low_leaf_hash,
                low_leaf_index: low.index,
                write: true,
                write_witness: write.witness,
            }));
        Ok(write.exists)
    }

    pub fn take_events(&mut self) -> Vec<ScopedEvent<SetMembershipTreeCheckEvent<V>>> {
        self.events.take()
    }
}

impl<V: SetLeafValue> CheckpointListener for SetMembershipTreeCheck<V> {
    fn on_checkpoint_created(&mut self) {
        self.saved.push(self.tree.clone());
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Create));
    }

    fn on_checkpoint_committed(&mut self) -> CheckResult<()> {
        self.saved
            .pop()
            .ok_or(CheckError::CheckpointStack { op: "commit" })?;
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Commit));
        Ok(())
    }

    fn on_checkpoint_reverted(&mut self) -> CheckResult<()> {
        self.tree = self
            .saved
            .pop()
            .ok_or(CheckError::CheckpointStack { op: "revert" })?;
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Revert));
        Ok(())
    }
}

/// Set of public data leaf slots written during the transaction
#[derive(Debug)]
pub struct WrittenSlotsTreeCheck {
    inner: SetMembershipTreeCheck<WrittenSlotLeafValue>,
}

impl WrittenSlotsTreeCheck {
    pub fn new() -> Self {
        Self {
            inner: SetMembershipTreeCheck::new(WRITTEN_SLOTS_TREE_HEIGHT),
        }
    }

    pub fn size(&self) -> u64 {
        self.inner.size()
    }

    pub fn snapshot(&self) -> AppendOnlyTreeSnapshot {
        self.inner.snapshot()
    }

    pub fn contains(
        &mut self,
        gadgets: &mut Gadgets,
        contract_address: Felt,
        slot: Felt,
    ) -> CheckResult<bool> {
        self.inner
            .contains(gadgets, compute_leaf_slot(contract_address, slot))
    }

    pub fn insert(
        &mut self,
        gadgets: &mut Gadgets,
        contract_address: Felt,
        slot: Felt,
    ) -> CheckResult<bool> {
        self.inner
            .insert(gadgets, compute_leaf_slot(contract_address, slot))
    }

    pub fn take_events(
        &mut self,
    ) -> Vec<ScopedEvent<SetMembershipTreeCheckEvent<WrittenSlotLeafValue>>> {
        self.inner.take_events()
    }
}

impl Default for WrittenSlotsTreeCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointListener for WrittenSlotsTreeCheck {
    fn on_checkpoint_created(&mut self) {
        self.inner.on_checkpoint_created();
    }

    fn on_checkpoint_committed(&mut self) -> CheckResult<()> {
        self.inner.on_checkpoint_committed()
    }

    fn on_checkpoint_reverted(&mut self) -> CheckResult<()> {
        self.inner.on_checkpoint_reverted()
    }
}

/// Set of bytecode class ids retrieved during the transaction
#[derive(Debug)]
pub struct RetrievedBytecodesTreeCheck {
    inner: SetMembershipTreeCheck<RetrievedBytecodeLeafValue>,
}

impl RetrievedBytecodesTreeCheck {
    pub fn new() -> Self {
        Self {
            inner: SetMembershipTreeCheck::new(RETRIEVED_BYTECODES_TREE_HEIGHT),
        }
    }

    pub fn size(&self) -> u64 {
        self.inner.size()
    }

    pub fn snapshot(&self) -> AppendOnlyTreeSnapshot {
        self.inner.snapshot()
    }

    pub fn contains(&mut self, gadgets: &mut Gadgets, class_id: Felt) -> CheckResult<bool> {
        self.inner.contains(gadgets, class_id)
    }

    pub fn insert(&mut self, gadgets: &mut Gadgets, class_id: Felt) -> CheckResult<bool> {
        self.inner.insert(gadgets, class_id)
    }

    pub fn take_events(
        &mut self,
    ) -> Vec<ScopedEvent<SetMembershipTreeCheckEvent<RetrievedBytecodeLeafValue>>> {
        self.inner.take_events()
    }
}

impl Default for RetrievedBytecodesTreeCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointListener for RetrievedBytecodesTreeCheck {
    fn on_checkpoint_created(&mut self) {
        self.inner.on_checkpoint_created();
    }

    fn on_checkpoint_committed(&mut self) -> CheckResult<()> {
        self.inner.on_checkpoint_committed()
    }

    fn on_checkpoint_reverted(&mut self) -> CheckResult<()> {
        self.inner.on_checkpoint_reverted()
    }
}
