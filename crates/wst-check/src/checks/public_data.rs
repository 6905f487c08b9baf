//! Public data (storage) tree check service
//!
//! Storage slots are keyed by `leaf_slot = hash(tag, contract, slot)` and
//! carry a stored word. Reads of absent slots must report the zero word;
//! writes upsert (update in place when the slot exists, splice otherwise)
//! and feed the write squasher, which proves last-write-wins ordering at
//! simulation end.

use serde::{Deserialize, Serialize};
use wst_primitives::{hash_fields, Felt, FELT_ZERO};

use crate::checkpoint::{CheckpointEvent, CheckpointListener};
use crate::checks::indexed::{check_read, check_write, WriteMode, WriteWitness};
use crate::error::{CheckError, CheckResult};
use crate::events::{EventEmitter, ScopedEvent};
use crate::gadgets::Gadgets;
use crate::generators;
use crate::squash::{RecordedWrite, SquashedWriteEvent, WriteSquasher};
use crate::tree::{AppendOnlyTreeSnapshot, IndexedLeaf, PublicDataLeafValue};

/// Derive the tree key for a contract storage slot
pub fn compute_leaf_slot(contract_address: Felt, slot: Felt) -> Felt {
    hash_fields(&[
        generators::generator(generators::PUBLIC_LEAF_SLOT),
        contract_address,
        slot,
    ])
}

/// One public data tree read or write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicDataTreeCheckEvent {
    pub contract_address: Felt,
    pub slot: Felt,
    pub leaf_slot: Felt,
    pub value: Felt,
    pub exists: bool,
    /// Write ordering id; reads carry zero
    pub execution_id: u32,
    pub prev_snapshot: AppendOnlyTreeSnapshot,
    pub next_snapshot: AppendOnlyTreeSnapshot,
    pub low_leaf_preimage: IndexedLeaf<PublicDataLeafValue>,
    pub low_leaf_hash: Felt,
    pub low_leaf_index: u64,
    pub write: bool,
    pub write_witness: Option<WriteWitness>,
}

/// Stateless check service over caller-provided witness material, plus the
/// write squasher it feeds.
#[derive(Debug, Default)]
pub struct PublicDataTreeCheck {
    events: EventEmitter<ScopedEvent<PublicDataTreeCheckEvent>>,
    squasher: WriteSquasher,
    checkpoint_depth: u32,
}

impl PublicDataTreeCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prove that reading `slot` under `snapshot` yields `value_claim`
    /// (the zero word for absent slots).
    #[allow(clippy::too_many_arguments)]
    pub fn assert_read(
        &mut self,
        gadgets: &mut Gadgets,
        contract_address: Felt,
        slot: Felt,
        value_claim: Felt,
        low_leaf: IndexedLeaf<PublicDataLeafValue>,
        low_leaf_index: u64,
        sibling_path: &[Felt],
        snapshot: AppendOnlyTreeSnapshot,
    ) -> CheckResult<()> {
        let leaf_slot = compute_leaf_slot(contract_address, slot);
        let read = check_read(
            gadgets,
            leaf_slot,
            &low_leaf,
            low_leaf_index,
            sibling_path,
            snapshot,
        )?;
        let stored = if read.exists {
            low_leaf.value.value
        } else {
            FELT_ZERO
        };
        if value_claim != stored {
            return Err(CheckError::ValueMismatch {
                claimed: value_claim,
                stored,
            });
        }
        self.events
            .emit(ScopedEvent::Event(PublicDataTreeCheckEvent {
                contract_address,
                slot,
                leaf_slot,
                value: value_claim,
                exists: read.exists,
                execution_id: 0,
                prev_snapshot: snapshot,
                next_snapshot: snapshot,
                low_leaf_preimage: low_leaf,
                low_leaf_hash: read.low_leaf_hash,
                low_leaf_index,
                write: false,
                write_witness: None,
            }));
        Ok(())
    }

    /// Write `value` to `slot`, returning the replacement snapshot and
    /// recording the write for end-of-simulation squashing. Protocol-level
    /// writes pass `PROTOCOL_EXECUTION_ID`.
    #[allow(clippy::too_many_arguments)]
    pub fn write(
        &mut self,
        gadgets: &mut Gadgets,
        contract_address: Felt,
        slot: Felt,
        value: Felt,
        execution_id: u32,
        low_leaf: IndexedLeaf<PublicDataLeafValue>,
        low_leaf_index: u64,
        low_leaf_sibling_path: &[Felt],
        prev_snapshot: AppendOnlyTreeSnapshot,
        insertion_sibling_path: &[Felt],
    ) -> CheckResult<AppendOnlyTreeSnapshot> {
        let leaf_slot = compute_leaf_slot(contract_address, slot);
        let write = check_write(
            gadgets,
            leaf_slot,
            PublicDataLeafValue::new(leaf_slot, value),
            WriteMode::Upsert,
            &low_leaf,
            low_leaf_index,
            low_leaf_sibling_path,
            prev_snapshot,
            insertion_sibling_path,
        )?;
        self.squasher.record(RecordedWrite {
            leaf_slot,
            value,
            execution_id,
        });
        let next_snapshot = write.next_snapshot;
        self.events
            .emit(ScopedEvent::Event(PublicDataTreeCheckEvent {
                contract_address,
                slot,
                leaf_slot,
                value,
                exists: write.exists,
                execution_id,
                prev_snapshot,
                next_snapshot,
                low_leaf_preimage: low_leaf,
                low_leaf_hash: write.low_leaf_hash,
                low_leaf_index,
                write: true,
                write_witness: write.witness,
            }));
        Ok(next_snapshot)
    }

    /// End-of-simulation squashing pass over every recorded write
    pub fn squash(&mut self, gadgets: &mut Gadgets) -> CheckResult<()> {
        self.squasher
            .squash(&mut gadgets.field_gt, &mut gadgets.range)
    }

    pub fn take_events(&mut self) -> Vec<ScopedEvent<PublicDataTreeCheckEvent>> {
        self.events.take()
    }

    pub fn take_squash_events(&mut self) -> Vec<SquashedWriteEvent> {
        self.squasher.take_events()
    }
}

impl CheckpointListener for PublicDataTreeCheck {
    fn on_checkpoint_created(&mut self) {
        self.checkpoint_depth += 1;
        self.squasher.create_scope();
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Create));
    }

    fn on_checkpoint_committed(&mut self) -> CheckResult<()> {
        if self.checkpoint_depth == 0 {
            return Err(CheckError::CheckpointStack { op: "commit" });
        }
        self.checkpoint_depth -= 1;
        self.squasher.commit_scope()?;
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Commit));
        Ok(())
    }

    fn on_checkpoint_reverted(&mut self) -> CheckResult<()> {
        if self.checkpoint_depth == 0 {
            return Err(CheckError::CheckpointStack { op: "revert" });
        }
        self.checkpoint_depth -= 1;
        self.squasher.revert_scope()?;
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Revert));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{IndexedLeafValue, MemoryIndexedTree, PUBLIC_DATA_TREE_HEIGHT};
    use wst_primitives::felt_from_u64;

    fn write_via_check(
        tree: &mut MemoryIndexedTree<PublicDataLeafValue>,
        check: &mut PublicDataTreeCheck,
        gadgets: &mut Gadgets,
        contract: Felt,
        slot: Felt,
        value: Felt,
        execution_id: u32,
    ) -> AppendOnlyTreeSnapshot {
        let leaf_slot = compute_leaf_slot(contract, slot);
        let prev = tree.snapshot();
        let low = tree.get_low_indexed_leaf(leaf_slot);
        let low_path = tree.get_sibling_path(low.index);
        tree.insert(PublicDataLeafValue::new(leaf_slot, value));
        let insertion_path = if low.preimage.value.key() == leaf_slot {
            Vec::new()
        } else {
            tree.get_sibling_path(prev.next_available_leaf_index)
        };
        check
            .write(
                gadgets,
                contract,
                slot,
                value,
                execution_id,
                low.preimage,
                low.index,
                &low_path,
                prev,
                &insertion_path,
            )
            .unwrap()
    }

    #[test]
    fn test_write_then_read_back() {
        let mut tree = MemoryIndexedTree::new(PUBLIC_DATA_TREE_HEIGHT);
        let mut check = PublicDataTreeCheck::new();
        let mut gadgets = Gadgets::new();

        let contract = felt_from_u64(27);
        let slot = felt_from_u64(42);
        let value = felt_from_u64(27_000);
        let snapshot =
            write_via_check(&mut tree, &mut check, &mut gadgets, contract, slot, value, 1);
        assert_eq!(snapshot, tree.snapshot());

        let leaf_slot = compute_leaf_slot(contract, slot);
        let low = tree.get_low_indexed_leaf(leaf_slot);
        let path = tree.get_sibling_path(low.index);
        check
            .assert_read(
                &mut gadgets,
                contract,
                slot,
                value,
                low.preimage,
                low.index,
                &path,
                snapshot,
            )
            .unwrap();
    }

    #[test]
    fn test_update_in_place_keeps_leaf_count() {
        let mut tree = MemoryIndexedTree::new(PUBLIC_DATA_TREE_HEIGHT);
        let mut check = PublicDataTreeCheck::new();
        let mut gadgets = Gadgets::new();

        let contract = felt_from_u64(27);
        let slot = felt_from_u64(42);
        let first =
            write_via_check(&mut tree, &mut check, &mut gadgets, contract, slot,
                felt_from_u64(1), 1);
        let second =
            write_via_check(&mut tree, &mut check, &mut gadgets, contract, slot,
                felt_from_u64(2), 2);
        assert_eq!(
            first.next_available_leaf_index,
            second.next_available_leaf_index
        );
        assert_ne!(first.root, second.root);

        let events = check.take_events();
        assert_eq!(events.len(), 2);
        match &events[1] {
            ScopedEvent::Event(e) => {
                assert!(e.exists);
                let witness = e.write_witness.unwrap();
                assert!(witness.new_leaf_hash.is_none());
                assert_eq!(witness.intermediate_root, second.root);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_absent_slot_reads_zero() {
        let mut tree = MemoryIndexedTree::new(PUBLIC_DATA_TREE_HEIGHT);
        let mut check = PublicDataTreeCheck::new();
        let mut gadgets = Gadgets::new();

        let contract = felt_from_u64(27);
        let slot = felt_from_u64(42);
        let leaf_slot = compute_leaf_slot(contract, slot);
        let snapshot = tree.snapshot();
        let low = tree.get_low_indexed_leaf(leaf_slot);
        let path = tree.get_sibling_path(low.index);

        // Zero claim passes
        check
            .assert_read(
                &mut gadgets,
                contract,
                slot,
                FELT_ZERO,
                low.preimage.clone(),
                low.index,
                &path,
                snapshot,
            )
            .unwrap();

        // Non-zero claim fails
        let result = check.assert_read(
            &mut gadgets,
            contract,
            slot,
            felt_from_u64(1),
            low.preimage,
            low.index,
            &path,
            snapshot,
        );
        assert!(matches!(result, Err(CheckError::ValueMismatch { .. })));
    }

    #[test]
    fn test_squash_after_writes() {
        let mut tree = MemoryIndexedTree::new(PUBLIC_DATA_TREE_HEIGHT);
        let mut check = PublicDataTreeCheck::new();
        let mut gadgets = Gadgets::new();

        let contract = felt_from_u64(27);
        write_via_check(&mut tree, &mut check, &mut gadgets, contract,
            felt_from_u64(42), felt_from_u64(27), 1);
        write_via_check(&mut tree, &mut check, &mut gadgets, contract,
            felt_from_u64(42), felt_from_u64(28), 2);
        write_via_check(&mut tree, &mut check, &mut gadgets, contract,
            felt_from_u64(50), felt_from_u64(7), 3);

        check.squash(&mut gadgets).unwrap();
        let squashed = check.take_squash_events();
        assert_eq!(squashed.len(), 2);
        let slot_42 = compute_leaf_slot(contract, felt_from_u64(42));
        let surviving = squashed.iter().find(|e| e.leaf_slot == slot_42).unwrap();
        assert_eq!(surviving.value, felt_from_u64(28));
    }
}
