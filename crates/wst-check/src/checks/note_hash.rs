//! Note hash tree check service
//!
//! The note hash tree is append-only: there is no low leaf and no
//! non-membership proof. Writes optionally silo the raw note hash under its
//! contract and lift it to a unique note hash via a nonce derived from the
//! transaction's first nullifier, then append at the next free index.
//! Reads are plain membership checks at a known leaf index.

use serde::{Deserialize, Serialize};
use wst_primitives::{felt_from_u64, hash_fields, Felt, FELT_ZERO};

use crate::checkpoint::{CheckpointEvent, CheckpointListener};
use crate::error::{CheckError, CheckResult};
use crate::events::{EventEmitter, ScopedEvent};
use crate::gadgets::Gadgets;
use crate::generators;
use crate::tree::AppendOnlyTreeSnapshot;

/// Silo a raw note hash under its emitting contract
pub fn silo_note_hash(contract_address: Felt, note_hash: Felt) -> Felt {
    hash_fields(&[
        generators::generator(generators::SILOED_NOTE_HASH),
        contract_address,
        note_hash,
    ])
}

/// One note hash tree read or append
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteHashTreeCheckEvent {
    pub note_hash: Felt,
    pub contract_address: Option<Felt>,
    /// Uniqueness counter for appends that lift to a unique note hash
    pub counter: Option<u32>,
    pub siloed_note_hash: Felt,
    pub unique_note_hash: Felt,
    pub leaf_index: u64,
    pub prev_snapshot: AppendOnlyTreeSnapshot,
    pub next_snapshot: AppendOnlyTreeSnapshot,
    pub write: bool,
}

/// Append-only check service. Holds the transaction's first nullifier for
/// nonce derivation.
#[derive(Debug)]
pub struct NoteHashTreeCheck {
    first_nullifier: Felt,
    events: EventEmitter<ScopedEvent<NoteHashTreeCheckEvent>>,
    checkpoint_depth: u32,
}

impl NoteHashTreeCheck {
    pub fn new(first_nullifier: Felt) -> Self {
        Self {
            first_nullifier,
            events: EventEmitter::new(),
            checkpoint_depth: 0,
        }
    }

    /// `unique = hash(tag, nonce, siloed)` with
    /// `nonce = hash(tag, first_nullifier, counter)`
    pub fn make_unique(&self, counter: u32, siloed_note_hash: Felt) -> Felt {
        let nonce = hash_fields(&[
            generators::generator(generators::NOTE_HASH_NONCE),
            self.first_nullifier,
            felt_from_u64(counter as u64),
        ]);
        hash_fields(&[
            generators::generator(generators::UNIQUE_NOTE_HASH),
            nonce,
            siloed_note_hash,
        ])
    }

    /// Prove that `leaf_value` sits at `leaf_index` under `snapshot`.
    pub fn assert_read(
        &mut self,
        gadgets: &mut Gadgets,
        leaf_value: Felt,
        leaf_index: u64,
        sibling_path: &[Felt],
        snapshot: AppendOnlyTreeSnapshot,
    ) -> CheckResult<()> {
        gadgets
            .merkle
            .assert_membership(leaf_value, leaf_index, sibling_path, snapshot.root)?;
        self.events.emit(ScopedEvent::Event(NoteHashTreeCheckEvent {
            note_hash: leaf_value,
            contract_address: None,
            counter: None,
            siloed_note_hash: leaf_value,
            unique_note_hash: leaf_value,
            leaf_index,
            prev_snapshot: snapshot,
            next_snapshot: snapshot,
            write: false,
        }));
        Ok(())
    }

    /// Append a note hash at `prev_snapshot.next_available_leaf_index`,
    /// proving the slot was previously empty. Returns the replacement
    /// snapshot.
    pub fn append(
        &mut self,
        gadgets: &mut Gadgets,
        note_hash: Felt,
        contract_address: Option<Felt>,
        counter: Option<u32>,
        prev_snapshot: AppendOnlyTreeSnapshot,
        sibling_path: &[Felt],
    ) -> CheckResult<AppendOnlyTreeSnapshot> {
        let siloed_note_hash =
            contract_address.map_or(note_hash, |c| silo_note_hash(c, note_hash));
        let unique_note_hash =
            counter.map_or(siloed_note_hash, |c| self.make_unique(c, siloed_note_hash));

        let leaf_index = prev_snapshot.next_available_leaf_index;
        let new_root = gadgets.merkle.write(
            FELT_ZERO,
            unique_note_hash,
            leaf_index,
            sibling_path,
            prev_snapshot.root,
        )?;
        let next_snapshot = AppendOnlyTreeSnapshot::new(new_root, leaf_index + 1);

        self.events.emit(ScopedEvent::Event(NoteHashTreeCheckEvent {
            note_hash,
            contract_address,
            counter,
            siloed_note_hash,
            unique_note_hash,
            leaf_index,
            prev_snapshot,
            next_snapshot,
            write: true,
        }));
        Ok(next_snapshot)
    }

    pub fn take_events(&mut self) -> Vec<ScopedEvent<NoteHashTreeCheckEvent>> {
        self.events.take()
    }
}

impl CheckpointListener for NoteHashTreeCheck {
    fn on_checkpoint_created(&mut self) {
        self.checkpoint_depth += 1;
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Create));
    }

    fn on_checkpoint_committed(&mut self) -> CheckResult<()> {
        if self.checkpoint_depth == 0 {
            return Err(CheckError::CheckpointStack { op: "commit" });
        }
        self.checkpoint_depth -= 1;
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Commit));
        Ok(())
    }

    fn on_checkpoint_reverted(&mut self) -> CheckResult<()> {
        if self.checkpoint_depth == 0 {
            return Err(CheckError::CheckpointStack { op: "revert" });
        }
        self.checkpoint_depth -= 1;
        self.events
            .emit(ScopedEvent::Checkpoint(CheckpointEvent::Revert));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadgets::merkle_check::root_from_path;
    use wst_primitives::felt_from_u64;

    // A small in-memory append-only tree for witness material
    struct PlainTree {
        height: usize,
        leaves: Vec<Felt>,
        zero_hashes: Vec<Felt>,
    }

    impl PlainTree {
        fn new(height: usize) -> Self {
            let mut zero_hashes = vec![FELT_ZERO];
            for level in 1..=height {
                let child = zero_hashes[level - 1];
                zero_hashes.push(wst_primitives::hash_pair(child, child));
            }
            Self {
                height,
                leaves: Vec::new(),
                zero_hashes,
            }
        }

        fn node(&self, level: usize, index: u64) -> Felt {
            if level == 0 {
                return self
                    .leaves
                    .get(index as usize)
                    .copied()
                    .unwrap_or(FELT_ZERO);
            }
            let left = self.node(level - 1, index * 2);
            let right = self.node(level - 1, index * 2 + 1);
            if left == self.zero_hashes[level - 1] && right == self.zero_hashes[level - 1] {
                self.zero_hashes[level]
            } else {
                wst_primitives::hash_pair(left, right)
            }
        }

        fn sibling_path(&self, index: u64) -> Vec<Felt> {
            (0..self.height)
                .map(|level| self.node(level, (index >> level) ^ 1))
                .collect()
        }

        fn snapshot(&self) -> AppendOnlyTreeSnapshot {
            AppendOnlyTreeSnapshot::new(self.node(self.height, 0), self.leaves.len() as u64)
        }
    }

    #[test]
    fn test_append_then_read() {
        let mut tree = PlainTree::new(8);
        let mut check = NoteHashTreeCheck::new(felt_from_u64(111));
        let mut gadgets = Gadgets::new();

        let prev = tree.snapshot();
        let path = tree.sibling_path(0);
        let note_hash = felt_from_u64(42);
        let contract = felt_from_u64(27);

        let siloed = silo_note_hash(contract, note_hash);
        let unique = check.make_unique(5, siloed);
        let next = check
            .append(&mut gadgets, note_hash, Some(contract), Some(5), prev, &path)
            .unwrap();
        tree.leaves.push(unique);
        assert_eq!(next, tree.snapshot());

        let read_path = tree.sibling_path(0);
        check
            .assert_read(&mut gadgets, unique, 0, &read_path, next)
            .unwrap();

        let events = check.take_events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            ScopedEvent::Event(e) => {
                assert!(e.write);
                assert_eq!(e.unique_note_hash, unique);
                assert_eq!(e.next_snapshot.next_available_leaf_index, 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_raw_append_without_transforms() {
        let tree = PlainTree::new(8);
        let mut check = NoteHashTreeCheck::new(felt_from_u64(111));
        let mut gadgets = Gadgets::new();

        let prev = tree.snapshot();
        let path = tree.sibling_path(0);
        let note_hash = felt_from_u64(42);
        check
            .append(&mut gadgets, note_hash, None, None, prev, &path)
            .unwrap();
        let events = check.take_events();
        match &events[0] {
            ScopedEvent::Event(e) => {
                assert_eq!(e.unique_note_hash, note_hash);
                assert_eq!(e.siloed_note_hash, note_hash);
            }
            other => panic!("unexpected event {other:?}"),
        }
        // The appended root matches a direct derivation
        assert_eq!(
            root_from_path(note_hash, 0, &path),
            match &events[0] {
                ScopedEvent::Event(e) => e.next_snapshot.root,
                _ => unreachable!(),
            }
        );
    }

    #[test]
    fn test_append_to_occupied_slot_rejected() {
        let mut tree = PlainTree::new(8);
        tree.leaves.push(felt_from_u64(1));
        let mut check = NoteHashTreeCheck::new(felt_from_u64(111));
        let mut gadgets = Gadgets::new();

        // Claim the occupied slot 0 is the next free index
        let snapshot = AppendOnlyTreeSnapshot::new(tree.snapshot().root, 0);
        let path = tree.sibling_path(0);
        let result = check.append(&mut gadgets, felt_from_u64(2), None, None, snapshot, &path);
        assert!(matches!(result, Err(CheckError::RootMismatch { .. })));
    }
}
