//! Nullifier tree check service
//!
//! Nullifiers are insert-only: reads prove membership or non-membership
//! via the low leaf, writes splice a new nullifier into the chain and
//! reject duplicates. Contract-scoped nullifiers are siloed by hashing the
//! contract address into the raw value before the generic flow runs.

use serde::{Deserialize, Serialize};
use wst_primitives::{felt_from_u64, hash_fields, Felt};

use crate::checkpoint::{CheckpointEvent, CheckpointListener};
use crate::checks::indexed::{check_read, check_write, WriteMode, WriteWitness};
use crate::error::{CheckError, CheckResult};
use crate::events::{EventEmitter, ScopedEvent};
use crate::gadgets::Gadgets;
use crate::generators;
use crate::tree::{AppendOnlyTreeSnapshot, IndexedLeaf, NullifierLeafValue};

/// Silo a raw nullifier under its emitting contract
pub fn silo_nullifier(contract_address: Felt, nullifier: Felt) -> Felt {
    hash_fields(&[
        generators::generator(generators::OUTER_NULLIFIER),
        contract_address,
        nullifier,
    ])
}

/// One nullifier tree read or write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullifierTreeCheckEvent {
    pub nullifier: Felt,
    pub contract_address: Option<Felt>,
    pub siloed_nullifier: Felt,
    pub exists: bool,
    /// Simulation-order counter for writes; reads carry zero
    pub counter: u32,
    pub prev_snapshot: AppendOnlyTreeSnapshot,
    pub next_snapshot: AppendOnlyTreeSnapshot,
    pub low_leaf_preimage: IndexedLeaf<NullifierLeafValue>,
    pub low_leaf_hash: Felt,
    pub low_leaf_index: u64,
    pub write: bool,
    pub write_witness: Option<WriteWitness>,
}

/// Stateless check service; all witness material comes from the caller's
/// oracle queries.
#[derive(Debug, Default)]
pub struct NullifierTreeCheck {
    events: EventEmitter<ScopedEvent<NullifierTreeCheckEvent>>,
    checkpoint_depth: u32,
}

impl NullifierTreeCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prove that `nullifier` does (or does not) exist under `snapshot`,
    /// per the caller's claim.
    #[allow(clippy::too_many_arguments)]
    pub fn assert_read(
        &mut self,
        gadgets: &mut Gadgets,
        nullifier: Felt,
        contract_address: Option<Felt>,
        exists_claim: bool,
        low_leaf: IndexedLeaf<NullifierLeafValue>,
        low_leaf_index: u64,
        sibling_path: &[Felt],
        snapshot: AppendOnlyTreeSnapshot,
    ) -> CheckResult<()> {
        let siloed = contract_address.map_or(nullifier, |c| silo_nullifier(c, nullifier));
        let read = check_read(
            gadgets,
            siloed,
            &low_leaf,
            low_leaf_index,
            sibling_path,
            snapshot,
        )?;
        if read.exists != exists_claim {
            return Err(CheckError::ValueMismatch {
                claimed: felt_from_u64(exists_claim as u64),
                stored: felt_from_u64(read.exists as u64),
            });
        }
        self.events.emit(ScopedEvent::Event(NullifierTreeCheckEvent {
            nullifier,
            contract_address,
            siloed_nullifier: siloed,
            exists: read.exists,
            counter: 0,
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

    /// Insert `nullifier`, returning the replacement snapshot. Fatal
    /// `DuplicateInsert` if the low leaf shows the key already present.
    #[allow(clippy::too_many_arguments)]
    pub fn write(
        &mut self,
        gadgets: &mut Gadgets,
        nullifier: Felt,
        contract_address: Option<Felt>,
        counter: u32,
        low_leaf: IndexedLeaf<NullifierLeafValue>,
        low_leaf_index: u64,
        low_leaf_sibling_path: &[Felt],
        prev_snapshot: AppendOnlyTreeSnapshot,
        insertion_sibling_path: &[Felt],
    ) -> CheckResult<AppendOnlyTreeSnapshot> {
        let siloed = contract_address.map_or(nullifier, |c| silo_nullifier(c, nullifier));
        let write = check_write(
            gadgets,
            siloed,
            NullifierLeafValue::new(siloed),
            WriteMode::InsertOnly,
            &low_leaf,
            low_leaf_index,
            low_leaf_sibling_path,
            prev_snapshot,
            insertion_sibling_path,
        )?;
        let next_snapshot = write.next_snapshot;
        self.events.emit(ScopedEvent::Event(NullifierTreeCheckEvent {
            nullifier,
            contract_address,
            siloed_nullifier: siloed,
            exists: false,
            counter,
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

    pub fn take_events(&mut self) -> Vec<ScopedEvent<NullifierTreeCheckEvent>> {
        self.events.take()
    }
}

impl CheckpointListener for NullifierTreeCheck {
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
