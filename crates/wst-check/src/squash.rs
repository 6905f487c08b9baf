//! Public data write squashing
//!
//! Many writes to the same storage slot can be recorded during a
//! transaction, across nested checkpoint scopes. Only the last write per
//! slot may survive into the final proved state. The squasher keeps one
//! write list per open scope (commit merges into the parent, revert drops
//! the list), then at simulation end sorts everything by
//! `(leaf_slot, execution_id)` and proves the sort order pairwise: a 32-bit
//! range check on execution-id deltas within a slot, and a field comparison
//! across slot boundaries.

use serde::{Deserialize, Serialize};
use wst_primitives::{felt_to_limbs, Felt};

use crate::error::{CheckError, CheckResult};
use crate::events::EventEmitter;
use crate::gadgets::{FieldGreaterThan, RangeCheck};

/// Sentinel execution id for protocol-level writes, which must sort last
/// within a slot
pub const PROTOCOL_EXECUTION_ID: u32 = u32::MAX;

/// One recorded storage write
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedWrite {
    pub leaf_slot: Felt,
    pub value: Felt,
    pub execution_id: u32,
}

/// One surviving (final value per slot) write
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquashedWriteEvent {
    pub leaf_slot: Felt,
    pub value: Felt,
    pub execution_id: u32,
}

/// Scope-aware write recorder and end-of-simulation squasher
#[derive(Debug, Default)]
pub struct WriteSquasher {
    base: Vec<RecordedWrite>,
    scopes: Vec<Vec<RecordedWrite>>,
    events: EventEmitter<SquashedWriteEvent>,
}

impl WriteSquasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, write: RecordedWrite) {
        match self.scopes.last_mut() {
            Some(scope) => scope.push(write),
            None => self.base.push(write),
        }
    }

    pub fn create_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Merge the innermost scope's writes into its parent
    pub fn commit_scope(&mut self) -> CheckResult<()> {
        let top = self
            .scopes
            .pop()
            .ok_or(CheckError::CheckpointStack { op: "commit" })?;
        match self.scopes.last_mut() {
            Some(parent) => parent.extend(top),
            None => self.base.extend(top),
        }
        Ok(())
    }

    /// Drop the innermost scope's writes outright
    pub fn revert_scope(&mut self) -> CheckResult<()> {
        self.scopes
            .pop()
            .map(|_| ())
            .ok_or(CheckError::CheckpointStack { op: "revert" })
    }

    /// Merge all outstanding lists, prove the sort order, and emit one
    /// event per surviving write.
    pub fn squash(
        &mut self,
        field_gt: &mut FieldGreaterThan,
        range: &mut RangeCheck,
    ) -> CheckResult<()> {
        let mut writes = std::mem::take(&mut self.base);
        for scope in self.scopes.drain(..) {
            writes.extend(scope);
        }
        // Stable: equal (slot, execution_id) pairs keep simulation order,
        // so the last write per slot stays last
        writes.sort_by_key(|w| (felt_to_limbs(w.leaf_slot), w.execution_id));

        for pair in writes.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if current.leaf_slot == next.leaf_slot {
                let delta = (next.execution_id - current.execution_id) as u128;
                range.assert_range(delta, 32)?;
            } else if !field_gt.ff_gt(range, next.leaf_slot, current.leaf_slot)? {
                return Err(CheckError::OrderingViolation {
                    reason: "squashed writes out of slot order",
                    key: next.leaf_slot,
                    bound: current.leaf_slot,
                });
            }
        }

        for (i, write) in writes.iter().enumerate() {
            let last_for_slot = writes
                .get(i + 1)
                .map_or(true, |next| next.leaf_slot != write.leaf_slot);
            if last_for_slot {
                self.events.emit(SquashedWriteEvent {
                    leaf_slot: write.leaf_slot,
                    value: write.value,
                    execution_id: write.execution_id,
                });
            }
        }
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<SquashedWriteEvent> {
        self.events.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wst_primitives::felt_from_u64;

    fn write(slot: u64, value: u64, execution_id: u32) -> RecordedWrite {
        RecordedWrite {
            leaf_slot: felt_from_u64(slot),
            value: felt_from_u64(value),
            execution_id,
        }
    }

    fn squash_all(squasher: &mut WriteSquasher) -> Vec<SquashedWriteEvent> {
        let mut field_gt = FieldGreaterThan::new();
        let mut range = RangeCheck::new();
        squasher.squash(&mut field_gt, &mut range).unwrap();
        squasher.take_events()
    }

    #[test]
    fn test_last_write_per_slot_survives() {
        let mut squasher = WriteSquasher::new();
        squasher.record(write(42, 27, 1));
        squasher.record(write(42, 28, 2));
        squasher.record(write(50, 7, 3));

        let events = squash_all(&mut squasher);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].leaf_slot, felt_from_u64(42));
        assert_eq!(events[0].value, felt_from_u64(28));
        assert_eq!(events[1].leaf_slot, felt_from_u64(50));
        assert_eq!(events[1].value, felt_from_u64(7));
    }

    #[test]
    fn test_reverted_scope_writes_dropped() {
        let mut squasher = WriteSquasher::new();
        squasher.record(write(1, 10, 1));
        squasher.create_scope();
        squasher.record(write(1, 20, 2));
        squasher.revert_scope().unwrap();

        let events = squash_all(&mut squasher);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value, felt_from_u64(10));
    }

    #[test]
    fn test_committed_scope_writes_merge() {
        let mut squasher = WriteSquasher::new();
        squasher.record(write(1, 10, 1));
        squasher.create_scope();
        squasher.record(write(1, 20, 2));
        squasher.commit_scope().unwrap();

        let events = squash_all(&mut squasher);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value, felt_from_u64(20));
    }

    #[test]
    fn test_protocol_write_sorts_last() {
        let mut squasher = WriteSquasher::new();
        squasher.record(write(1, 99, PROTOCOL_EXECUTION_ID));
        squasher.record(write(1, 10, 5));

        let events = squash_all(&mut squasher);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value, felt_from_u64(99));
        assert_eq!(events[0].execution_id, PROTOCOL_EXECUTION_ID);
    }

    #[test]
    fn test_scope_underflow() {
        let mut squasher = WriteSquasher::new();
        assert!(matches!(
            squasher.commit_scope(),
            Err(CheckError::CheckpointStack { op: "commit" })
        ));
        assert!(matches!(
            squasher.revert_scope(),
            Err(CheckError::CheckpointStack { op: "revert" })
        ));
    }

    #[test]
    fn test_same_execution_id_keeps_simulation_order() {
        let mut squasher = WriteSquasher::new();
        squasher.record(write(7, 1, 3));
        squasher.record(write(7, 2, 3));

        let events = squash_all(&mut squasher);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value, felt_from_u64(2));
    }
}
