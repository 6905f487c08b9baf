//! Checkpoint discard tracking
//!
//! Service event logs interleave substantive events with checkpoint scope
//! markers. A revert does not delete the rows emitted inside the reverted
//! scope; it flips their discard column, keeping the trace append-only.
//! The tracker keeps a stack of row watermarks, one per open scope, and a
//! revert marks every row at or above the popped watermark.

use wst_check::{CheckpointEvent, ScopedEvent};
use wst_primitives::FELT_ONE;

use crate::error::{TraceError, TraceResult};
use crate::matrix::TraceMatrix;

/// Row-watermark stack over a single service trace
#[derive(Debug, Default)]
pub struct DiscardTracker {
    watermarks: Vec<usize>,
}

impl DiscardTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(&mut self, current_rows: usize) {
        self.watermarks.push(current_rows);
    }

    pub fn on_commit(&mut self) -> TraceResult<()> {
        self.watermarks
            .pop()
            .map(|_| ())
            .ok_or(TraceError::CheckpointUnderflow { op: "commit" })
    }

    /// Pop the innermost watermark; rows from it onward are discarded.
    pub fn on_revert(&mut self) -> TraceResult<usize> {
        self.watermarks
            .pop()
            .ok_or(TraceError::CheckpointUnderflow { op: "revert" })
    }
}

/// Replay a scoped event log into `matrix`: `fill` appends rows for each
/// substantive event, and reverts flip `discard_col` on the rows of the
/// reverted scope.
pub fn replay_scoped<T>(
    events: &[ScopedEvent<T>],
    matrix: &mut TraceMatrix,
    discard_col: usize,
    mut fill: impl FnMut(&T, &mut TraceMatrix) -> TraceResult<()>,
) -> TraceResult<()> {
    let mut tracker = DiscardTracker::new();
    for event in events {
        match event {
            ScopedEvent::Event(event) => fill(event, matrix)?,
            ScopedEvent::Checkpoint(CheckpointEvent::Create) => {
                tracker.on_create(matrix.num_rows());
            }
            ScopedEvent::Checkpoint(CheckpointEvent::Commit) => tracker.on_commit()?,
            ScopedEvent::Checkpoint(CheckpointEvent::Revert) => {
                let watermark = tracker.on_revert()?;
                for row in watermark..matrix.num_rows() {
                    matrix.set(row, discard_col, FELT_ONE);
                }
            }
        }
    }
    Ok(())
}
