//! Append-only event logs
//!
//! Every gadget and tree check service records one immutable event per
//! operation. The logs are written during simulation and consumed exactly
//! once, in order, by the trace builders in `wst-trace`. Order is
//! semantically meaningful (it defines checkpoint scope boundaries), so the
//! emitter is strictly append-only.

use serde::{Deserialize, Serialize};

use crate::checkpoint::CheckpointEvent;

/// An append-only, single-writer event log.
#[derive(Debug, Clone)]
pub struct EventEmitter<T> {
    events: Vec<T>,
}

impl<T> EventEmitter<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append one event
    pub fn emit(&mut self, event: T) {
        self.events.push(event);
    }

    /// Drain the log for trace building; the emitter is empty afterwards
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A substantive event interleaved with checkpoint scope markers in the
/// same per-service log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScopedEvent<T> {
    Event(T),
    Checkpoint(CheckpointEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_preserves_order() {
        let mut emitter = EventEmitter::new();
        emitter.emit(1u32);
        emitter.emit(2);
        emitter.emit(3);
        assert_eq!(emitter.len(), 3);
        assert_eq!(emitter.take(), vec![1, 2, 3]);
        assert!(emitter.is_empty());
    }
}
