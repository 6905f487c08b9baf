//! Checkpoint scope notifications
//!
//! The transaction-scope manager drives nested execution scopes; every tree
//! check service observes scope boundaries so its event log carries the
//! information the trace builders need to discard reverted rows.

use serde::{Deserialize, Serialize};

use crate::error::CheckResult;

/// Scope boundary markers recorded in each service's event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointEvent {
    Create,
    Commit,
    Revert,
}

/// Implemented by every tree check service; invoked by the scope manager.
///
/// `created` cannot fail; `committed`/`reverted` fail only on a scope
/// underflow, which is a caller-contract violation.
pub trait CheckpointListener {
    fn on_checkpoint_created(&mut self);
    fn on_checkpoint_committed(&mut self) -> CheckResult<()>;
    fn on_checkpoint_reverted(&mut self) -> CheckResult<()>;
}
