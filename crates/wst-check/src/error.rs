//! Error types for the tree check subsystem
//!
//! Every variant is fatal: it means the requested membership or mutation
//! cannot be proven, so the enclosing simulation must be rejected. Nothing
//! here is recoverable and no partial event is emitted before a failure.

use thiserror::Error;
use wst_primitives::{felt_to_hex, Felt};

/// Errors raised by gadgets and tree check services
#[derive(Debug, Error)]
pub enum CheckError {
    /// Recomputed Merkle root disagrees with the claimed root
    #[error("merkle root mismatch: computed {}, expected {}", felt_to_hex(*.computed), felt_to_hex(*.expected))]
    RootMismatch { computed: Felt, expected: Felt },

    /// Sibling path does not reduce the leaf index to 0 or 1
    #[error("malformed sibling path: final index {final_index}")]
    MalformedPath { final_index: u64 },

    /// Claimed value or existence flag disagrees with the stored leaf
    #[error("value mismatch: claimed {}, stored {}", felt_to_hex(*.claimed), felt_to_hex(*.stored))]
    ValueMismatch { claimed: Felt, stored: Felt },

    /// The low leaf does not bracket the target key
    #[error("ordering violation: {reason} (key {}, bound {})", felt_to_hex(*.key), felt_to_hex(*.bound))]
    OrderingViolation {
        reason: &'static str,
        key: Felt,
        bound: Felt,
    },

    /// Insert attempted for a key the low leaf shows already exists
    #[error("duplicate insert for key {}", felt_to_hex(*.key))]
    DuplicateInsert { key: Felt },

    /// A decomposition witness exceeds its declared bit width
    #[error("range violation: {value} does not fit in {num_bits} bits")]
    RangeViolation { value: u128, num_bits: u8 },

    /// Checkpoint commit or revert without a matching create
    #[error("checkpoint stack underflow during {op}")]
    CheckpointStack { op: &'static str },
}

/// Result alias used throughout the check subsystem
pub type CheckResult<T> = Result<T, CheckError>;
