//! Trace building errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    /// A checkpoint commit or revert marker with no matching create
    #[error("checkpoint {op} without a matching create in event stream")]
    CheckpointUnderflow { op: &'static str },

    /// Re-derived witness material disagrees with the recorded event
    #[error("witness mismatch while building trace: {context}")]
    WitnessMismatch { context: &'static str },
}

pub type TraceResult<T> = Result<T, TraceError>;
