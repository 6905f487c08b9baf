//! WST Trace
//!
//! Bridges the event logs written by `wst-check` into column-major
//! execution trace matrices. Each gadget and tree check service has its
//! own builder; service traces carry a discard column driven by the
//! checkpoint markers interleaved in their logs, so reverted rows survive
//! in the trace but are flagged out of the final state transition.
//!
//! # Architecture
//!
//! - `matrix`: the column-major trace container
//! - `discard`: watermark-stack replay of checkpoint scope markers
//! - `builders`: one module per event log with its column layout

pub mod builders;
pub mod discard;
pub mod error;
pub mod matrix;

pub use discard::{replay_scoped, DiscardTracker};
pub use error::{TraceError, TraceResult};
pub use matrix::TraceMatrix;
