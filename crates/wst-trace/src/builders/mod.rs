//! Per-log trace builders
//!
//! One builder per event log: the three gadget logs and the five tree
//! check service logs plus the squashed write log. Each exposes a `cols`
//! module with its column indices, a `WIDTH` constant and a `build_trace`
//! entry point.

pub mod field_gt;
pub mod merkle_check;
pub mod note_hash_tree;
pub mod nullifier_tree;
pub mod public_data_tree;
pub mod range_check;
pub mod set_membership_tree;
pub mod write_squash;
