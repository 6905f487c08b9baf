//! WST - World-State Tree Checks for ZK Transaction Simulation
//!
//! This crate bundles the checked world-state tree access layer used when
//! simulating transactions for proving: every tree read and write runs
//! through witness-producing gadgets, is logged as an event, and is later
//! lowered into execution trace matrices.
//!
//! # Overview
//!
//! Five trees are covered: the nullifier, public data and note hash trees
//! (protocol state), and the written-slots and retrieved-bytecodes sets
//! (per-transaction dedup state). The nullifier and public data trees are
//! indexed Merkle trees with low-leaf based non-membership proofs; the
//! note hash tree is plain append-only.
//!
//! # Crates
//!
//! - `wst-primitives`: BN254 field arithmetic, limb decomposition, hashing
//! - `wst-check`: gadgets, tree check services, events, write squashing
//! - `wst-trace`: event-log to trace-matrix builders
//!
//! # Example
//!
//! ```no_run
//! use wst_check::{Gadgets, MemoryIndexedTree, NullifierLeafValue, NullifierTreeCheck};
//! use wst_check::tree::NULLIFIER_TREE_HEIGHT;
//! use wst_trace::builders::nullifier_tree;
//! ```

// Re-export sub-crates
pub use wst_check as check;
pub use wst_primitives as primitives;
pub use wst_trace as trace;
