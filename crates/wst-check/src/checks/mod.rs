//! Per-tree check services
//!
//! Each service wraps the shared indexed core (or, for note hashes, the
//! plain Merkle gadget) with its domain key derivation, event shape and
//! checkpoint behavior.

pub mod indexed;
pub mod note_hash;
pub mod nullifier;
pub mod public_data;
pub mod set_membership;

pub use indexed::{check_read, check_write, ReadCheck, WriteCheck, WriteMode, WriteWitness};
pub use note_hash::{silo_note_hash, NoteHashTreeCheck, NoteHashTreeCheckEvent};
pub use nullifier::{silo_nullifier, NullifierTreeCheck, NullifierTreeCheckEvent};
pub use public_data::{compute_leaf_slot, PublicDataTreeCheck, PublicDataTreeCheckEvent};
pub use set_membership::{
    RetrievedBytecodesTreeCheck, SetMembershipTreeCheck, SetMembershipTreeCheckEvent,
    WrittenSlotsTreeCheck,
};
