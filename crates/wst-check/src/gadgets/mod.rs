//! Witness-producing gadgets shared by the tree check services
//!
//! The gadgets own their event logs; services borrow them mutably per call
//! so one proving job shares a single log per gadget kind.

pub mod field_gt;
pub mod merkle_check;
pub mod range_check;

pub use field_gt::{FieldGreaterThan, FieldGreaterThanEvent, LimbsComparisonWitness};
pub use merkle_check::{root_from_path, MerkleCheck, MerkleCheckEvent};
pub use range_check::{RangeCheck, RangeCheckEvent};

/// The gadget set threaded through every tree check call.
#[derive(Debug, Default)]
pub struct Gadgets {
    pub merkle: MerkleCheck,
    pub field_gt: FieldGreaterThan,
    pub range: RangeCheck,
}

impl Gadgets {
    pub fn new() -> Self {
        Self::default()
    }
}
