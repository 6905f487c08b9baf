//! Range check gadget
//!
//! Asserts that an integer fits in a declared number of bits and records the
//! obligation as an event. The comparison gadget leans on this to certify
//! that its 128-bit limb witnesses are well formed, and the write squasher
//! uses it to prove strict execution-id increase without revealing
//! magnitudes.

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, CheckResult};
use crate::events::EventEmitter;

/// One recorded range obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCheckEvent {
    pub value: u128,
    pub num_bits: u8,
}

/// The range check gadget. Owns its event log.
#[derive(Debug, Default)]
pub struct RangeCheck {
    events: EventEmitter<RangeCheckEvent>,
}

impl RangeCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert `value < 2^num_bits`. For `num_bits >= 128` every u128
    /// passes. Emits one event on success.
    pub fn assert_range(&mut self, value: u128, num_bits: u8) -> CheckResult<()> {
        if num_bits < 128 && (value >> num_bits) != 0 {
            return Err(CheckError::RangeViolation { value, num_bits });
        }
        self.events.emit(RangeCheckEvent { value, num_bits });
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<RangeCheckEvent> {
        self.events.take()
    }
}
