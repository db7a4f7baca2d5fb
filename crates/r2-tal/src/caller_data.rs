use r2_core::{CallDirection, DigitBuffer, TalHangupCause};

use crate::category::CallerCategory;

/// Caller data owned by the TAL and borrowed by the core. The core
/// reads and appends to the digit buffers as the PE reports digits, and
/// sets the hangup cause before driving a local hangup.
#[derive(Debug, Clone)]
pub struct CallerData {
    pub ani: DigitBuffer,
    pub dnis: DigitBuffer,
    pub category: CallerCategory,
    pub hangup_cause: Option<TalHangupCause>,
    pub direction: CallDirection,
}

impl CallerData {
    pub fn new(direction: CallDirection, max_ani: usize, max_dnis: usize) -> Self {
        Self {
            ani: DigitBuffer::new(max_ani),
            dnis: DigitBuffer::new(max_dnis),
            category: CallerCategory::default(),
            hangup_cause: None,
            direction,
        }
    }

    /// Resets digit buffers, category and hangup cause. Called on each
    /// transition into COLLECT (inbound) or DIALING (outbound), per the
    /// call record's reset rule.
    pub fn reset(&mut self, direction: CallDirection) {
        self.ani.clear();
        self.dnis.clear();
        self.category = CallerCategory::default();
        self.hangup_cause = None;
        self.direction = direction;
    }
}
