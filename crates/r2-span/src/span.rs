use std::sync::Arc;

use r2_config::SharedSpanConfig;
use r2_fsm::CallServices;
use r2_tal::TalChannel;

use crate::slot::GuardedSlot;

/// One configured trunk: shared immutable config + mutable state, plus
/// one guarded slot per timeslot. Owned by whichever binary runs the
/// monitor loop; the control surface and monitor both borrow it
/// through `Arc`.
pub struct Span<C: TalChannel, S: CallServices> {
    pub shared: SharedSpanConfig,
    pub channels: Vec<Arc<GuardedSlot<C, S>>>,
}

// Manual `Clone` instead of `#[derive(Clone)]`: every field is already an
// `Arc`, so cloning a `Span` is cheap and shares the same underlying
// config/state/channels — it must not require `C: Clone` or `S: Clone`,
// which `derive` would otherwise demand.
impl<C: TalChannel, S: CallServices> Clone for Span<C, S> {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone(), channels: self.channels.clone() }
    }
}

impl<C: TalChannel, S: CallServices> Span<C, S> {
    pub fn new(shared: SharedSpanConfig, channels: Vec<Arc<GuardedSlot<C, S>>>) -> Self {
        Self { shared, channels }
    }

    pub fn span_id(&self) -> r2_core::SpanId {
        self.shared.config().span_id
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&Arc<GuardedSlot<C, S>>> {
        self.channels.get(index)
    }
}
