use r2_core::{ChannelId, TalHangupCause};
use r2_fsm::{CallServices, DigitDecision, StartDecision};
use r2_tal::CallerCategory;

/// The stock call-acceptance policy: accept every offered call unless
/// it is a collect call and the span's `allow_collect_calls` option
/// forbids those, never stop DNIS collection early, and never
/// originate a local hangup cause of our own. A deployment that needs
/// real screening swaps this out for its own `CallServices`.
pub struct DefaultServices {
    allow_collect_calls: bool,
}

impl DefaultServices {
    pub fn new(allow_collect_calls: bool) -> Self {
        Self { allow_collect_calls }
    }
}

impl CallServices for DefaultServices {
    fn on_start(&mut self, channel: ChannelId, ani: &str, dnis: &str, category: CallerCategory) -> StartDecision {
        if category == CallerCategory::CollectCall && !self.allow_collect_calls {
            tracing::info!(%channel, ani, dnis, "rejecting collect call: not allowed by span config");
            return StartDecision::Reject;
        }
        StartDecision::Accept
    }

    fn on_dnis_digit(&mut self, _channel: ChannelId, _collected_so_far: &str) -> DigitDecision {
        DigitDecision::Continue
    }

    fn local_hangup_cause(&mut self, _channel: ChannelId) -> Option<TalHangupCause> {
        None
    }
}
