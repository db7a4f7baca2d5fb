use r2_core::{ChannelId, TalHangupCause};
use r2_tal::CallerCategory;

/// Synchronous decision returned by the upward listener when a call is
/// offered. Unlike the rest of the upward events, this one gates an
/// entry action (RING) rather than merely notifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDecision {
    Accept,
    Reject,
}

/// Synchronous decision the listener can make while DNIS digits are
/// still arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitDecision {
    Continue,
    Stop,
}

/// The user-facing call-control surface above the FSM — the part of TAL
/// that decides whether to take a call and when it has enough DNIS
/// digits. Distinct from `TalEventSink`: that bus is pure notification,
/// drained after the channel lock is released, while these calls return
/// a decision the entry action consumes immediately.
pub trait CallServices: Send {
    fn on_start(&mut self, channel: ChannelId, ani: &str, dnis: &str, category: CallerCategory) -> StartDecision;
    fn on_dnis_digit(&mut self, channel: ChannelId, collected_so_far: &str) -> DigitDecision;
    /// Called once the span determined the local hangup cause outside
    /// of a PE-originated disconnect.
    fn local_hangup_cause(&mut self, channel: ChannelId) -> Option<TalHangupCause>;
}
