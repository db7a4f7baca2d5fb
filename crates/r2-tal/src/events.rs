use r2_core::{ChannelId, TalHangupCause};

use crate::category::CallerCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigStatus {
    Suspended,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitKind {
    Ani,
    Dnis,
}

/// Events emitted on the TAL upward bus. These are drained by the span
/// monitor after every channel mutex for the iteration has been
/// released, so listener code may safely re-enter the TAL.
#[derive(Debug, Clone, PartialEq)]
pub enum UpwardEvent {
    SigStatusChanged { channel: ChannelId, status: SigStatus },
    Start { channel: ChannelId, ani: String, dnis: String, category: CallerCategory },
    CollectedDigit { channel: ChannelId, digit: char, kind: DigitKind },
    Proceed { channel: ChannelId },
    ProgressMedia { channel: ChannelId },
    Up { channel: ChannelId },
    Stop { channel: ChannelId, cause: TalHangupCause },
}

/// Where the span monitor hands off drained events. A production TAL
/// wires this to its own bus implementation; tests use a recording sink.
pub trait TalEventSink: Send {
    fn emit(&self, event: UpwardEvent);
}

/// A `crossbeam_channel`-backed sink, for a TAL that consumes events from
/// a different thread than the one running the monitor loop — the same
/// sender/receiver split used elsewhere in this stack to bridge a
/// cooperative loop to an external consumer.
pub struct ChannelEventSink {
    tx: crossbeam_channel::Sender<UpwardEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: crossbeam_channel::Sender<UpwardEvent>) -> Self {
        Self { tx }
    }
}

impl TalEventSink for ChannelEventSink {
    fn emit(&self, event: UpwardEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("TAL event bus receiver dropped, discarding event");
        }
    }
}
