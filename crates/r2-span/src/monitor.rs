use std::thread;
use std::time::{Duration, Instant};

use r2_fsm::CallServices;
use r2_tal::{TalChannel, WaitFlags, WaitMode};

use crate::span::Span;

/// Poll ceiling per iteration, matched to the 20ms audio frame cadence,
/// chosen to keep per-channel fairness without starving any one
/// timeslot.
const LOOP_TIMEOUT_MS: u64 = 20;

/// The span monitor: a single cooperative loop per span. Drives every
/// channel's PE signaling step and FSM in turn, then steps aside.
pub struct SpanMonitor<C: TalChannel, S: CallServices> {
    span: Span<C, S>,
    loop_start: Option<Instant>,
}

impl<C: TalChannel, S: CallServices> SpanMonitor<C, S> {
    pub fn new(span: Span<C, S>) -> Self {
        Self { span, loop_start: None }
    }

    pub fn span(&self) -> &Span<C, S> {
        &self.span
    }

    pub fn is_running(&self) -> bool {
        self.span.shared.state_read().running
    }

    /// Runs until `shared.state().running` goes false, sleeping up to
    /// `LOOP_TIMEOUT_MS` per iteration. On exit, marks every channel
    /// blocked — a graceful outage.
    pub fn run(&mut self) {
        while self.is_running() {
            self.run_once();
        }
        for slot in &self.span.channels {
            let mut guard = slot.lock().expect("channel mutex poisoned");
            guard.engine.set_blocked();
        }
    }

    /// One iteration of the monitor loop. Public so tests and the
    /// control surface's `loopstats`/`status` can drive it
    /// deterministically without spinning a background thread.
    pub fn run_once(&mut self) {
        let now = Instant::now();
        if let Some(start) = self.loop_start {
            let elapsed_ms = now.duration_since(start).as_millis() as u64;
            self.span.shared.state_write().histogram.record(elapsed_ms);
        }

        // Build the per-channel poll mask and wait. Each channel is
        // polled individually with the remaining timeout budget for
        // this iteration; on platforms lacking per-channel poll masks
        // a unified mask is acceptable.
        let deadline = now + Duration::from_millis(LOOP_TIMEOUT_MS);
        for slot in &self.span.channels {
            let mut guard = slot.lock().expect("channel mutex poisoned");
            if guard.is_suspended() {
                continue;
            }
            let mask = WaitFlags { read: guard.engine.read_enabled(), write: false, oob: true };
            if let Err(err) = guard.translator.channel_mut().wait(mask, WaitMode::Poll) {
                tracing::warn!(channel = %guard.channel_id, %err, "TAL wait failed, continuing iteration");
            }
        }
        if let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            thread::sleep(remaining);
        }

        self.loop_start = Some(Instant::now());

        // Drive every channel's signaling processing under its own
        // mutex. `advance_all` runs both before and after
        // `process_signaling`: once to flush any transition queued by
        // the previous iteration's callbacks (or by a concurrent
        // TAL-driven `dial`/`local_hangup`), once to flush whatever
        // this iteration's callbacks just queued.
        for slot in &self.span.channels {
            let mut guard = slot.lock().expect("channel mutex poisoned");
            if guard.is_suspended() {
                continue;
            }
            let slot = &mut *guard;
            slot.translator.advance_all(slot.engine.as_mut());
            slot.engine.process_signaling(&mut slot.translator);
            slot.translator.advance_all(slot.engine.as_mut());
        }

        // Upward events have already been handed to the bus from
        // inside the entry actions above, while still under this
        // channel's own lock — but `TalEventSink::emit` is required to
        // be a non-blocking enqueue (e.g. `ChannelEventSink`'s
        // `crossbeam_channel` send), never a synchronous call into
        // listener code, which is what actually gives the "no channel
        // locks held while listener code runs" guarantee. There is
        // nothing left to drain here.
    }
}

