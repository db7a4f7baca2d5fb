use r2_core::{CallDirection, PeDisconnectCause, TalHangupCause, cause};
use r2_pe::PeEngine;
use r2_tal::{CallerData, TalChannel, TalEventSink, UpwardEvent};

use crate::services::{CallServices, DigitDecision, StartDecision};
use crate::state::CallState;

/// Everything an entry action needs besides the machine's own fields:
/// the engine to issue PE requests against, the TAL channel to open or
/// close, the event bus to notify on, and the listener to consult.
/// Borrowed for the duration of one `advance`/`advance_all` call.
pub struct Ctx<'a> {
    pub engine: &'a mut dyn PeEngine,
    pub tal: &'a mut dyn TalChannel,
    pub bus: &'a dyn TalEventSink,
    pub services: &'a mut dyn CallServices,
}

/// Per-channel call record plus the FSM state. One instance
/// lives for the lifetime of the channel; `reset` clears call-scoped
/// fields on each new call without touching the PE channel handle
/// (owned one level up, by the event translator).
pub struct Machine {
    state: CallState,
    cached_state: CallState,
    state_change: bool,

    direction: CallDirection,
    pub caller: CallerData,

    accepted: bool,
    answer_pending: bool,
    disconnect_rcvd: bool,
    ftdm_call_started: bool,
    protocol_error: bool,

    tal_cause: Option<TalHangupCause>,
    tx_drops: u32,
    logname: String,
}

impl Machine {
    pub fn new(max_ani: usize, max_dnis: usize) -> Self {
        Self {
            state: CallState::Down,
            cached_state: CallState::Down,
            state_change: false,
            direction: CallDirection::Inbound,
            caller: CallerData::new(CallDirection::Inbound, max_ani, max_dnis),
            accepted: false,
            answer_pending: false,
            disconnect_rcvd: false,
            ftdm_call_started: false,
            protocol_error: false,
            tal_cause: None,
            tx_drops: 0,
            logname: String::new(),
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn logname(&self) -> &str {
        &self.logname
    }

    pub fn is_idle(&self) -> bool {
        self.state == CallState::Down
    }

    /// The accept-pending barrier. While this holds, TAL's
    /// public "answer" must stay blocked.
    pub fn accepting_pending(&self) -> bool {
        self.direction.is_inbound()
            && !self.accepted
            && matches!(self.state, CallState::Progress | CallState::ProgressMedia | CallState::Up)
    }

    pub fn is_state_change_pending(&self) -> bool {
        self.state_change
    }

    /// Reset rule: zero every call-scoped field, keep the PE
    /// channel handle (owned by the caller, not here).
    fn reset(&mut self, direction: CallDirection) {
        self.direction = direction;
        self.caller.reset(direction);
        self.accepted = false;
        self.answer_pending = false;
        self.disconnect_rcvd = false;
        self.ftdm_call_started = false;
        self.protocol_error = false;
        self.tal_cause = None;
        self.tx_drops = 0;
        self.logname.clear();
    }

    pub fn add_tx_drop(&mut self) {
        self.tx_drops += 1;
    }

    pub fn tx_drops(&self) -> u32 {
        self.tx_drops
    }

    /// Table-validated request. Invalid requests are logged and
    /// dropped — the pending state-change flag is forcibly cleared and
    /// the channel continues running.
    fn request(&mut self, to: CallState) {
        if !CallState::allowed(self.direction.is_inbound(), self.state, to) {
            tracing::error!(from = ?self.state, to = ?to, "rejected disallowed call state transition");
            self.state_change = false;
            return;
        }
        self.state = to;
        self.state_change = true;
    }

    /// Bypasses the table for the two transitions the tables don't cover
    /// (RING's reject path into `Cancel`, and `on_call_end`'s
    /// unconditional jump to `Down` from any state) — see `state.rs`.
    fn force(&mut self, to: CallState) {
        self.state = to;
        self.state_change = true;
    }

    /// Runs at most one entry action: the entry for whichever state is
    /// current but not yet "caught up to" by `cached_state`. Returns
    /// whether it ran.
    pub fn advance(&mut self, ctx: &mut Ctx) -> bool {
        if self.cached_state == self.state {
            return false;
        }
        let entered = self.state;
        self.run_entry(entered, ctx);
        self.cached_state = entered;
        self.state_change = self.accepting_pending();
        true
    }

    pub fn advance_all(&mut self, ctx: &mut Ctx) {
        while self.advance(ctx) {}
    }

    fn run_entry(&mut self, state: CallState, ctx: &mut Ctx) {
        match state {
            CallState::Collect | CallState::Dialing => {
                if ctx.tal.interval_ms() == 0 {
                    tracing::error!("entered {:?} with a zero TAL frame interval", state);
                }
                ctx.engine.enable_read();
            }
            CallState::Ring => {
                let decision = ctx.services.on_start(
                    ctx.tal.channel_id(),
                    self.caller.ani.as_str(),
                    self.caller.dnis.as_str(),
                    self.caller.category,
                );
                ctx.bus.emit(UpwardEvent::Start {
                    channel: ctx.tal.channel_id(),
                    ani: self.caller.ani.as_str().to_string(),
                    dnis: self.caller.dnis.as_str().to_string(),
                    category: self.caller.category,
                });
                match decision {
                    StartDecision::Accept => self.ftdm_call_started = true,
                    StartDecision::Reject => {
                        ctx.engine.disconnect_call(PeDisconnectCause::OutOfOrder);
                        self.force(CallState::Cancel);
                    }
                }
            }
            CallState::Progress | CallState::ProgressMedia => {
                if self.direction.is_inbound() {
                    if !self.accepted {
                        ctx.engine.accept_call();
                    }
                } else {
                    ctx.bus.emit(UpwardEvent::Proceed { channel: ctx.tal.channel_id() });
                    ctx.bus.emit(UpwardEvent::ProgressMedia { channel: ctx.tal.channel_id() });
                }
            }
            CallState::Up => {
                if self.direction.is_inbound() {
                    if !self.accepted {
                        ctx.engine.accept_call();
                        self.answer_pending = true;
                    } else {
                        ctx.engine.answer_call();
                        ctx.bus.emit(UpwardEvent::Up { channel: ctx.tal.channel_id() });
                    }
                } else {
                    ctx.bus.emit(UpwardEvent::Up { channel: ctx.tal.channel_id() });
                }
            }
            CallState::Hangup => {
                if !self.disconnect_rcvd {
                    let pe_cause = self.tal_cause.map(cause::tal_cause_to_pe_cause).unwrap_or(PeDisconnectCause::Unspecified);
                    ctx.engine.disconnect_call(pe_cause);
                } else if !self.protocol_error {
                    ctx.engine.disconnect_call(PeDisconnectCause::NormalClearing);
                } else {
                    self.force(CallState::Down);
                }
            }
            CallState::Terminating => {
                if !self.ftdm_call_started {
                    self.force(CallState::Hangup);
                } else {
                    let hangup_cause = self.tal_cause.unwrap_or(TalHangupCause::NormalUnspecified);
                    ctx.bus.emit(UpwardEvent::Stop { channel: ctx.tal.channel_id(), cause: hangup_cause });
                }
            }
            CallState::Cancel => {
                ctx.engine.disconnect_call(PeDisconnectCause::OutOfOrder);
            }
            CallState::Down => {
                if self.tx_drops > 0 {
                    tracing::warn!(drops = self.tx_drops, "channel accrued tx drops over the call");
                }
                ctx.engine.disable_read();
                ctx.tal.close_channel();
            }
        }
    }

    // --- requests driven by the event translator ---

    pub fn on_init(&mut self, direction: CallDirection, logname: &str) {
        self.reset(direction);
        self.logname = logname.to_string();
        self.request(match direction {
            CallDirection::Inbound => CallState::Collect,
            CallDirection::Outbound => CallState::Dialing,
        });
    }

    pub fn on_offered(&mut self, ani: &str, dnis: &str, category: r2_tal::CallerCategory) {
        for d in ani.chars() {
            self.caller.ani.push(d);
        }
        for d in dnis.chars() {
            self.caller.dnis.push(d);
        }
        self.caller.category = category;
        self.request(CallState::Ring);
    }

    /// Returns the decision the engine should act on (answer immediately,
    /// or nothing further) — the immediate PE `answer_call()` call itself
    /// is issued by the translator, which holds the live engine handle.
    pub fn on_accepted(&mut self) -> bool {
        let should_answer_now = self.direction.is_inbound() && self.answer_pending;
        self.accepted = true;
        if should_answer_now {
            self.answer_pending = false;
        } else if self.direction.is_outbound() {
            self.request(CallState::ProgressMedia);
        }
        should_answer_now
    }

    pub fn on_answered(&mut self) {
        if self.direction.is_outbound() {
            self.request(CallState::Up);
        }
    }

    /// Returns true if this callback should immediately acknowledge the
    /// PE disconnect with NORMAL_CLEARING (already torn down locally).
    pub fn on_disconnect(&mut self, cause: TalHangupCause) -> bool {
        self.disconnect_rcvd = true;
        if self.state == CallState::Hangup {
            true
        } else {
            self.tal_cause = Some(cause);
            self.request(CallState::Terminating);
            false
        }
    }

    pub fn on_end(&mut self) {
        self.force(CallState::Down);
    }

    /// Returns true if a diagnostic dump should be flushed by the caller.
    pub fn on_protocol_error(&mut self) -> bool {
        if self.state == CallState::Down {
            return false;
        }
        self.protocol_error = true;
        self.disconnect_rcvd = true;
        if self.state == CallState::Hangup {
            self.force(CallState::Down);
        } else {
            self.tal_cause = Some(TalHangupCause::ProtocolError);
            self.request(CallState::Terminating);
        }
        true
    }

    pub fn on_local_hangup_requested(&mut self, cause: TalHangupCause) {
        self.tal_cause = Some(cause);
        self.request(CallState::Hangup);
    }

    /// TAL-driven "indicate early media" request for an inbound call
    /// still ringing — the inbound counterpart of the automatic outbound
    /// PROGRESS_MEDIA entry. No-op (logged) for outbound, where progress
    /// is reported to TAL by the PE, not requested by it.
    pub fn on_progress_media_requested(&mut self) {
        if self.direction.is_outbound() {
            tracing::error!("ignoring progress-media request on an outbound call");
            return;
        }
        self.request(CallState::ProgressMedia);
    }

    /// TAL-driven "indicate ring-back without media" request. Inbound
    /// only — the outbound direction table has no PROGRESS state at all.
    pub fn on_progress_requested(&mut self) {
        if self.direction.is_outbound() {
            tracing::error!("ignoring progress request on an outbound call");
            return;
        }
        self.request(CallState::Progress);
    }

    /// TAL-driven "answer this call" request for an inbound call — the
    /// counterpart of `on_call_answered` driving UP on the outbound
    /// side. Reaching this state while the accept handshake hasn't
    /// completed starts it and defers the actual PE answer to
    /// `on_accepted`; reaching it once already accepted answers
    /// immediately.
    pub fn on_answer_requested(&mut self) {
        if self.direction.is_outbound() {
            tracing::error!("ignoring local answer request on an outbound call");
            return;
        }
        self.request(CallState::Up);
    }

    /// Append, emit, and decide whether the PE should keep requesting
    /// digits.
    pub fn on_dnis_digit(&mut self, channel: r2_core::ChannelId, digit: char, services: &mut dyn CallServices, bus: &dyn TalEventSink) -> bool {
        let pushed = self.caller.dnis.push(digit);
        bus.emit(UpwardEvent::CollectedDigit { channel, digit, kind: r2_tal::DigitKind::Dnis });
        if !pushed {
            return false;
        }
        if self.caller.dnis.is_full() {
            return false;
        }
        matches!(services.on_dnis_digit(channel, self.caller.dnis.as_str()), DigitDecision::Continue)
    }

    pub fn on_ani_digit(&mut self, digit: char) {
        self.caller.ani.push(digit);
    }
}
