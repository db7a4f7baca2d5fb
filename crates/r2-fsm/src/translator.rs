use std::path::PathBuf;

use r2_core::{CallDirection, ChannelId, PeDisconnectCause, SpanId, TalHangupCause};
use r2_pe::{AcceptMode, DigitRequestResult, PeCallback, PeEngine};
use r2_tal::{CallerCategory, DigitKind, SigStatus, TalChannel, TalEventSink, UpwardEvent};

use crate::dump::IoDump;
use crate::machine::{Ctx, Machine};
use crate::services::CallServices;

/// The event translator: implements the PE's upward callback table
/// and turns each one into either an immediate engine request or a
/// queued FSM transition for the span monitor's next `advance_all`.
pub struct EventTranslator<C: TalChannel, S: CallServices> {
    machine: Machine,
    channel: C,
    bus: Box<dyn TalEventSink>,
    services: S,
    span_id: SpanId,
    mf_dump_size: usize,
    logdir: PathBuf,
    dump: Option<IoDump>,
}

impl<C: TalChannel, S: CallServices> EventTranslator<C, S> {
    pub fn new(
        channel: C,
        bus: Box<dyn TalEventSink>,
        services: S,
        span_id: SpanId,
        max_ani: usize,
        max_dnis: usize,
        mf_dump_size: usize,
        logdir: PathBuf,
    ) -> Self {
        Self {
            machine: Machine::new(max_ani, max_dnis),
            channel,
            bus,
            services,
            span_id,
            mf_dump_size,
            logdir,
            dump: None,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn is_state_change_pending(&self) -> bool {
        self.machine.is_state_change_pending()
    }

    /// Runs pending entry actions: `advance_all` is called on either
    /// side of `process_signaling`.
    pub fn advance_all(&mut self, engine: &mut dyn PeEngine) {
        let mut ctx = Ctx { engine, tal: &mut self.channel, bus: self.bus.as_ref(), services: &mut self.services };
        self.machine.advance_all(&mut ctx);
    }

    /// TAL-driven outbound dial — not a PE callback, so it lives
    /// outside the `PeCallback` impl below.
    pub fn dial(&mut self, logname: &str) {
        if let Err(err) = self.channel.open_channel() {
            tracing::error!(%err, "failed to open TAL channel for outbound dial");
            return;
        }
        self.dump = None;
        self.machine.on_init(CallDirection::Outbound, logname);
    }

    /// TAL-driven local hangup ahead of any PE-reported disconnect.
    pub fn local_hangup(&mut self, cause: TalHangupCause) {
        self.machine.on_local_hangup_requested(cause);
    }

    /// TAL-driven "indicate ring-back without media" for a ringing
    /// inbound call.
    pub fn request_progress(&mut self) {
        self.machine.on_progress_requested();
    }

    /// TAL-driven "indicate early media" for a ringing inbound call.
    pub fn request_progress_media(&mut self) {
        self.machine.on_progress_media_requested();
    }

    /// TAL-driven "answer this call" for an inbound call. The state
    /// change is only queued here; the actual PE accept/answer request
    /// runs from the next `advance_all`, same as `dial`/`local_hangup`.
    pub fn request_answer(&mut self) {
        self.machine.on_answer_requested();
    }

    fn maybe_flush_dump(&self, channel: ChannelId) {
        if let Some(dump) = &self.dump {
            dump.flush_to(&self.logdir, self.machine.logname(), self.span_id.0, channel.0);
        }
    }
}

impl<C: TalChannel, S: CallServices> PeCallback for EventTranslator<C, S> {
    fn on_call_init(&mut self, _engine: &mut dyn PeEngine, _channel: ChannelId, logname: &str) {
        if !self.machine.is_idle() {
            tracing::error!(logname, "on_call_init while channel not idle, refusing");
            return;
        }
        if let Err(err) = self.channel.open_channel() {
            tracing::error!(%err, "failed to open TAL channel on call init");
            return;
        }
        self.dump = if self.mf_dump_size > 0 { Some(IoDump::new(self.mf_dump_size)) } else { None };
        self.machine.on_init(CallDirection::Inbound, logname);
    }

    fn on_call_offered(
        &mut self,
        _engine: &mut dyn PeEngine,
        _channel: ChannelId,
        ani: &str,
        dnis: &str,
        category: CallerCategory,
    ) {
        self.machine.on_offered(ani, dnis, category);
        // Setup concluded cleanly past the init race; stop the dump.
        self.dump = None;
    }

    fn on_call_accepted(&mut self, engine: &mut dyn PeEngine, channel: ChannelId, _mode: AcceptMode) {
        engine.disable_read();
        if self.machine.on_accepted() {
            engine.answer_call();
            self.bus.emit(UpwardEvent::Up { channel });
        }
    }

    fn on_call_answered(&mut self, _engine: &mut dyn PeEngine, _channel: ChannelId) {
        self.machine.on_answered();
    }

    fn on_call_disconnect(&mut self, engine: &mut dyn PeEngine, _channel: ChannelId, cause: PeDisconnectCause) {
        let tal_cause = r2_core::cause::pe_cause_to_tal_cause(cause);
        if self.machine.on_disconnect(tal_cause) {
            engine.disconnect_call(PeDisconnectCause::NormalClearing);
        }
    }

    fn on_call_end(&mut self, engine: &mut dyn PeEngine, _channel: ChannelId) {
        self.machine.on_end();
        // PE may issue on_call_init immediately after this returns, so
        // drain pending transitions now instead of waiting for the
        // monitor's next `advance_all`.
        let mut ctx = Ctx { engine, tal: &mut self.channel, bus: self.bus.as_ref(), services: &mut self.services };
        self.machine.advance_all(&mut ctx);
    }

    fn on_protocol_error(&mut self, _engine: &mut dyn PeEngine, channel: ChannelId, reason: &str) {
        tracing::error!(%reason, "R2 protocol error");
        if self.machine.on_protocol_error() {
            self.maybe_flush_dump(channel);
        }
    }

    /// Feeds the rolling setup dump while it's active; a no-op once
    /// `on_call_offered`/`on_protocol_error` has cleared it.
    fn on_call_read(&mut self, _channel: ChannelId, buf: &[u8]) {
        if let Some(dump) = &mut self.dump {
            dump.record_input(buf);
        }
    }

    fn on_call_write(&mut self, _channel: ChannelId, buf: &[u8]) {
        if let Some(dump) = &mut self.dump {
            dump.record_output(buf);
        }
    }

    fn on_tx_drop(&mut self, _channel: ChannelId) {
        self.machine.add_tx_drop();
    }

    fn on_line_blocked(&mut self, channel: ChannelId) {
        self.bus.emit(UpwardEvent::SigStatusChanged { channel, status: SigStatus::Suspended });
    }

    fn on_line_idle(&mut self, channel: ChannelId) {
        self.bus.emit(UpwardEvent::SigStatusChanged { channel, status: SigStatus::Up });
    }

    fn on_dnis_digit_received(&mut self, channel: ChannelId, digit: char) -> DigitRequestResult {
        if self.machine.on_dnis_digit(channel, digit, &mut self.services, self.bus.as_ref()) {
            DigitRequestResult::Continue
        } else {
            DigitRequestResult::Stop
        }
    }

    fn on_ani_digit_received(&mut self, channel: ChannelId, digit: char) {
        self.machine.on_ani_digit(digit);
        self.bus.emit(UpwardEvent::CollectedDigit { channel, digit, kind: DigitKind::Ani });
    }

    fn on_hardware_alarm(&mut self, channel: ChannelId, raised: bool) {
        tracing::warn!(channel = %channel, raised, "hardware alarm");
    }

    fn on_os_error(&mut self, channel: ChannelId, reason: &str) {
        tracing::error!(channel = %channel, %reason, "TAL OS-level error reported by PE");
    }
}
