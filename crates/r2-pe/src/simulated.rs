use std::collections::VecDeque;

use r2_core::PeDisconnectCause;

use crate::engine::{PeCallback, PeEngine};

/// A scripted callback invocation, queued by a test and replayed by
/// `SimulatedPe::process_signaling` on the next call. Lets tests drive
/// the call FSM through literal end-to-end scenarios without a real PE
/// binding.
pub enum ScriptedCallback {
    CallInit { logname: String },
    CallOffered { ani: String, dnis: String, category: r2_tal::CallerCategory },
    CallAccepted { mode: crate::engine::AcceptMode },
    CallAnswered,
    CallDisconnect { cause: PeDisconnectCause },
    CallEnd,
    ProtocolError { reason: String },
    LineBlocked,
    LineIdle,
    DnisDigit { digit: char },
    AniDigit { digit: char },
    CallRead { buf: Vec<u8> },
    CallWrite { buf: Vec<u8> },
    TxDrop,
    HardwareAlarm { raised: bool },
    OsError { reason: String },
}

/// A test double standing in for a real PE binding. Holds a queue of
/// scripted callbacks and a small amount of accept/answer/disconnect
/// bookkeeping so tests can assert on what the core asked it to do.
pub struct SimulatedPe {
    channel: r2_core::ChannelId,
    script: VecDeque<ScriptedCallback>,
    read_enabled: bool,
    accept_requested: bool,
    answer_requested: bool,
    disconnect_requested: Option<PeDisconnectCause>,
    blocked: bool,
}

impl SimulatedPe {
    pub fn new(channel: r2_core::ChannelId) -> Self {
        Self {
            channel,
            script: VecDeque::new(),
            read_enabled: false,
            accept_requested: false,
            answer_requested: false,
            disconnect_requested: None,
            blocked: false,
        }
    }

    /// Queues a callback to fire on the next `process_signaling` call.
    pub fn push(&mut self, callback: ScriptedCallback) {
        self.script.push_back(callback);
    }

    pub fn accept_requested(&self) -> bool {
        self.accept_requested
    }

    pub fn answer_requested(&self) -> bool {
        self.answer_requested
    }

    pub fn disconnect_requested(&self) -> Option<PeDisconnectCause> {
        self.disconnect_requested
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn script_is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

impl PeEngine for SimulatedPe {
    fn process_signaling(&mut self, callbacks: &mut dyn PeCallback) {
        let Some(next) = self.script.pop_front() else { return };
        let channel = self.channel;
        match next {
            ScriptedCallback::CallInit { logname } => callbacks.on_call_init(self, channel, &logname),
            ScriptedCallback::CallOffered { ani, dnis, category } => {
                callbacks.on_call_offered(self, channel, &ani, &dnis, category)
            }
            ScriptedCallback::CallAccepted { mode } => callbacks.on_call_accepted(self, channel, mode),
            ScriptedCallback::CallAnswered => callbacks.on_call_answered(self, channel),
            ScriptedCallback::CallDisconnect { cause } => callbacks.on_call_disconnect(self, channel, cause),
            ScriptedCallback::CallEnd => callbacks.on_call_end(self, channel),
            ScriptedCallback::ProtocolError { reason } => callbacks.on_protocol_error(self, channel, &reason),
            ScriptedCallback::LineBlocked => callbacks.on_line_blocked(channel),
            ScriptedCallback::LineIdle => callbacks.on_line_idle(channel),
            ScriptedCallback::DnisDigit { digit } => {
                callbacks.on_dnis_digit_received(channel, digit);
            }
            ScriptedCallback::AniDigit { digit } => callbacks.on_ani_digit_received(channel, digit),
            ScriptedCallback::CallRead { buf } => callbacks.on_call_read(channel, &buf),
            ScriptedCallback::CallWrite { buf } => callbacks.on_call_write(channel, &buf),
            ScriptedCallback::TxDrop => callbacks.on_tx_drop(channel),
            ScriptedCallback::HardwareAlarm { raised } => callbacks.on_hardware_alarm(channel, raised),
            ScriptedCallback::OsError { reason } => callbacks.on_os_error(channel, &reason),
        }
    }

    fn enable_read(&mut self) {
        self.read_enabled = true;
    }

    fn disable_read(&mut self) {
        self.read_enabled = false;
    }

    fn read_enabled(&self) -> bool {
        self.read_enabled
    }

    fn accept_call(&mut self) {
        self.accept_requested = true;
    }

    fn answer_call(&mut self) {
        self.answer_requested = true;
    }

    fn disconnect_call(&mut self, cause: PeDisconnectCause) {
        self.disconnect_requested = Some(cause);
    }

    fn set_blocked(&mut self) {
        self.blocked = true;
    }

    fn set_idle(&mut self) {
        self.blocked = false;
    }
}
