use r2_core::{ChannelId, PeDisconnectCause};
use r2_tal::CallerCategory;

/// Whether a call reaching UP/PROGRESS_MEDIA has already cleared the
/// accept handshake, passed to `on_call_accepted`'s `mode` so the
/// translator knows whether an answer is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptMode {
    /// The call offer is inbound (backward); accepting is the callee's
    /// job.
    Inbound,
    /// The call was originated locally (forward); accepting just
    /// confirms tone exchange with the peer.
    Outbound,
}

/// Reason a digit-collection callback tells the PE to keep requesting
/// digits or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitRequestResult {
    Continue,
    Stop,
}

/// The ~15 upward callbacks the PE invokes during `process_signaling`.
/// Implemented by the event translator; invoked synchronously while the
/// channel's mutex is held by the span monitor.
///
/// Callbacks that issue a fresh PE request in response (accept, answer,
/// disconnect, enable/disable read) take `engine` so they can call
/// straight back into it, mirroring how the real PE calls back into its
/// own channel handle mid-callback.
pub trait PeCallback: Send {
    fn on_call_init(&mut self, engine: &mut dyn PeEngine, channel: ChannelId, logname: &str);
    fn on_call_offered(
        &mut self,
        engine: &mut dyn PeEngine,
        channel: ChannelId,
        ani: &str,
        dnis: &str,
        category: CallerCategory,
    );
    fn on_call_accepted(&mut self, engine: &mut dyn PeEngine, channel: ChannelId, mode: AcceptMode);
    fn on_call_answered(&mut self, engine: &mut dyn PeEngine, channel: ChannelId);
    fn on_call_disconnect(&mut self, engine: &mut dyn PeEngine, channel: ChannelId, cause: PeDisconnectCause);
    fn on_call_end(&mut self, engine: &mut dyn PeEngine, channel: ChannelId);
    fn on_protocol_error(&mut self, engine: &mut dyn PeEngine, channel: ChannelId, reason: &str);
    fn on_line_blocked(&mut self, channel: ChannelId);
    fn on_line_idle(&mut self, channel: ChannelId);
    fn on_dnis_digit_received(&mut self, channel: ChannelId, digit: char) -> DigitRequestResult;
    fn on_ani_digit_received(&mut self, channel: ChannelId, digit: char);
    /// Raw bytes just read off the channel during signaling, handed
    /// upward only so a protocol-error dump can be reconstructed; never
    /// acted on for call control. No-op by default.
    fn on_call_read(&mut self, _channel: ChannelId, _buf: &[u8]) {}
    /// Raw bytes just written to the channel during signaling, the
    /// write-side counterpart of `on_call_read`. No-op by default.
    fn on_call_write(&mut self, _channel: ChannelId, _buf: &[u8]) {}
    /// The channel's I/O adapter absorbed a short write instead of
    /// retrying it. No-op by default; the event translator counts
    /// these toward the DOWN-entry tx-drop warning.
    fn on_tx_drop(&mut self, _channel: ChannelId) {}
    fn on_hardware_alarm(&mut self, channel: ChannelId, raised: bool);
    fn on_os_error(&mut self, channel: ChannelId, reason: &str);
}

/// The per-channel operations the span monitor and call FSM invoke on
/// the engine (the PE's own channel handle, often called "r2chan").
/// Implemented by the real PE binding; the core only depends on this
/// trait, never on a concrete engine.
pub trait PeEngine: Send {
    /// Drives one step of CAS/MF processing for this channel, invoking
    /// any callbacks on `callbacks` that become due. Must be called with
    /// the channel's mutex held.
    fn process_signaling(&mut self, callbacks: &mut dyn PeCallback);

    fn enable_read(&mut self);
    fn disable_read(&mut self);
    fn read_enabled(&self) -> bool;

    /// Starts the MF accept handshake (~100 ms of tone exchange). Does
    /// not block; completion is reported via `on_call_accepted`.
    fn accept_call(&mut self);
    /// Drives the PE "answer" request. Only valid once accepted.
    fn answer_call(&mut self);
    /// Starts a disconnect with the given cause; completion is reported
    /// via `on_call_end`.
    fn disconnect_call(&mut self, cause: PeDisconnectCause);

    fn set_blocked(&mut self);
    fn set_idle(&mut self);

    /// Last observed (tx, rx) CAS bits, for the control surface's
    /// `status` command. A real PE binding tracks these as it
    /// reads/writes ABCD bits each loop; bindings that don't expose
    /// them yet can leave the default `(0, 0)`.
    fn cas_bits(&self) -> (u8, u8) {
        (0, 0)
    }
}
