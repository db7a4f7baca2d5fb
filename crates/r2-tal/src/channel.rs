use r2_core::{ChannelId, SpanId, TalError};

/// Which directions the PE adapter's `wait` call should poll for. On
/// platforms lacking per-channel poll masks a unified mask is
/// acceptable; this flag set is what gets translated either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitFlags {
    pub read: bool,
    pub write: bool,
    pub oob: bool,
}

impl WaitFlags {
    pub const NONE: WaitFlags = WaitFlags { read: false, write: false, oob: false };

    pub fn oob_only() -> Self {
        WaitFlags { read: false, write: false, oob: true }
    }

    pub fn is_empty(&self) -> bool {
        !self.read && !self.write && !self.oob
    }
}

/// Whether a `wait` call should block indefinitely or return immediately
/// (a poll). A timeout elapsing is a normal return, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    Indefinite,
    Poll,
}

/// Out-of-band events the PE adapter surfaces from `get_oob_event`.
/// Non-OOB events on the TAL channel are consumed silently and never
/// reach the PE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OobEvent {
    None,
    CasChange,
    AlarmOn,
    AlarmOff,
}

/// The narrow set of TAL channel primitives the PE adapter forwards PE
/// I/O hooks onto. Implemented by the surrounding telephony stack; this
/// crate only specifies the contract.
pub trait TalChannel: Send {
    fn channel_id(&self) -> ChannelId;
    fn span_id(&self) -> SpanId;

    /// Frame interval in milliseconds, used to size read/write buffers at
    /// entry to COLLECT/DIALING. Must be non-zero once the channel is
    /// configured.
    fn interval_ms(&self) -> u32;

    fn set_cas(&mut self, bits: u8) -> Result<(), TalError>;
    fn get_cas(&mut self) -> Result<u8, TalError>;

    /// Drop any pending outbound audio.
    fn flush_tx(&mut self) -> Result<(), TalError>;

    /// Best-effort write; a short write is not retried by the adapter,
    /// the caller is responsible for counting the drop.
    fn write(&mut self, buf: &[u8]) -> Result<usize, TalError>;

    /// Fills up to `buf.len()` bytes, returns the actual count read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TalError>;

    /// Waits for any of `flags` to become ready. Returns the subset that
    /// is actually ready; an empty result on `WaitMode::Poll` is not an
    /// error.
    fn wait(&mut self, flags: WaitFlags, mode: WaitMode) -> Result<WaitFlags, TalError>;

    /// Pulls at most one queued TAL event and classifies it.
    fn poll_oob_event(&mut self) -> Result<OobEvent, TalError>;

    /// Opens the underlying TAL channel resource. Called by the event
    /// translator on inbound call init / outbound dial, not by the PE.
    fn open_channel(&mut self) -> Result<(), TalError>;
    /// Closes the underlying TAL channel resource. Called by the event
    /// translator's DOWN entry action.
    fn close_channel(&mut self);

    /// Administrative blocking (`block`/`unblock`).
    fn set_blocked(&mut self);
    fn set_idle(&mut self);
    fn is_suspended(&self) -> bool;
}
