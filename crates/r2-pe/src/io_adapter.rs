use r2_core::TalError;
use r2_tal::{OobEvent, TalChannel, WaitFlags, WaitMode};

/// The exact set of I/O hooks the protocol engine invokes. A real PE
/// binding calls these through an FFI vtable; this trait is that
/// vtable's Rust shape.
pub trait PeIoHooks: Send {
    fn set_cas(&mut self, bits: u8) -> Result<(), TalError>;
    fn get_cas(&mut self) -> Result<u8, TalError>;
    fn flush_tx(&mut self) -> Result<(), TalError>;
    fn write(&mut self, buf: &[u8]) -> Result<usize, TalError>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TalError>;
    fn wait(&mut self, flags: WaitFlags, mode: WaitMode) -> Result<WaitFlags, TalError>;
    fn get_oob_event(&mut self) -> Result<OobEvent, TalError>;

    /// Never reached in normal operation: the adapter binds an existing
    /// TAL file descriptor to a PE channel, so PE owns no lifecycle of
    /// its own. If the PE calls these anyway, log an error and return
    /// success rather than destabilising it.
    fn open(&mut self) -> Result<(), TalError>;
    fn close(&mut self) -> Result<(), TalError>;
    fn setup(&mut self) -> Result<(), TalError>;
}

/// Binds PE's I/O hooks onto an existing TAL channel. Owns no channel
/// lifecycle of its own — `open`/`close`/`setup` are defensive stubs.
pub struct IoAdapter<C: TalChannel> {
    channel: C,
    tx_drops: u32,
}

impl<C: TalChannel> IoAdapter<C> {
    pub fn new(channel: C) -> Self {
        Self { channel, tx_drops: 0 }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Count of short writes absorbed instead of retried: partial
    /// writes increment the per-call tx-drop counter rather than
    /// retry. A binding driving this adapter should call
    /// `PeCallback::on_tx_drop` once per increment so the call's FSM
    /// can fold it into the DOWN-entry warning.
    pub fn tx_drops(&self) -> u32 {
        self.tx_drops
    }

    pub fn reset_tx_drops(&mut self) {
        self.tx_drops = 0;
    }
}

impl<C: TalChannel> PeIoHooks for IoAdapter<C> {
    fn set_cas(&mut self, bits: u8) -> Result<(), TalError> {
        self.channel.set_cas(bits)
    }

    fn get_cas(&mut self) -> Result<u8, TalError> {
        self.channel.get_cas()
    }

    fn flush_tx(&mut self) -> Result<(), TalError> {
        self.channel.flush_tx()
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, TalError> {
        let requested = buf.len();
        let written = self.channel.write(buf)?;
        if written < requested {
            self.tx_drops += 1;
        }
        Ok(written)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TalError> {
        self.channel.read(buf)
    }

    fn wait(&mut self, flags: WaitFlags, mode: WaitMode) -> Result<WaitFlags, TalError> {
        self.channel.wait(flags, mode)
    }

    fn get_oob_event(&mut self) -> Result<OobEvent, TalError> {
        self.channel.poll_oob_event()
    }

    fn open(&mut self) -> Result<(), TalError> {
        tracing::error!(channel = %self.channel.channel_id(), "PE adapter open() called but channel is fd-owned by TAL");
        Ok(())
    }

    fn close(&mut self) -> Result<(), TalError> {
        tracing::error!(channel = %self.channel.channel_id(), "PE adapter close() called but channel is fd-owned by TAL");
        Ok(())
    }

    fn setup(&mut self) -> Result<(), TalError> {
        tracing::error!(channel = %self.channel.channel_id(), "PE adapter setup() called but channel is fd-owned by TAL");
        Ok(())
    }
}
