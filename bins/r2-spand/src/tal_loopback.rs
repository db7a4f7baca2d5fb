use r2_core::{ChannelId, SpanId, TalError};
use r2_tal::{OobEvent, TalChannel, WaitFlags, WaitMode};

/// Standalone `TalChannel` for running a span without a real E1 trunk
/// behind it. The hardware binding is out of scope here the same way it
/// is for the PE itself; this loopback exists only so `r2-spand` can
/// bring a span up end to end off a bare config file.
pub struct LoopbackTal {
    id: ChannelId,
    span: SpanId,
    cas: u8,
    suspended: bool,
}

impl LoopbackTal {
    pub fn new(span: SpanId, id: ChannelId) -> Self {
        Self { id, span, cas: 0, suspended: false }
    }
}

impl TalChannel for LoopbackTal {
    fn channel_id(&self) -> ChannelId {
        self.id
    }

    fn span_id(&self) -> SpanId {
        self.span
    }

    fn interval_ms(&self) -> u32 {
        20
    }

    fn set_cas(&mut self, bits: u8) -> Result<(), TalError> {
        self.cas = bits;
        Ok(())
    }

    fn get_cas(&mut self) -> Result<u8, TalError> {
        Ok(self.cas)
    }

    fn flush_tx(&mut self) -> Result<(), TalError> {
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, TalError> {
        Ok(buf.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TalError> {
        buf.fill(0xd5); // A-law silence
        Ok(buf.len())
    }

    fn wait(&mut self, flags: WaitFlags, _mode: WaitMode) -> Result<WaitFlags, TalError> {
        Ok(flags)
    }

    fn poll_oob_event(&mut self) -> Result<OobEvent, TalError> {
        Ok(OobEvent::None)
    }

    fn open_channel(&mut self) -> Result<(), TalError> {
        Ok(())
    }

    fn close_channel(&mut self) {}

    fn set_blocked(&mut self) {
        self.suspended = true;
    }

    fn set_idle(&mut self) {
        self.suspended = false;
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}
