use std::sync::Mutex;

use r2_core::ChannelId;
use r2_fsm::{CallServices, EventTranslator};
use r2_pe::PeEngine;
use r2_tal::TalChannel;

/// One timeslot's worth of state: the PE channel handle, the TAL channel
/// + call FSM (bundled in `EventTranslator`), and the administrative
/// `suspended` flag the control surface's `block`/`unblock` toggles —
/// distinct from the call-scoped record, which lives entirely inside
/// the FSM and is reset per call.
///
/// Each channel has a mutex; public TAL operations on a channel acquire
/// it. `ChannelSlot` is always accessed through its own `Mutex`, never
/// concurrently with itself.
pub struct ChannelSlot<C: TalChannel, S: CallServices> {
    pub channel_id: ChannelId,
    pub engine: Box<dyn PeEngine>,
    pub translator: EventTranslator<C, S>,
    suspended: bool,
}

impl<C: TalChannel, S: CallServices> ChannelSlot<C, S> {
    pub fn new(channel_id: ChannelId, engine: Box<dyn PeEngine>, translator: EventTranslator<C, S>) -> Self {
        Self { channel_id, engine, translator, suspended: false }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// `block`: refused if the channel has a call in progress.
    pub fn block(&mut self) -> Result<(), &'static str> {
        if !self.translator.machine().is_idle() {
            return Err("channel has a call in progress");
        }
        if self.suspended {
            return Err("channel already blocked");
        }
        self.suspended = true;
        self.engine.set_blocked();
        self.translator.channel_mut().set_blocked();
        Ok(())
    }

    pub fn unblock(&mut self) -> Result<(), &'static str> {
        if !self.suspended {
            return Err("channel is not blocked");
        }
        self.suspended = false;
        self.engine.set_idle();
        self.translator.channel_mut().set_idle();
        Ok(())
    }
}

/// A channel slot behind its required mutex. The monitor holds this
/// for the duration of `advance_all` + `process_signaling` +
/// `advance_all`; the control surface holds it only for the duration of
/// one administrative command.
pub type GuardedSlot<C, S> = Mutex<ChannelSlot<C, S>>;
