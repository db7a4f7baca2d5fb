use std::sync::{Arc, Mutex};

use r2_config::SharedSpanConfig;
use r2_core::{ChannelId, ConfigError};
use r2_fsm::{CallServices, EventTranslator};
use r2_pe::PeEngine;
use r2_tal::{TalChannel, TalEventSink};

use crate::slot::ChannelSlot;
use crate::span::Span;

/// The span/channel factory: for each timeslot 1..N (<=
/// MAX_CHANNELS_PER_SPAN), creates a PE channel bound to the TAL file
/// descriptor and installs the per-channel log hook and call record.
///
/// The PE context itself, and the per-channel TAL file descriptor
/// binding, are external collaborators — callers supply one
/// already-bound `TalChannel` and one already-created PE engine per
/// timeslot. This function's job is purely assembly and validation:
/// checking the channel count against the configured span, and
/// building one `ChannelSlot` per timeslot with the call record reset
/// to its initial state.
///
/// Any failure tears down all partial allocations: since no external
/// resource is acquired before a call is actually offered or dialed
/// (TAL channels are opened lazily, on `on_call_init`/`dial`), a failed
/// `configure` simply never hands back the partially built `Vec` — it's
/// dropped in place, same effect without needing explicit unwind code.
pub fn configure<C, S>(
    shared: SharedSpanConfig,
    mut tal_channels: Vec<C>,
    mut make_engine: impl FnMut(ChannelId) -> Box<dyn PeEngine>,
    mut make_services: impl FnMut(ChannelId) -> S,
    mut make_bus: impl FnMut(ChannelId) -> Box<dyn TalEventSink>,
) -> Result<Span<C, S>, ConfigError>
where
    C: TalChannel,
    S: CallServices,
{
    let cfg = shared.config();
    cfg.validate()?;

    if tal_channels.len() as u32 != cfg.channel_count {
        tracing::error!(
            expected = cfg.channel_count,
            got = tal_channels.len(),
            "TAL channel count does not match configured span channel_count"
        );
        return Err(ConfigError::InvalidChannelCount);
    }

    let mut slots = Vec::with_capacity(tal_channels.len());
    for (idx, tal_channel) in tal_channels.drain(..).enumerate() {
        let channel_id = ChannelId(idx as u32 + 1);
        let engine = make_engine(channel_id);
        let services = make_services(channel_id);
        let bus = make_bus(channel_id);

        let translator = EventTranslator::new(
            tal_channel,
            bus,
            services,
            cfg.span_id,
            cfg.max_ani,
            cfg.max_dnis,
            cfg.mf_dump_size,
            cfg.logdir.clone(),
        );

        slots.push(Arc::new(Mutex::new(ChannelSlot::new(channel_id, engine, translator))));
    }

    shared.state_write().running = true;
    Ok(Span::new(shared, slots))
}

/// Tears down a span, freeing it at destroy time: marks every PE
/// channel blocked (mirrors the monitor's own exit behavior) and
/// clears the running flag so a concurrently-running monitor loop
/// stops on its next iteration.
pub fn destroy<C, S>(span: &Span<C, S>)
where
    C: TalChannel,
    S: CallServices,
{
    span.shared.state_write().running = false;
    for slot in &span.channels {
        let mut guard = slot.lock().expect("channel mutex poisoned");
        guard.engine.set_blocked();
    }
}
