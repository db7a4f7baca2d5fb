use std::sync::{Arc, Mutex};

use r2_core::{ChannelId, SpanId, TalError, TalHangupCause};
use r2_fsm::{CallServices, DigitDecision, StartDecision};
use r2_pe::{PeEngine, SimulatedPe};
use r2_tal::{CallerCategory, OobEvent, TalChannel, TalEventSink, UpwardEvent, WaitFlags, WaitMode};

use crate::factory;
use crate::monitor::SpanMonitor;

struct FakeTal {
    id: ChannelId,
    span: SpanId,
}

impl TalChannel for FakeTal {
    fn channel_id(&self) -> ChannelId {
        self.id
    }
    fn span_id(&self) -> SpanId {
        self.span
    }
    fn interval_ms(&self) -> u32 {
        20
    }
    fn set_cas(&mut self, _bits: u8) -> Result<(), TalError> {
        Ok(())
    }
    fn get_cas(&mut self) -> Result<u8, TalError> {
        Ok(0)
    }
    fn flush_tx(&mut self) -> Result<(), TalError> {
        Ok(())
    }
    fn write(&mut self, buf: &[u8]) -> Result<usize, TalError> {
        Ok(buf.len())
    }
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TalError> {
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
    fn set_blocked(&mut self) {}
    fn set_idle(&mut self) {}
    fn is_suspended(&self) -> bool {
        false
    }
}

#[derive(Clone, Default)]
struct RecordingBus(Arc<Mutex<Vec<UpwardEvent>>>);

impl TalEventSink for RecordingBus {
    fn emit(&self, event: UpwardEvent) {
        self.0.lock().unwrap().push(event);
    }
}

struct AcceptingServices;

impl CallServices for AcceptingServices {
    fn on_start(&mut self, _channel: ChannelId, _ani: &str, _dnis: &str, _category: CallerCategory) -> StartDecision {
        StartDecision::Accept
    }
    fn on_dnis_digit(&mut self, _channel: ChannelId, _collected_so_far: &str) -> DigitDecision {
        DigitDecision::Continue
    }
    fn local_hangup_cause(&mut self, _channel: ChannelId) -> Option<TalHangupCause> {
        None
    }
}

fn build_span(channel_count: u32) -> crate::Span<FakeTal, AcceptingServices> {
    let mut cfg = r2_config::SpanConfig::new(SpanId(1), channel_count);
    cfg.logdir = std::path::PathBuf::from("/tmp");
    let shared = r2_config::SharedSpanConfig::from_config(cfg);

    let tal_channels: Vec<FakeTal> = (0..channel_count).map(|i| FakeTal { id: ChannelId(i + 1), span: SpanId(1) }).collect();

    factory::configure(
        shared,
        tal_channels,
        |id| Box::new(SimulatedPe::new(id)) as Box<dyn PeEngine>,
        |_id| AcceptingServices,
        |_id| Box::new(RecordingBus::default()) as Box<dyn TalEventSink>,
    )
    .expect("span should configure")
}

#[test]
fn configure_rejects_mismatched_channel_count() {
    let mut cfg = r2_config::SpanConfig::new(SpanId(1), 4);
    cfg.logdir = std::path::PathBuf::from("/tmp");
    let shared = r2_config::SharedSpanConfig::from_config(cfg);
    let tal_channels: Vec<FakeTal> = (0..2).map(|i| FakeTal { id: ChannelId(i + 1), span: SpanId(1) }).collect();

    let result = factory::configure(
        shared,
        tal_channels,
        |id| Box::new(SimulatedPe::new(id)) as Box<dyn PeEngine>,
        |_id| AcceptingServices,
        |_id| Box::new(RecordingBus::default()) as Box<dyn TalEventSink>,
    );
    assert!(result.is_err());
}

#[test]
fn monitor_advances_histogram_each_iteration() {
    let span = build_span(2);
    let mut monitor = SpanMonitor::new(span);

    monitor.run_once();
    monitor.run_once();
    monitor.run_once();

    let state = monitor.span().shared.state_read();
    // First iteration never sees a previous `loop_start`, so only the
    // second and third iterations record a histogram sample.
    assert_eq!(state.histogram.total_loops, 2);
    assert_eq!(state.histogram.bucket_sum(), state.histogram.total_loops);
}

#[test]
fn block_refuses_active_call_and_unblock_requires_blocked() {
    let span = build_span(1);
    let slot = span.channel(0).unwrap().clone();

    {
        let mut guard = slot.lock().unwrap();
        assert!(guard.unblock().is_err(), "unblocking an idle channel should fail");
        assert!(guard.block().is_ok());
        assert!(guard.block().is_err(), "double block should fail");
        assert!(guard.unblock().is_ok());
    }
}

#[test]
fn registry_round_trips_spans() {
    let span = Arc::new(build_span(1));
    let registry: crate::SpanRegistry<FakeTal, AcceptingServices> = crate::SpanRegistry::new();
    registry.register(span.clone());

    assert_eq!(registry.span_ids(), vec![SpanId(1)]);
    assert!(registry.get(SpanId(1)).is_some());
    assert!(registry.unregister(SpanId(1)).is_some());
    assert!(registry.get(SpanId(1)).is_none());
}
