use std::sync::{Arc, Mutex};

use r2_core::{ChannelId, SpanId, TalError, TalHangupCause};
use r2_pe::{AcceptMode, PeCallback, ScriptedCallback, SimulatedPe};
use r2_tal::{CallerCategory, OobEvent, TalChannel, TalEventSink, UpwardEvent, WaitFlags, WaitMode};

use crate::services::{CallServices, DigitDecision, StartDecision};
use crate::state::CallState;
use crate::translator::EventTranslator;

struct FakeTal {
    id: ChannelId,
    span: SpanId,
    opened: bool,
    closed: bool,
}

impl FakeTal {
    fn new() -> Self {
        Self { id: ChannelId(1), span: SpanId(1), opened: false, closed: false }
    }
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
        self.opened = true;
        Ok(())
    }
    fn close_channel(&mut self) {
        self.closed = true;
    }
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

struct ScriptedServices {
    start: StartDecision,
    dnis: DigitDecision,
}

impl CallServices for ScriptedServices {
    fn on_start(&mut self, _channel: ChannelId, _ani: &str, _dnis: &str, _category: CallerCategory) -> StartDecision {
        self.start
    }
    fn on_dnis_digit(&mut self, _channel: ChannelId, _collected_so_far: &str) -> DigitDecision {
        self.dnis
    }
    fn local_hangup_cause(&mut self, _channel: ChannelId) -> Option<TalHangupCause> {
        None
    }
}

fn harness(
    start: StartDecision,
) -> (EventTranslator<FakeTal, ScriptedServices>, SimulatedPe, RecordingBus) {
    let bus = RecordingBus::default();
    let services = ScriptedServices { start, dnis: DigitDecision::Continue };
    let translator = EventTranslator::new(
        FakeTal::new(),
        Box::new(bus.clone()),
        services,
        SpanId(1),
        10,
        4,
        0,
        std::path::PathBuf::from("/tmp"),
    );
    let engine = SimulatedPe::new(ChannelId(1));
    (translator, engine, bus)
}

/// Same as `harness`, but with the setup dump enabled — used by the
/// tests exercising the protocol-error diagnostic capture.
fn harness_with_dump(
    start: StartDecision,
    mf_dump_size: usize,
    logdir: std::path::PathBuf,
) -> (EventTranslator<FakeTal, ScriptedServices>, SimulatedPe, RecordingBus) {
    let bus = RecordingBus::default();
    let services = ScriptedServices { start, dnis: DigitDecision::Continue };
    let translator = EventTranslator::new(FakeTal::new(), Box::new(bus.clone()), services, SpanId(1), 10, 4, mf_dump_size, logdir);
    let engine = SimulatedPe::new(ChannelId(1));
    (translator, engine, bus)
}

fn run_pump(translator: &mut EventTranslator<FakeTal, ScriptedServices>, engine: &mut SimulatedPe) {
    translator.advance_all(engine);
    while !engine.script_is_empty() {
        engine.process_signaling(translator);
        translator.advance_all(engine);
    }
}

/// Scenario 1: inbound happy path.
#[test]
fn inbound_happy_path() {
    let (mut translator, mut engine, bus) = harness(StartDecision::Accept);

    engine.push(ScriptedCallback::CallInit { logname: "c1".into() });
    engine.push(ScriptedCallback::CallOffered {
        ani: "123".into(),
        dnis: "4567".into(),
        category: CallerCategory::NationalSubscriber,
    });
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Ring);

    // Listener accepts (already reflected in RING's entry action above)
    // and then answers — the two are distinct app decisions.
    translator.request_answer();
    run_pump(&mut translator, &mut engine);

    assert_eq!(translator.machine().state(), CallState::Up);
    assert!(engine.accept_requested());

    engine.push(ScriptedCallback::CallAccepted { mode: AcceptMode::Inbound });
    run_pump(&mut translator, &mut engine);
    assert!(engine.answer_requested());

    engine.push(ScriptedCallback::CallDisconnect { cause: r2_core::PeDisconnectCause::NormalClearing });
    engine.push(ScriptedCallback::CallEnd);
    run_pump(&mut translator, &mut engine);

    assert_eq!(translator.machine().state(), CallState::Down);
    let events = bus.0.lock().unwrap();
    assert!(matches!(events[0], UpwardEvent::Start { .. }));
    let up_idx = events.iter().position(|e| matches!(e, UpwardEvent::Up { .. })).unwrap();
    let stop_idx = events.iter().position(|e| matches!(e, UpwardEvent::Stop { .. })).unwrap();
    assert!(up_idx < stop_idx);
}

/// Scenario 2: outbound happy path.
#[test]
fn outbound_happy_path() {
    let (mut translator, mut engine, bus) = harness(StartDecision::Accept);
    translator.dial("o1");
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Dialing);

    engine.push(ScriptedCallback::CallAccepted { mode: AcceptMode::Outbound });
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::ProgressMedia);

    engine.push(ScriptedCallback::CallAnswered);
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Up);

    engine.push(ScriptedCallback::CallDisconnect { cause: r2_core::PeDisconnectCause::NormalClearing });
    engine.push(ScriptedCallback::CallEnd);
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Down);

    let events = bus.0.lock().unwrap();
    assert!(events.iter().any(|e| matches!(e, UpwardEvent::Proceed { .. })));
    assert!(events.iter().any(|e| matches!(e, UpwardEvent::ProgressMedia { .. })));
    assert!(events.iter().any(|e| matches!(e, UpwardEvent::Up { .. })));
    assert!(events.iter().any(|e| matches!(e, UpwardEvent::Stop { .. })));
}

/// Scenario 3: protocol error while the accept barrier is held.
#[test]
fn protocol_error_during_accept() {
    let (mut translator, mut engine, bus) = harness(StartDecision::Accept);

    engine.push(ScriptedCallback::CallInit { logname: "c1".into() });
    engine.push(ScriptedCallback::CallOffered {
        ani: "1".into(),
        dnis: "2".into(),
        category: CallerCategory::NationalSubscriber,
    });
    run_pump(&mut translator, &mut engine);

    // Drive the call into a progress state so the accept barrier is
    // actually held when the protocol error fires below.
    translator.request_progress();
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Progress);
    assert!(translator.is_state_change_pending());

    engine.push(ScriptedCallback::ProtocolError { reason: "tone timeout".into() });
    run_pump(&mut translator, &mut engine);
    assert!(!translator.is_state_change_pending());

    engine.push(ScriptedCallback::CallEnd);
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Down);

    let events = bus.0.lock().unwrap();
    let stop = events.iter().find_map(|e| match e {
        UpwardEvent::Stop { cause, .. } => Some(*cause),
        _ => None,
    });
    assert_eq!(stop, Some(TalHangupCause::ProtocolError));
}

/// The setup dump actually captures read/write bytes and flushes them
/// to disk when a protocol error lands during setup.
#[test]
fn protocol_error_flushes_captured_dump() {
    let dir = std::env::temp_dir().join(format!("r2fsm-dumptest-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let (mut translator, mut engine, _bus) = harness_with_dump(StartDecision::Accept, 64, dir.clone());

    engine.push(ScriptedCallback::CallInit { logname: "dtest".into() });
    run_pump(&mut translator, &mut engine);

    engine.push(ScriptedCallback::CallRead { buf: vec![1, 2, 3] });
    engine.push(ScriptedCallback::CallWrite { buf: vec![9, 8] });
    run_pump(&mut translator, &mut engine);

    engine.push(ScriptedCallback::ProtocolError { reason: "tone timeout".into() });
    run_pump(&mut translator, &mut engine);

    let input = std::fs::read(dir.join("dtest.s1c1.input.alaw")).unwrap();
    let output = std::fs::read(dir.join("dtest.s1c1.output.alaw")).unwrap();
    assert_eq!(input, vec![1, 2, 3]);
    assert_eq!(output, vec![9, 8]);

    engine.push(ScriptedCallback::CallEnd);
    run_pump(&mut translator, &mut engine);

    let _ = std::fs::remove_dir_all(&dir);
}

/// Short writes reported through `on_tx_drop` accrue on the call's
/// `Machine` so the DOWN-entry warning has something to report.
#[test]
fn tx_drops_are_counted_through_the_write_hook() {
    let (mut translator, mut engine, _bus) = harness(StartDecision::Accept);

    engine.push(ScriptedCallback::CallInit { logname: "c1".into() });
    run_pump(&mut translator, &mut engine);

    engine.push(ScriptedCallback::TxDrop);
    engine.push(ScriptedCallback::TxDrop);
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().tx_drops(), 2);

    engine.push(ScriptedCallback::CallEnd);
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Down);
}

/// Scenario 4: listener rejects the RING offer.
#[test]
fn listener_rejects_ring() {
    let (mut translator, mut engine, bus) = harness(StartDecision::Reject);

    engine.push(ScriptedCallback::CallInit { logname: "c1".into() });
    engine.push(ScriptedCallback::CallOffered {
        ani: "1".into(),
        dnis: "2".into(),
        category: CallerCategory::NationalSubscriber,
    });
    run_pump(&mut translator, &mut engine);

    assert_eq!(engine.disconnect_requested(), Some(r2_core::PeDisconnectCause::OutOfOrder));

    engine.push(ScriptedCallback::CallEnd);
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Down);

    let events = bus.0.lock().unwrap();
    assert!(!events.iter().any(|e| matches!(e, UpwardEvent::Up { .. } | UpwardEvent::Stop { .. })));
}

/// Scenario 5: local hangup drives disconnect, PE's `on_call_end`
/// finishes the job without a duplicate disconnect request.
#[test]
fn local_hangup_before_pe_disconnect() {
    let (mut translator, mut engine, _bus) = harness(StartDecision::Accept);

    engine.push(ScriptedCallback::CallInit { logname: "c1".into() });
    engine.push(ScriptedCallback::CallOffered {
        ani: "1".into(),
        dnis: "2".into(),
        category: CallerCategory::NationalSubscriber,
    });
    run_pump(&mut translator, &mut engine);
    translator.request_answer();
    engine.push(ScriptedCallback::CallAccepted { mode: AcceptMode::Inbound });
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Up);

    translator.local_hangup(TalHangupCause::NormalClearing);
    run_pump(&mut translator, &mut engine);
    assert_eq!(engine.disconnect_requested(), Some(r2_core::PeDisconnectCause::NormalClearing));

    engine.push(ScriptedCallback::CallEnd);
    run_pump(&mut translator, &mut engine);
    assert_eq!(translator.machine().state(), CallState::Down);
}

/// Scenario 6: DNIS overflow stops collection exactly at max_dnis.
#[test]
fn dnis_overflow_stops_at_max() {
    let (mut translator, _engine, _bus) = harness(StartDecision::Accept);
    let services_stop_on_full = DigitDecision::Continue;
    let _ = services_stop_on_full;

    let mut last = true;
    for d in ['5', '6', '7', '8', '9'] {
        last = translator.on_dnis_digit_received(ChannelId(1), d) == r2_pe::DigitRequestResult::Continue;
    }
    assert!(!last);
    assert_eq!(translator.machine().caller.dnis.as_str(), "5678");
}
