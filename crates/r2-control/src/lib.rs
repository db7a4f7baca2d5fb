//! The administrative control surface: a small text command language
//! for operating spans that are already running under a
//! [`r2_span::SpanRegistry`]. `bins/r2-spand` exposes this over a line-
//! oriented TCP listener; tests drive it directly.

pub mod commands;

pub use commands::Control;

#[cfg(test)]
mod tests {
    use r2_core::{ChannelId, SpanId, TalHangupCause};
    use r2_fsm::{CallServices, DigitDecision, StartDecision};
    use r2_pe::{PeEngine, SimulatedPe};
    use r2_span::SpanRegistry;
    use r2_tal::{CallerCategory, OobEvent, TalChannel, TalEventSink, UpwardEvent, WaitFlags, WaitMode};
    use std::sync::Arc;

    use crate::Control;

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
        fn set_cas(&mut self, _bits: u8) -> Result<(), r2_core::TalError> {
            Ok(())
        }
        fn get_cas(&mut self) -> Result<u8, r2_core::TalError> {
            Ok(0)
        }
        fn flush_tx(&mut self) -> Result<(), r2_core::TalError> {
            Ok(())
        }
        fn write(&mut self, buf: &[u8]) -> Result<usize, r2_core::TalError> {
            Ok(buf.len())
        }
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, r2_core::TalError> {
            Ok(buf.len())
        }
        fn wait(&mut self, flags: WaitFlags, _mode: WaitMode) -> Result<WaitFlags, r2_core::TalError> {
            Ok(flags)
        }
        fn poll_oob_event(&mut self) -> Result<OobEvent, r2_core::TalError> {
            Ok(OobEvent::None)
        }
        fn open_channel(&mut self) -> Result<(), r2_core::TalError> {
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
    struct RecordingBus(Arc<std::sync::Mutex<Vec<UpwardEvent>>>);

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

    fn build_registry(channel_count: u32) -> SpanRegistry<FakeTal, AcceptingServices> {
        let mut cfg = r2_config::SpanConfig::new(SpanId(1), channel_count);
        cfg.logdir = std::path::PathBuf::from("/tmp");
        let shared = r2_config::SharedSpanConfig::from_config(cfg);
        let tal_channels: Vec<FakeTal> = (0..channel_count).map(|i| FakeTal { id: ChannelId(i + 1), span: SpanId(1) }).collect();

        let span = r2_span::configure(
            shared,
            tal_channels,
            |id| Box::new(SimulatedPe::new(id)) as Box<dyn PeEngine>,
            |_id| AcceptingServices,
            |_id| Box::new(RecordingBus::default()) as Box<dyn TalEventSink>,
        )
        .expect("span should configure");

        let registry = SpanRegistry::new();
        registry.register(Arc::new(span));
        registry
    }

    #[test]
    fn version_and_variants_are_informational_and_ok() {
        let registry = build_registry(1);
        let control = Control::new(&registry);

        let version = control.dispatch("version");
        assert!(version.ends_with("+OK."));

        let variants = control.dispatch("variants");
        assert!(variants.contains("itu"));
        assert!(variants.ends_with("+OK."));
    }

    #[test]
    fn status_reports_unknown_span_as_error() {
        let registry = build_registry(1);
        let control = Control::new(&registry);
        let response = control.dispatch("status 99");
        assert!(response.starts_with("-ERR"));
    }

    #[test]
    fn status_reports_known_span_fields() {
        let registry = build_registry(2);
        let control = Control::new(&registry);
        let response = control.dispatch("status 1");
        assert!(response.contains("variant: itu"));
        assert!(response.contains("channel 1:"));
        assert!(response.contains("channel 2:"));
        assert!(response.ends_with("+OK."));
    }

    #[test]
    fn block_then_unblock_round_trips() {
        let registry = build_registry(1);
        let control = Control::new(&registry);

        let blocked = control.dispatch("block 1 1");
        assert!(blocked.ends_with("+OK."), "{blocked}");

        let again = control.dispatch("block 1 1");
        assert!(again.starts_with("-ERR") || again.contains("error"), "{again}");

        let unblocked = control.dispatch("unblock 1 1");
        assert!(unblocked.ends_with("+OK."), "{unblocked}");
    }

    #[test]
    fn loopstats_reports_zero_before_any_loop_runs() {
        let registry = build_registry(1);
        let control = Control::new(&registry);
        let response = control.dispatch("loopstats 1");
        assert!(response.contains("total_loops: 0"));
        assert!(response.ends_with("+OK."));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let registry = build_registry(1);
        let control = Control::new(&registry);
        let response = control.dispatch("frobnicate");
        assert!(response.starts_with("-ERR"));
    }
}
