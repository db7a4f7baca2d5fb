use r2_config::R2Variant;
use r2_core::SpanId;
use r2_fsm::CallServices;
use r2_span::SpanRegistry;
use r2_tal::TalChannel;

/// The administrative control surface. Every command is a line of
/// whitespace-separated tokens; every response ends with `+OK.` on
/// success or `-ERR <reason>.` on failure.
pub struct Control<'a, C: TalChannel, S: CallServices> {
    registry: &'a SpanRegistry<C, S>,
}

impl<'a, C: TalChannel, S: CallServices> Control<'a, C, S> {
    pub fn new(registry: &'a SpanRegistry<C, S>) -> Self {
        Self { registry }
    }

    /// Parses and runs one administrative command line, returning the
    /// full response text (possibly multi-line, always `+OK.`/`-ERR
    /// ...` terminated).
    pub fn dispatch(&self, line: &str) -> String {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("block") => self.block_unblock(tokens, true),
            Some("unblock") => self.block_unblock(tokens, false),
            Some("status") => self.status(tokens),
            Some("loopstats") => self.loopstats(tokens),
            Some("threads") => self.threads(),
            Some("version") => Self::version(),
            Some("variants") => Self::variants(),
            Some(other) => format!("-ERR unknown command '{other}'."),
            None => "-ERR empty command.".to_string(),
        }
    }

    fn block_unblock(&self, mut tokens: std::str::SplitWhitespace<'_>, block: bool) -> String {
        let Some(span_id) = tokens.next().and_then(parse_u32).map(SpanId) else {
            return "-ERR missing or invalid span id.".to_string();
        };
        let Some(span) = self.registry.get(span_id) else {
            return format!("-ERR no such span {span_id}.");
        };
        let chan_arg = tokens.next().and_then(parse_u32);

        let mut lines = Vec::new();
        let mut had_error = false;
        for (idx, slot) in span.channels.iter().enumerate() {
            let chan_num = idx as u32 + 1;
            if let Some(want) = chan_arg {
                if want != chan_num {
                    continue;
                }
            }
            let mut guard = slot.lock().expect("channel mutex poisoned");
            let result = if block { guard.block() } else { guard.unblock() };
            match result {
                Ok(()) => lines.push(format!("channel {chan_num}: {}", if block { "blocked" } else { "idle" })),
                Err(reason) => {
                    had_error = true;
                    lines.push(format!("channel {chan_num}: error - {reason}"));
                }
            }
        }
        if lines.is_empty() {
            return "-ERR no matching channel(s).".to_string();
        }
        lines.push(if had_error { "-ERR one or more channels failed.".to_string() } else { "+OK.".to_string() });
        lines.join("\n")
    }

    fn status(&self, mut tokens: std::str::SplitWhitespace<'_>) -> String {
        let Some(span_id) = tokens.next().and_then(parse_u32).map(SpanId) else {
            return "-ERR missing or invalid span id.".to_string();
        };
        let Some(span) = self.registry.get(span_id) else {
            return format!("-ERR no such span {span_id}.");
        };
        let cfg = span.shared.config();
        let state = span.shared.state_read();

        let mut lines = vec![
            format!("span: {span_id}"),
            format!("variant: {}", cfg.variant.name()),
            format!("max_ani: {} max_dnis: {}", cfg.max_ani, cfg.max_dnis),
            format!("ani_first: {} immediate_accept: {}", cfg.get_ani_first, cfg.immediate_accept),
            format!("monitor_thread: {}", state.monitor_thread.as_deref().unwrap_or("none")),
            format!("max_loop_ms: {} total_loops: {}", state.histogram.max_loop_ms, state.histogram.total_loops),
        ];

        for (idx, slot) in span.channels.iter().enumerate() {
            let guard = slot.lock().expect("channel mutex poisoned");
            let (tx, rx) = guard.engine.cas_bits();
            lines.push(format!(
                "channel {}: {} tx_cas={:04b} rx_cas={:04b}",
                idx + 1,
                if guard.is_suspended() { "blocked" } else { "idle" },
                tx,
                rx
            ));
        }
        lines.push("+OK.".to_string());
        lines.join("\n")
    }

    fn loopstats(&self, mut tokens: std::str::SplitWhitespace<'_>) -> String {
        let Some(span_id) = tokens.next().and_then(parse_u32).map(SpanId) else {
            return "-ERR missing or invalid span id.".to_string();
        };
        let Some(span) = self.registry.get(span_id) else {
            return format!("-ERR no such span {span_id}.");
        };
        let state = span.shared.state_read();
        let percentages = state.histogram.percentages();

        let mut lines = vec![format!("total_loops: {}", state.histogram.total_loops)];
        for (i, pct) in percentages.iter().enumerate().take(10) {
            lines.push(format!("{:>3}-{:<3}ms: {:.3}%", i * 10, (i + 1) * 10, pct));
        }
        lines.push(format!(">=100ms: {:.3}%", percentages[10]));
        lines.push("+OK.".to_string());
        lines.join("\n")
    }

    fn threads(&self) -> String {
        let mut lines = Vec::new();
        for span_id in self.registry.span_ids() {
            if let Some(span) = self.registry.get(span_id) {
                let state = span.shared.state_read();
                lines.push(format!("span {span_id}: {}", state.monitor_thread.as_deref().unwrap_or("none")));
            }
        }
        lines.push("+OK.".to_string());
        lines.join("\n")
    }

    fn version() -> String {
        format!("{}\n+OK.", r2_core::CORE_VERSION)
    }

    fn variants() -> String {
        let names = [
            R2Variant::Itu,
            R2Variant::Argentina,
            R2Variant::Brazil,
            R2Variant::Chile,
            R2Variant::China,
            R2Variant::Colombia,
            R2Variant::CzechRepublic,
            R2Variant::Ecuador,
            R2Variant::Mexico,
            R2Variant::Philippines,
            R2Variant::Venezuela,
        ]
        .iter()
        .map(|v| v.name())
        .collect::<Vec<_>>()
        .join(", ");
        format!("{names}\n+OK.")
    }
}

fn parse_u32(token: &str) -> Option<u32> {
    token.parse().ok()
}
