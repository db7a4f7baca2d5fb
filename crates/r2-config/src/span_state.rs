use std::sync::{Arc, RwLock};

use crate::span_config::SpanConfig;

/// Ten 10ms buckets plus an overflow bucket, reported by `loopstats`.
/// Bucket `i` (i < 10) counts loops that took `[10*i, 10*(i+1))` ms;
/// bucket 10 counts everything `>= 100ms`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopHistogram {
    pub buckets: [u64; 11],
    pub max_loop_ms: u64,
    pub total_loops: u64,
}

impl LoopHistogram {
    /// `index = min(ms/10, 10)`. Kept as a free function so it is
    /// directly unit-testable without a running monitor.
    pub fn record(&mut self, elapsed_ms: u64) {
        let idx = std::cmp::min(elapsed_ms / 10, 10) as usize;
        self.buckets[idx] += 1;
        self.total_loops += 1;
        if elapsed_ms > self.max_loop_ms {
            self.max_loop_ms = elapsed_ms;
        }
    }

    /// Invariant: histogram buckets sum to `total_loops` exactly.
    pub fn bucket_sum(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// Percentage of total loops per bucket, to 3 decimal places.
    /// Returns `0.0` for every bucket when no loops have run yet,
    /// rather than dividing by zero.
    pub fn percentages(&self) -> [f64; 11] {
        if self.total_loops == 0 {
            return [0.0; 11];
        }
        let mut out = [0.0; 11];
        for (i, count) in self.buckets.iter().enumerate() {
            out[i] = (*count as f64 / self.total_loops as f64) * 100.0;
        }
        out
    }
}

/// Mutable span state, `RwLock`-guarded: written by the monitor loop
/// every iteration, read by the control surface.
#[derive(Debug, Clone, Default)]
pub struct SpanState {
    pub running: bool,
    pub monitor_thread: Option<String>,
    pub histogram: LoopHistogram,
    pub last_error: Option<String>,
}

/// Immutable config + mutable state, the same split `SharedConfig` uses
/// upstream.
#[derive(Clone)]
pub struct SharedSpanConfig {
    cfg: Arc<SpanConfig>,
    state: Arc<RwLock<SpanState>>,
}

impl SharedSpanConfig {
    pub fn from_config(cfg: SpanConfig) -> Self {
        Self::from_parts(cfg, SpanState::default())
    }

    /// Validates `cfg` and panics if invalid — configuration is checked
    /// once at startup, not on every access, matching the upstream
    /// `SharedConfig::from_parts` convention.
    pub fn from_parts(cfg: SpanConfig, state: SpanState) -> Self {
        if let Err(err) = cfg.validate() {
            panic!("invalid span configuration: {err}");
        }
        Self { cfg: Arc::new(cfg), state: Arc::new(RwLock::new(state)) }
    }

    pub fn config(&self) -> Arc<SpanConfig> {
        Arc::clone(&self.cfg)
    }

    pub fn state_read(&self) -> std::sync::RwLockReadGuard<'_, SpanState> {
        self.state.read().expect("SpanState RwLock poisoned")
    }

    pub fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, SpanState> {
        self.state.write().expect("SpanState RwLock poisoned")
    }
}
