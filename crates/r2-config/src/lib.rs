//! Span configuration: the immutable option table a span is configured
//! with, the mutable runtime state the monitor loop updates every
//! iteration, and TOML loading for both.

pub mod span_config;
pub mod span_state;
pub mod toml_config;

pub use span_config::{MAX_CHANNELS_PER_SPAN, PeLogLevels, R2Variant, SpanConfig};
pub use span_state::{LoopHistogram, SharedSpanConfig, SpanState};
