//! Fundamental types shared across the R2 span signaling stack.

/// Git version string, set at compile time.
pub const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");
/// Crate version followed by the git revision, e.g. "0.1.0-aabbccdd".
pub const CORE_VERSION: &str = const_format::formatcp!("{}-{}", env!("CARGO_PKG_VERSION"), GIT_VERSION);

pub mod cause;
pub mod debug;
pub mod digits;
pub mod direction;
pub mod error;
pub mod ids;

pub use cause::{PeDisconnectCause, TalHangupCause};
pub use digits::DigitBuffer;
pub use direction::CallDirection;
pub use error::{ConfigError, TalError};
pub use ids::{ChannelId, SpanId};
