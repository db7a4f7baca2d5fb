use std::fmt;

/// Errors surfaced by the span/channel factory while interpreting
/// configuration options. Reported through `configure()`'s `Result`
/// and mirrored into the span's `last_error` text for the control
/// surface's `-ERR <reason>.` convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownOption(String),
    UnknownVariant(String),
    AlreadyConfigured,
    InvalidChannelCount,
    Other(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownOption(opt) => write!(f, "unknown configuration option: {opt}"),
            ConfigError::UnknownVariant(v) => write!(f, "unknown R2 variant: {v}"),
            ConfigError::AlreadyConfigured => write!(f, "span is already configured for signaling"),
            ConfigError::InvalidChannelCount => write!(f, "invalid channel count for span"),
            ConfigError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Local TAL I/O failures observed by the PE adapter. These are
/// logged at the call site and reflected into the monitor loop's
/// per-iteration error handling; they never unwind into the PE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TalError {
    CasFailure(String),
    ReadFailure(String),
    WriteFailure(String),
    WaitFailure(String),
}

impl fmt::Display for TalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TalError::CasFailure(msg) => write!(f, "CAS I/O failure: {msg}"),
            TalError::ReadFailure(msg) => write!(f, "TAL read failure: {msg}"),
            TalError::WriteFailure(msg) => write!(f, "TAL write failure: {msg}"),
            TalError::WaitFailure(msg) => write!(f, "TAL wait failure: {msg}"),
        }
    }
}

impl std::error::Error for TalError {}
