/// Calling-party category, exchanged as part of the MF accept handshake
/// and carried on the `START` upward event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerCategory {
    NationalSubscriber,
    NationalPriority,
    International,
    InternationalPriority,
    CollectCall,
    Unknown(u8),
}

impl Default for CallerCategory {
    fn default() -> Self {
        CallerCategory::NationalSubscriber
    }
}
