/// Forward (outbound, caller side) vs. backward (inbound, callee side)
/// call direction, per the R2/MFC-R2 terminology used throughout the
/// glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDirection {
    /// Backward: the call was offered to us by the peer switch.
    Inbound,
    /// Forward: we originated the call toward the peer switch.
    Outbound,
}

impl CallDirection {
    #[inline]
    pub fn is_inbound(&self) -> bool {
        matches!(self, CallDirection::Inbound)
    }

    #[inline]
    pub fn is_outbound(&self) -> bool {
        matches!(self, CallDirection::Outbound)
    }
}
