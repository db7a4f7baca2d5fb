//! PE ↔ TAL disconnect cause mapping.
//!
//! Grounded directly in the original `ftdm_r2_cause_to_ftdm_cause` /
//! `ftdm_r2_ftdm_cause_to_openr2_cause` switch statements: the forward
//! mapping (PE cause observed on a peer disconnect -> TAL hangup cause)
//! and the reverse mapping (TAL's locally-set hangup cause -> PE cause to
//! signal on disconnect) are deliberately *not* symmetric.

/// Causes as reported by the protocol engine (PE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeDisconnectCause {
    NormalClearing,
    BusyNumber,
    NetworkCongestion,
    UnallocatedNumber,
    NumberChanged,
    OutOfOrder,
    NoAnswer,
    Unspecified,
    CollectCallRejected,
    ForcedRelease,
}

/// Causes as understood by the telephony abstraction layer (TAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalHangupCause {
    NormalClearing,
    UserBusy,
    SwitchCongestion,
    NoRouteDestination,
    NumberChanged,
    NetworkOutOfOrder,
    NoAnswer,
    NormalUnspecified,
    CallRejected,
    ProtocolError,
    ServiceUnavailable,
    NoUserResponse,
}

/// PE -> TAL. An unrecognized PE cause maps to `NormalUnspecified` and the
/// caller should log a warning (mirrors the original's `default:` arm).
pub fn pe_cause_to_tal_cause(cause: PeDisconnectCause) -> TalHangupCause {
    use PeDisconnectCause::*;
    match cause {
        NormalClearing => TalHangupCause::NormalClearing,
        BusyNumber => TalHangupCause::UserBusy,
        NetworkCongestion => TalHangupCause::SwitchCongestion,
        UnallocatedNumber => TalHangupCause::NoRouteDestination,
        NumberChanged => TalHangupCause::NumberChanged,
        OutOfOrder => TalHangupCause::NetworkOutOfOrder,
        NoAnswer => TalHangupCause::NoAnswer,
        CollectCallRejected => TalHangupCause::CallRejected,
        ForcedRelease => TalHangupCause::NormalClearing,
        Unspecified => TalHangupCause::NormalUnspecified,
    }
}

/// TAL -> PE. Asymmetric with the forward mapping: `ServiceUnavailable`
/// and `NoUserResponse` fold into PE causes that have no distinct reverse
/// counterpart (`OutOfOrder` and `NoAnswer` respectively).
pub fn tal_cause_to_pe_cause(cause: TalHangupCause) -> PeDisconnectCause {
    use TalHangupCause::*;
    match cause {
        NormalClearing => PeDisconnectCause::NormalClearing,
        UserBusy => PeDisconnectCause::BusyNumber,
        SwitchCongestion => PeDisconnectCause::NetworkCongestion,
        NoRouteDestination => PeDisconnectCause::UnallocatedNumber,
        NumberChanged => PeDisconnectCause::NumberChanged,
        NetworkOutOfOrder => PeDisconnectCause::OutOfOrder,
        NoAnswer => PeDisconnectCause::NoAnswer,
        NormalUnspecified => PeDisconnectCause::Unspecified,
        CallRejected => PeDisconnectCause::CollectCallRejected,
        ProtocolError => PeDisconnectCause::Unspecified,
        ServiceUnavailable => PeDisconnectCause::OutOfOrder,
        NoUserResponse => PeDisconnectCause::NoAnswer,
    }
}
