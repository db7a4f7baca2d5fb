/// Per-channel call states. `Cancel` is an internal, setup-time-only
/// state: it is entered directly by the RING entry action when the
/// upward listener refuses an offered call, a transition the two
/// direction tables below don't otherwise spell out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Down,
    Collect,
    Dialing,
    Ring,
    Progress,
    ProgressMedia,
    Up,
    Terminating,
    Hangup,
    Cancel,
}

impl CallState {
    /// Table-validated destinations for a requested transition. `Cancel`
    /// is reachable only via the internal RING-reject path (`force_to`,
    /// not this table) and `on_call_end` always forces `Down` directly
    /// regardless of current state, so neither appears as a source row
    /// here — see the event translator for both.
    pub fn allowed(direction_inbound: bool, from: CallState, to: CallState) -> bool {
        use CallState::*;
        if direction_inbound {
            matches!(
                (from, to),
                (Down, Collect)
                    | (Collect, Ring)
                    | (Collect, Terminating)
                    | (Ring, Hangup)
                    | (Ring, Terminating)
                    | (Ring, Progress)
                    | (Ring, ProgressMedia)
                    | (Ring, Up)
                    | (Progress, Hangup)
                    | (Progress, Terminating)
                    | (Progress, ProgressMedia)
                    | (Progress, Up)
                    | (ProgressMedia, Hangup)
                    | (ProgressMedia, Terminating)
                    | (ProgressMedia, Up)
                    | (Up, Hangup)
                    | (Up, Terminating)
                    | (Terminating, Hangup)
                    | (Hangup, Down)
                    | (Cancel, Hangup)
            )
        } else {
            matches!(
                (from, to),
                (Down, Dialing)
                    | (Dialing, Hangup)
                    | (Dialing, Terminating)
                    | (Dialing, ProgressMedia)
                    | (ProgressMedia, Hangup)
                    | (ProgressMedia, Terminating)
                    | (ProgressMedia, Up)
                    | (Up, Hangup)
                    | (Up, Terminating)
                    | (Terminating, Hangup)
                    | (Hangup, Down)
                    | (Cancel, Hangup)
            )
        }
    }
}
