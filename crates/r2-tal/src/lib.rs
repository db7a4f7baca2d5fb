//! The telephony abstraction layer (TAL) surface the R2 span core is
//! bridged against. The TAL's actual channel I/O, mutexes, timers,
//! hashing primitives, and event-queue dispatch live outside this crate
//! (they are external collaborators per the core's scope); this crate
//! defines the narrow contract the core needs from them.

pub mod caller_data;
pub mod category;
pub mod channel;
pub mod events;

pub use caller_data::CallerData;
pub use category::CallerCategory;
pub use channel::{OobEvent, TalChannel, WaitFlags, WaitMode};
pub use events::{ChannelEventSink, DigitKind, SigStatus, TalEventSink, UpwardEvent};
