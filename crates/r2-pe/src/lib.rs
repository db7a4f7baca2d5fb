pub mod engine;
pub mod io_adapter;
pub mod simulated;

pub use engine::{AcceptMode, DigitRequestResult, PeCallback, PeEngine};
pub use io_adapter::{IoAdapter, PeIoHooks};
pub use simulated::{ScriptedCallback, SimulatedPe};
