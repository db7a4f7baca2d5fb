pub mod dump;
pub mod machine;
pub mod services;
pub mod state;
pub mod translator;

pub use machine::{Ctx, Machine};
pub use services::{CallServices, DigitDecision, StartDecision};
pub use state::CallState;
pub use translator::EventTranslator;

#[cfg(test)]
mod tests;
