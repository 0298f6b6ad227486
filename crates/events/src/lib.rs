//! Session events for the trainer
//!
//! A session publishes every state change here so a presentation layer can
//! follow along without reaching into the session's state.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
