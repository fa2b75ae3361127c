//! Shared test utilities for statewait
//!
//! ## Modules
//!
//! - [`clock`]: a manual clock that advances instantly and records sleeps
//! - [`probe`]: scripted probes that replay a fixed sequence of observations

pub mod clock;
pub mod probe;

// Re-export commonly used items
pub use clock::ManualClock;
pub use probe::{ScriptedProbe, Step};
