//! Rigpad Common Utilities
//!
//! Shared infrastructure for all Rigpad crates:
//! - Error types and result aliases
//! - Timing utilities (tick cadence, FPS estimation)
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
