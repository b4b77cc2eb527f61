//! draftcut Common Utilities
//!
//! Shared infrastructure for all draftcut crates:
//! - Error types and result aliases
//! - Microsecond time helpers for the draft time model
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timecode;

pub use config::*;
pub use error::*;
pub use timecode::*;
