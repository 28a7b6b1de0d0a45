//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod error_reporter;
pub mod platform;
pub mod progress;
