//! Infrastructure layer for govbot
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod github;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLifecycleConfig, FileReportConfig,
    FileVoteConfig,
};
pub use github::{GhCli, GhCliPlatform};
pub use logging::JsonlErrorReporter;
