//! Configuration file loading for govbot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `GOVBOT_` environment variables (`GOVBOT_VOTE__THRESHOLD=all`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./govbot.toml` or `./.govbot.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/govbot/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLifecycleConfig, FileReportConfig, FileVoteConfig,
};
pub use loader::ConfigLoader;
