//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`RepositoryConfig`]: labels, threshold, managers and alternates of one repository
//! - [`LifecycleParams`]: guard/cache lifetimes and manual-result re-queue policy

pub mod lifecycle_params;
pub mod repository_config;

pub use lifecycle_params::LifecycleParams;
pub use repository_config::{AlternateMapping, RepositoryConfig, VoteLabels};
