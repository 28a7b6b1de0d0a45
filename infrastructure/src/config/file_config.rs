//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain and application types
//! where appropriate.

use govbot_application::{AlternateMapping, LifecycleParams, RepositoryConfig, VoteLabels};
use govbot_domain::ThresholdTier;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("lifecycle.{0} cannot be 0")]
    ZeroDuration(&'static str),

    #[error("vote.labels.{0} cannot be empty")]
    EmptyLabel(&'static str),

    #[error("vote.labels must be distinct, `{0}` is used twice")]
    DuplicateLabel(String),

    #[error("alternates for @{group}: {field} cannot be empty")]
    IncompleteAlternates { group: String, field: &'static str },
}

/// Raw `[vote]` section
///
/// # Example
///
/// ```toml
/// [vote]
/// threshold = "twothirds"
/// managers = ["chair"]
/// excluded_logins = ["release-bot"]
///
/// [vote.labels]
/// open = "vote/open"
///
/// [[vote.alternates]]
/// group = "org/council"
/// source_repo = "org/.github"
/// path = "council.toml"
/// field = "project"
/// primary_team = "org/council"
/// secondary_team = "org/council-alternates"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVoteConfig {
    /// Threshold used when an item does not set one
    pub threshold: ThresholdTier,
    pub labels: VoteLabels,
    /// Login the bot acts as; its own reactions and comments never count
    pub bot_login: String,
    /// Logins allowed to record a manual result
    pub managers: Vec<String>,
    /// Logins never counted as group members
    pub excluded_logins: Vec<String>,
    /// Text marking a comment as a manual result
    pub manual_result_marker: String,
    pub alternates: Vec<AlternateMapping>,
}

impl Default for FileVoteConfig {
    fn default() -> Self {
        let defaults = RepositoryConfig::default();
        Self {
            threshold: defaults.threshold,
            labels: defaults.labels,
            bot_login: defaults.bot_login,
            managers: defaults.managers,
            excluded_logins: defaults.excluded_logins,
            manual_result_marker: defaults.manual_result_marker,
            alternates: defaults.alternates,
        }
    }
}

/// Raw `[lifecycle]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLifecycleConfig {
    /// Seconds an idle single-flight entry is kept
    pub guard_idle_ttl_secs: u64,
    /// Seconds a computed alternates map is reused
    pub alternates_cache_ttl_secs: u64,
    /// Milliseconds before a contended manual result is retried
    pub requeue_delay_ms: u64,
    pub max_requeue_attempts: u32,
}

impl Default for FileLifecycleConfig {
    fn default() -> Self {
        let defaults = LifecycleParams::default();
        Self {
            guard_idle_ttl_secs: defaults.guard_idle_ttl.as_secs(),
            alternates_cache_ttl_secs: defaults.alternates_cache_ttl.as_secs(),
            requeue_delay_ms: defaults.requeue_delay.as_millis() as u64,
            max_requeue_attempts: defaults.max_requeue_attempts,
        }
    }
}

/// Raw `[report]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReportConfig {
    /// JSONL file failure reports are appended to
    pub path: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Vote settings
    pub vote: FileVoteConfig,
    /// Orchestrator timing
    pub lifecycle: FileLifecycleConfig,
    /// Failure reporting
    pub report: FileReportConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let lifecycle = &self.lifecycle;
        if lifecycle.guard_idle_ttl_secs == 0 {
            return Err(ConfigValidationError::ZeroDuration("guard_idle_ttl_secs"));
        }
        if lifecycle.alternates_cache_ttl_secs == 0 {
            return Err(ConfigValidationError::ZeroDuration(
                "alternates_cache_ttl_secs",
            ));
        }
        if lifecycle.requeue_delay_ms == 0 {
            return Err(ConfigValidationError::ZeroDuration("requeue_delay_ms"));
        }

        let labels = &self.vote.labels;
        for (name, value) in [
            ("open", &labels.open),
            ("quorum", &labels.quorum),
            ("done", &labels.done),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyLabel(name));
            }
        }
        if labels.open == labels.quorum || labels.open == labels.done {
            return Err(ConfigValidationError::DuplicateLabel(labels.open.clone()));
        }
        if labels.quorum == labels.done {
            return Err(ConfigValidationError::DuplicateLabel(labels.quorum.clone()));
        }

        for mapping in &self.vote.alternates {
            for (field, value) in [
                ("source_repo", &mapping.source_repo),
                ("path", &mapping.path),
                ("field", &mapping.field),
                ("primary_team", &mapping.primary_team),
                ("secondary_team", &mapping.secondary_team),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigValidationError::IncompleteAlternates {
                        group: mapping.group.clone(),
                        field,
                    });
                }
            }
        }

        Ok(())
    }

    /// Vote configuration for one repository
    pub fn repository_config(&self, repository: impl Into<String>) -> RepositoryConfig {
        let vote = self.vote.clone();
        RepositoryConfig {
            repository: repository.into(),
            threshold: vote.threshold,
            labels: vote.labels,
            bot_login: vote.bot_login,
            managers: vote.managers,
            excluded_logins: vote.excluded_logins,
            manual_result_marker: vote.manual_result_marker,
            alternates: vote.alternates,
        }
    }

    pub fn lifecycle_params(&self) -> LifecycleParams {
        let lifecycle = &self.lifecycle;
        LifecycleParams::default()
            .with_guard_idle_ttl(Duration::from_secs(lifecycle.guard_idle_ttl_secs))
            .with_alternates_cache_ttl(Duration::from_secs(lifecycle.alternates_cache_ttl_secs))
            .with_requeue_delay(Duration::from_millis(lifecycle.requeue_delay_ms))
            .with_max_requeue_attempts(lifecycle.max_requeue_attempts)
    }
}
