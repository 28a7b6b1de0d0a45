//! Per-repository vote configuration.
//!
//! [`RepositoryConfig`] is what the lifecycle use case needs to know about the
//! repository an item lives in: label names, the default threshold, who may
//! record manual results, who never counts, and where alternates come from.

use govbot_domain::ThresholdTier;
use serde::{Deserialize, Serialize};

/// Names of the labels that drive the vote lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteLabels {
    /// Present while the vote is running
    pub open: String,
    /// Added once quorum is reached
    pub quorum: String,
    /// Added once a result has been recorded
    pub done: String,
}

impl Default for VoteLabels {
    fn default() -> Self {
        Self {
            open: "vote/open".to_string(),
            quorum: "vote/quorum".to_string(),
            done: "vote/done".to_string(),
        }
    }
}

impl VoteLabels {
    /// All labels the repository must define
    pub fn required(&self) -> [&str; 3] {
        [&self.open, &self.quorum, &self.done]
    }
}

/// Where to find delegates for one voting group.
///
/// The file at `source_repo`/`path` lists team rosters; members of
/// `primary_team` and `secondary_team` sharing the same `field` value are
/// paired as primary and delegate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlternateMapping {
    /// Voting group the alternates apply to
    pub group: String,
    pub source_repo: String,
    pub path: String,
    /// Entry field linking a primary to a delegate (e.g. `project`)
    pub field: String,
    pub primary_team: String,
    pub secondary_team: String,
}

/// Vote configuration for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository (`owner/name`)
    pub repository: String,
    /// Threshold applied when the item does not override it
    pub threshold: ThresholdTier,
    pub labels: VoteLabels,
    /// Login the bot posts as
    pub bot_login: String,
    /// Logins allowed to record a manual result
    pub managers: Vec<String>,
    /// Logins never counted as group members
    pub excluded_logins: Vec<String>,
    /// Text marking a comment as a manual result
    pub manual_result_marker: String,
    pub alternates: Vec<AlternateMapping>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            repository: String::new(),
            threshold: ThresholdTier::default(),
            labels: VoteLabels::default(),
            bot_login: "govbot[bot]".to_string(),
            managers: Vec::new(),
            excluded_logins: Vec::new(),
            manual_result_marker: "vote::result".to_string(),
            alternates: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: ThresholdTier) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_managers(mut self, managers: Vec<String>) -> Self {
        self.managers = managers;
        self
    }

    pub fn with_alternates(mut self, alternates: Vec<AlternateMapping>) -> Self {
        self.alternates = alternates;
        self
    }

    /// Whether `login` is the bot itself
    pub fn is_bot(&self, login: &str) -> bool {
        login.eq_ignore_ascii_case(&self.bot_login)
    }

    /// Whether `login` may record a manual result
    pub fn is_manager(&self, login: &str) -> bool {
        self.managers.iter().any(|m| m.eq_ignore_ascii_case(login))
    }

    /// Alternate mappings that apply to a voting group
    pub fn alternates_for(&self, group: &str) -> Vec<&AlternateMapping> {
        self.alternates
            .iter()
            .filter(|m| m.group.eq_ignore_ascii_case(group))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = RepositoryConfig::default();
        assert_eq!(config.threshold, ThresholdTier::Majority);
        assert_eq!(config.labels.required(), ["vote/open", "vote/quorum", "vote/done"]);
        assert_eq!(config.manual_result_marker, "vote::result");
    }

    #[test]
    fn test_managers_and_bot_are_case_insensitive() {
        let config = RepositoryConfig::new("org/repo").with_managers(vec!["Chair".to_string()]);
        assert!(config.is_manager("chair"));
        assert!(!config.is_manager("member"));
        assert!(config.is_bot("GovBot[bot]"));
    }

    #[test]
    fn test_alternates_for_group() {
        let mapping = AlternateMapping {
            group: "org/council".to_string(),
            source_repo: "org/.github".to_string(),
            path: "reps.toml".to_string(),
            field: "project".to_string(),
            primary_team: "org/council".to_string(),
            secondary_team: "org/alternates".to_string(),
        };
        let config = RepositoryConfig::new("org/repo").with_alternates(vec![mapping]);
        assert_eq!(config.alternates_for("org/Council").len(), 1);
        assert!(config.alternates_for("org/other").is_empty());
    }
}
