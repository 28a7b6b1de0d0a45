//! The item under vote

use serde::{Deserialize, Serialize};

/// Kind of platform item a vote is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Issue,
    PullRequest,
    Discussion,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::PullRequest => "pull_request",
            ItemKind::Discussion => "discussion",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An issue, pull request, or discussion carrying a vote
///
/// Owned by the platform; the engine only reads it and may ask for its
/// body to be replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteItem {
    /// Opaque platform id (e.g. `owner/repo#42`)
    pub id: String,
    /// Repository the item belongs to (`owner/name`)
    pub repository: String,
    /// Item number within the repository
    pub number: u64,
    pub url: String,
    pub title: String,
    pub body: String,
    pub is_open: bool,
    pub labels: Vec<String>,
    pub kind: ItemKind,
}

impl VoteItem {
    /// Whether the item carries the given label
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }

    pub fn is_pull_request(&self) -> bool {
        self.kind == ItemKind::PullRequest
    }
}
