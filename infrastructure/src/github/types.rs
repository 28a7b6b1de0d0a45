//! REST API response shapes and their conversion to domain types.

use chrono::{DateTime, Utc};
use govbot_application::{CommentRef, PlatformError};
use govbot_domain::{
    CommentSignal, Identity, ItemKind, ReactionKind, ReactionSignal, Review, ReviewState,
    VoteItem,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    pub login: String,
    pub html_url: String,
}

impl From<ApiUser> for Identity {
    fn from(user: ApiUser) -> Self {
        Identity::new(user.login, user.html_url)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl ApiIssue {
    pub fn into_item(self, repository: &str) -> VoteItem {
        VoteItem {
            id: item_id(repository, self.number),
            repository: repository.to_string(),
            number: self.number,
            url: self.html_url,
            title: self.title,
            body: self.body.unwrap_or_default(),
            is_open: self.state == "open",
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            kind: if self.pull_request.is_some() {
                ItemKind::PullRequest
            } else {
                ItemKind::Issue
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiReaction {
    pub id: u64,
    pub content: ReactionKind,
    pub user: Option<ApiUser>,
    pub created_at: DateTime<Utc>,
}

impl ApiReaction {
    /// `None` for reactions of deleted accounts
    pub fn into_signal(self) -> Option<ReactionSignal> {
        Some(ReactionSignal {
            actor: self.user?.into(),
            kind: self.content,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    pub user: Option<ApiUser>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

impl ApiComment {
    pub fn into_ref(self) -> CommentRef {
        CommentRef {
            id: self.id.to_string(),
            url: self.html_url,
            body: self.body.unwrap_or_default(),
        }
    }

    /// `None` for comments of deleted accounts
    pub fn into_signal(self) -> Option<CommentSignal> {
        Some(CommentSignal {
            actor: self.user?.into(),
            created_at: self.created_at,
            body: self.body.unwrap_or_default(),
            url: self.html_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiReview {
    pub user: Option<ApiUser>,
    pub state: ReviewState,
    /// Absent while the review is pending
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
}

impl ApiReview {
    pub fn into_review(self) -> Option<Review> {
        Some(Review {
            author: self.user?.into(),
            state: self.state,
            submitted_at: self.submitted_at?,
            body: self.body.unwrap_or_default(),
            url: self.html_url,
        })
    }
}

pub(crate) fn item_id(repository: &str, number: u64) -> String {
    format!("{}#{}", repository, number)
}

/// Comment id from a `...#issuecomment-<id>` URL
pub(crate) fn comment_id_from_url(url: &str) -> Option<&str> {
    let (_, id) = url.rsplit_once("#issuecomment-")?;
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

/// Split `org/team` into its organization and team slug
pub(crate) fn split_team_handle(handle: &str) -> Result<(&str, &str), PlatformError> {
    let handle = handle.trim_start_matches('@');
    match handle.split_once('/') {
        Some((org, team)) if !org.is_empty() && !team.is_empty() && !team.contains('/') => {
            Ok((org, team))
        }
        _ => Err(PlatformError::NotFound(format!(
            "`{}` is not an org/team handle",
            handle
        ))),
    }
}

/// Percent-encode a query value, keeping `/` readable
pub(crate) fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Parse a structured source file by extension: `.json` as JSON, anything else as TOML
pub(crate) fn parse_structured(path: &str, text: &str) -> Result<serde_json::Value, PlatformError> {
    if path.to_ascii_lowercase().ends_with(".json") {
        serde_json::from_str(text)
            .map_err(|e| PlatformError::InvalidResponse(format!("{} is not valid JSON: {}", path, e)))
    } else {
        let value: toml::Value = toml::from_str(text).map_err(|e| {
            PlatformError::InvalidResponse(format!("{} is not valid TOML: {}", path, e))
        })?;
        serde_json::to_value(value)
            .map_err(|e| PlatformError::InvalidResponse(format!("{}: {}", path, e)))
    }
}
