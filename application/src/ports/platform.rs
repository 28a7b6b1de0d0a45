//! Platform ports
//!
//! Defines how the application layer reads from and writes to the
//! collaboration platform hosting the voting items. Adapters live in the
//! infrastructure layer.

use async_trait::async_trait;
use govbot_domain::{CommentSignal, Identity, ReactionKind, ReactionSignal, Review, VoteItem};
use thiserror::Error;

/// Errors that can occur while talking to the platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Platform not available: {0}")]
    NotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A comment the bot maintains on an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRef {
    pub id: String,
    pub url: String,
    pub body: String,
}

/// Read access to items on the platform
#[async_trait]
pub trait PlatformQuery: Send + Sync {
    /// Reactions on the item body
    async fn list_reactions(&self, item: &VoteItem) -> Result<Vec<ReactionSignal>, PlatformError>;

    /// Comments on the item, oldest first
    async fn list_comments(&self, item: &VoteItem) -> Result<Vec<CommentSignal>, PlatformError>;

    /// The bot's status comment referenced by `body_text`, if it still exists
    async fn find_existing_bot_comment(
        &self,
        item: &VoteItem,
        body_text: &str,
    ) -> Result<Option<CommentRef>, PlatformError>;

    /// Label names defined in a repository
    async fn repository_labels(&self, repository: &str) -> Result<Vec<String>, PlatformError>;

    /// A single item by number
    async fn get_item(&self, repository: &str, number: u64) -> Result<VoteItem, PlatformError>;

    /// Open items in `repository` carrying `label`
    async fn list_open_items(
        &self,
        repository: &str,
        label: &str,
    ) -> Result<Vec<VoteItem>, PlatformError>;

    /// A single comment on an item, by id
    async fn get_comment(
        &self,
        item: &VoteItem,
        comment_id: &str,
    ) -> Result<Option<CommentSignal>, PlatformError>;
}

/// Write access to items on the platform
#[async_trait]
pub trait PlatformMutation: Send + Sync {
    /// Create a comment, or update `existing` in place
    async fn upsert_comment(
        &self,
        item: &VoteItem,
        existing: Option<&CommentRef>,
        body: &str,
    ) -> Result<CommentRef, PlatformError>;

    async fn set_item_body(&self, item: &VoteItem, body: &str) -> Result<(), PlatformError>;

    /// Add a label; adding a label already present is a no-op
    async fn add_label(&self, item: &VoteItem, name: &str) -> Result<(), PlatformError>;

    async fn remove_labels(&self, item: &VoteItem, names: &[String]) -> Result<(), PlatformError>;

    async fn add_bot_reaction(
        &self,
        item: &VoteItem,
        kind: ReactionKind,
    ) -> Result<(), PlatformError>;

    async fn remove_bot_reaction(
        &self,
        item: &VoteItem,
        kind: ReactionKind,
    ) -> Result<(), PlatformError>;
}

/// Team rosters and pull-request reviews
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// Members of a team handle (`org/team`)
    async fn list_team_members(&self, handle: &str) -> Result<Vec<Identity>, PlatformError>;

    async fn list_pull_request_reviews(&self, item: &VoteItem)
    -> Result<Vec<Review>, PlatformError>;
}

/// Structured files stored in repositories
#[async_trait]
pub trait SourceFileProvider: Send + Sync {
    /// Parsed contents of `path` in `repository`, or `None` if it does not exist
    async fn read_structured_file(
        &self,
        repository: &str,
        path: &str,
    ) -> Result<Option<serde_json::Value>, PlatformError>;
}
