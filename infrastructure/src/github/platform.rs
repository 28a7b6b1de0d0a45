//! Platform ports backed by the GitHub CLI.
//!
//! Reads go through `gh api`; label and body edits go through
//! `gh issue edit` / `gh pr edit`. Discussions are not reachable through
//! these endpoints and are reported as unsupported.

use super::cli::GhCli;
use super::types::{
    ApiComment, ApiIssue, ApiLabel, ApiReaction, ApiReview, ApiUser, comment_id_from_url,
    encode_query, parse_structured, split_team_handle,
};
use async_trait::async_trait;
use govbot_application::{
    CommentRef, MembershipProvider, PlatformError, PlatformMutation, PlatformQuery,
    SourceFileProvider,
};
use govbot_domain::vote::status_link;
use govbot_domain::{
    CommentSignal, Identity, ItemKind, ReactionKind, ReactionSignal, Review, VoteItem,
};
use serde_json::json;
use tracing::{debug, info};

/// GitHub adapter for every platform port
pub struct GhCliPlatform {
    gh: GhCli,
    bot_login: String,
}

impl GhCliPlatform {
    pub fn new(gh: GhCli, bot_login: impl Into<String>) -> Self {
        Self {
            gh,
            bot_login: bot_login.into(),
        }
    }

    /// Locate `gh` and check it is authenticated
    pub async fn try_new(bot_login: impl Into<String>) -> Result<Self, PlatformError> {
        let gh = GhCli::locate()?;
        if !gh.is_authenticated().await {
            return Err(PlatformError::NotAvailable(
                "gh CLI is not authenticated, run `gh auth login`".to_string(),
            ));
        }
        info!("GitHub platform initialized");
        Ok(Self::new(gh, bot_login))
    }

    /// `issues/{n}` endpoint prefix of an item
    fn issue_endpoint(item: &VoteItem) -> Result<String, PlatformError> {
        match item.kind {
            ItemKind::Issue | ItemKind::PullRequest => Ok(format!(
                "repos/{}/issues/{}",
                item.repository, item.number
            )),
            ItemKind::Discussion => Err(unsupported(item)),
        }
    }

    /// `gh issue|pr edit <n> --repo <repo> ...`
    async fn edit(
        &self,
        item: &VoteItem,
        args: &[&str],
        stdin: Option<&str>,
    ) -> Result<(), PlatformError> {
        let subcommand = match item.kind {
            ItemKind::Issue => "issue",
            ItemKind::PullRequest => "pr",
            ItemKind::Discussion => return Err(unsupported(item)),
        };
        let number = item.number.to_string();
        let mut full = vec![
            subcommand,
            "edit",
            number.as_str(),
            "--repo",
            item.repository.as_str(),
        ];
        full.extend_from_slice(args);
        self.gh.run(&full, stdin).await.map(|_| ())
    }

    async fn get_comment_by_id(
        &self,
        repository: &str,
        comment_id: &str,
    ) -> Result<Option<ApiComment>, PlatformError> {
        let endpoint = format!("repos/{}/issues/comments/{}", repository, comment_id);
        match self.gh.api::<ApiComment>(&endpoint).await {
            Ok(comment) => Ok(Some(comment)),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn unsupported(item: &VoteItem) -> PlatformError {
    PlatformError::Unsupported(format!("{} items ({})", item.kind, item.id))
}

#[async_trait]
impl PlatformQuery for GhCliPlatform {
    async fn list_reactions(&self, item: &VoteItem) -> Result<Vec<ReactionSignal>, PlatformError> {
        let endpoint = format!("{}/reactions", Self::issue_endpoint(item)?);
        let reactions: Vec<ApiReaction> = self.gh.api_paginated(&endpoint).await?;
        Ok(reactions
            .into_iter()
            .filter_map(ApiReaction::into_signal)
            .collect())
    }

    async fn list_comments(&self, item: &VoteItem) -> Result<Vec<CommentSignal>, PlatformError> {
        let endpoint = format!("{}/comments", Self::issue_endpoint(item)?);
        let comments: Vec<ApiComment> = self.gh.api_paginated(&endpoint).await?;
        Ok(comments
            .into_iter()
            .filter_map(ApiComment::into_signal)
            .collect())
    }

    async fn find_existing_bot_comment(
        &self,
        item: &VoteItem,
        body_text: &str,
    ) -> Result<Option<CommentRef>, PlatformError> {
        let Some(id) = status_link(body_text).and_then(comment_id_from_url) else {
            return Ok(None);
        };
        let comment = self.get_comment_by_id(&item.repository, id).await?;
        Ok(comment
            .filter(|c| {
                c.user
                    .as_ref()
                    .is_some_and(|u| u.login.eq_ignore_ascii_case(&self.bot_login))
            })
            .map(ApiComment::into_ref))
    }

    async fn repository_labels(&self, repository: &str) -> Result<Vec<String>, PlatformError> {
        let labels: Vec<ApiLabel> = self
            .gh
            .api_paginated(&format!("repos/{}/labels", repository))
            .await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn get_item(&self, repository: &str, number: u64) -> Result<VoteItem, PlatformError> {
        let issue: ApiIssue = self
            .gh
            .api(&format!("repos/{}/issues/{}", repository, number))
            .await?;
        Ok(issue.into_item(repository))
    }

    async fn list_open_items(
        &self,
        repository: &str,
        label: &str,
    ) -> Result<Vec<VoteItem>, PlatformError> {
        let endpoint = format!(
            "repos/{}/issues?state=open&labels={}&per_page=100",
            repository,
            encode_query(label)
        );
        let issues: Vec<ApiIssue> = self.gh.api_paginated(&endpoint).await?;
        debug!("{} open items labeled {} in {}", issues.len(), label, repository);
        Ok(issues
            .into_iter()
            .map(|issue| issue.into_item(repository))
            .collect())
    }

    async fn get_comment(
        &self,
        item: &VoteItem,
        comment_id: &str,
    ) -> Result<Option<CommentSignal>, PlatformError> {
        Ok(self
            .get_comment_by_id(&item.repository, comment_id)
            .await?
            .and_then(ApiComment::into_signal))
    }
}

#[async_trait]
impl PlatformMutation for GhCliPlatform {
    async fn upsert_comment(
        &self,
        item: &VoteItem,
        existing: Option<&CommentRef>,
        body: &str,
    ) -> Result<CommentRef, PlatformError> {
        let payload = json!({ "body": body });
        let comment: ApiComment = match existing {
            Some(existing) => {
                let endpoint =
                    format!("repos/{}/issues/comments/{}", item.repository, existing.id);
                self.gh.api_send("PATCH", &endpoint, &payload).await?
            }
            None => {
                let endpoint = format!("{}/comments", Self::issue_endpoint(item)?);
                self.gh.api_send("POST", &endpoint, &payload).await?
            }
        };
        Ok(comment.into_ref())
    }

    async fn set_item_body(&self, item: &VoteItem, body: &str) -> Result<(), PlatformError> {
        self.edit(item, &["--body-file", "-"], Some(body)).await
    }

    async fn add_label(&self, item: &VoteItem, name: &str) -> Result<(), PlatformError> {
        self.edit(item, &["--add-label", name], None).await
    }

    async fn remove_labels(&self, item: &VoteItem, names: &[String]) -> Result<(), PlatformError> {
        if names.is_empty() {
            return Ok(());
        }
        let joined = names.join(",");
        self.edit(item, &["--remove-label", &joined], None).await
    }

    async fn add_bot_reaction(
        &self,
        item: &VoteItem,
        kind: ReactionKind,
    ) -> Result<(), PlatformError> {
        let endpoint = format!("{}/reactions", Self::issue_endpoint(item)?);
        let _: serde_json::Value = self
            .gh
            .api_send("POST", &endpoint, &json!({ "content": kind.as_str() }))
            .await?;
        Ok(())
    }

    async fn remove_bot_reaction(
        &self,
        item: &VoteItem,
        kind: ReactionKind,
    ) -> Result<(), PlatformError> {
        let base = Self::issue_endpoint(item)?;
        let endpoint = format!("{}/reactions?content={}", base, encode_query(kind.as_str()));
        let reactions: Vec<ApiReaction> = self.gh.api_paginated(&endpoint).await?;
        let own = reactions.iter().filter(|r| {
            r.content == kind
                && r.user
                    .as_ref()
                    .is_some_and(|u| u.login.eq_ignore_ascii_case(&self.bot_login))
        });
        for reaction in own {
            match self
                .gh
                .api_delete(&format!("{}/reactions/{}", base, reaction.id))
                .await
            {
                Ok(()) | Err(PlatformError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipProvider for GhCliPlatform {
    async fn list_team_members(&self, handle: &str) -> Result<Vec<Identity>, PlatformError> {
        let (org, team) = split_team_handle(handle)?;
        let members: Vec<ApiUser> = self
            .gh
            .api_paginated(&format!("orgs/{}/teams/{}/members", org, team))
            .await?;
        Ok(members.into_iter().map(Identity::from).collect())
    }

    async fn list_pull_request_reviews(
        &self,
        item: &VoteItem,
    ) -> Result<Vec<Review>, PlatformError> {
        if item.kind != ItemKind::PullRequest {
            return Ok(Vec::new());
        }
        let reviews: Vec<ApiReview> = self
            .gh
            .api_paginated(&format!(
                "repos/{}/pulls/{}/reviews",
                item.repository, item.number
            ))
            .await?;
        Ok(reviews
            .into_iter()
            .filter_map(ApiReview::into_review)
            .collect())
    }
}

#[async_trait]
impl SourceFileProvider for GhCliPlatform {
    async fn read_structured_file(
        &self,
        repository: &str,
        path: &str,
    ) -> Result<Option<serde_json::Value>, PlatformError> {
        let endpoint = format!(
            "repos/{}/contents/{}",
            repository,
            path.trim_start_matches('/')
        );
        match self.gh.api_raw(&endpoint).await {
            Ok(text) => parse_structured(path, &text).map(Some),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
