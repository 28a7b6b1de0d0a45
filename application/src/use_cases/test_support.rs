//! In-memory platform used by use case tests

use crate::ports::error_reporter::ErrorReporter;
use crate::ports::platform::{
    CommentRef, MembershipProvider, PlatformError, PlatformMutation, PlatformQuery,
    SourceFileProvider,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use govbot_domain::vote::status_link;
use govbot_domain::{
    CommentSignal, Identity, ItemKind, ReactionKind, ReactionSignal, Review, VoteItem,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub const BOT: &str = "govbot[bot]";

pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
}

pub fn item(number: u64, body: &str, labels: &[&str]) -> VoteItem {
    VoteItem {
        id: format!("org/repo#{}", number),
        repository: "org/repo".to_string(),
        number,
        url: format!("https://github.com/org/repo/issues/{}", number),
        title: format!("Proposal {}", number),
        body: body.to_string(),
        is_open: true,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        kind: ItemKind::Issue,
    }
}

pub fn comment(login: &str, minute: u32, body: &str, id: u64) -> CommentSignal {
    CommentSignal {
        actor: Identity::from_login(login),
        created_at: at(minute),
        body: body.to_string(),
        url: format!("https://github.com/org/repo/issues/1#issuecomment-{}", id),
    }
}

#[derive(Default)]
struct State {
    teams: HashMap<String, Vec<Identity>>,
    files: HashMap<(String, String), serde_json::Value>,
    file_reads: usize,
    reactions: Vec<ReactionSignal>,
    comments: Vec<CommentSignal>,
    reviews: Vec<Review>,
    repo_labels: Vec<String>,
    items: Vec<VoteItem>,
    bot_comment: Option<CommentRef>,
    body: Option<String>,
    labels: Vec<String>,
    calls: Vec<String>,
    failing: HashSet<&'static str>,
}

/// Platform double implementing every platform port
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<State>,
    upsert_delay: Option<Duration>,
}

impl FakePlatform {
    pub fn new() -> Self {
        let platform = Self::default();
        platform.state.lock().unwrap().repo_labels = vec![
            "vote/open".to_string(),
            "vote/quorum".to_string(),
            "vote/done".to_string(),
        ];
        platform
    }

    pub fn with_upsert_delay(mut self, delay: Duration) -> Self {
        self.upsert_delay = Some(delay);
        self
    }

    pub fn set_team(&self, handle: &str, logins: &[&str]) {
        self.state.lock().unwrap().teams.insert(
            handle.to_string(),
            logins.iter().map(|l| Identity::from_login(*l)).collect(),
        );
    }

    pub fn set_file(&self, repo: &str, path: &str, data: serde_json::Value) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert((repo.to_string(), path.to_string()), data);
    }

    pub fn set_repo_labels(&self, labels: &[&str]) {
        self.state.lock().unwrap().repo_labels = labels.iter().map(|l| l.to_string()).collect();
    }

    pub fn add_reaction(&self, login: &str, kind: ReactionKind, minute: u32) {
        self.state.lock().unwrap().reactions.push(ReactionSignal {
            actor: Identity::from_login(login),
            kind,
            created_at: at(minute),
        });
    }

    pub fn add_comment(&self, comment: CommentSignal) {
        self.state.lock().unwrap().comments.push(comment);
    }

    pub fn add_review(&self, review: Review) {
        self.state.lock().unwrap().reviews.push(review);
    }

    pub fn add_item(&self, item: VoteItem) {
        self.state.lock().unwrap().items.push(item);
    }

    /// Make the named operation fail with `RequestFailed`
    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn file_reads(&self) -> usize {
        self.state.lock().unwrap().file_reads
    }

    pub fn bot_comment(&self) -> Option<CommentRef> {
        self.state.lock().unwrap().bot_comment.clone()
    }

    pub fn body(&self) -> Option<String> {
        self.state.lock().unwrap().body.clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.state.lock().unwrap().labels.clone()
    }

    fn record(&self, call: String, operation: &'static str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(PlatformError::RequestFailed(format!("{} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformQuery for FakePlatform {
    async fn list_reactions(&self, _item: &VoteItem) -> Result<Vec<ReactionSignal>, PlatformError> {
        self.record("list_reactions".to_string(), "list_reactions")?;
        Ok(self.state.lock().unwrap().reactions.clone())
    }

    async fn list_comments(&self, _item: &VoteItem) -> Result<Vec<CommentSignal>, PlatformError> {
        self.record("list_comments".to_string(), "list_comments")?;
        Ok(self.state.lock().unwrap().comments.clone())
    }

    async fn find_existing_bot_comment(
        &self,
        _item: &VoteItem,
        body_text: &str,
    ) -> Result<Option<CommentRef>, PlatformError> {
        let state = self.state.lock().unwrap();
        let link = status_link(body_text);
        Ok(state
            .bot_comment
            .clone()
            .filter(|c| link == Some(c.url.as_str())))
    }

    async fn repository_labels(&self, _repository: &str) -> Result<Vec<String>, PlatformError> {
        self.record("repository_labels".to_string(), "repository_labels")?;
        Ok(self.state.lock().unwrap().repo_labels.clone())
    }

    async fn get_item(&self, _repository: &str, number: u64) -> Result<VoteItem, PlatformError> {
        self.state
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|i| i.number == number)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("#{}", number)))
    }

    async fn list_open_items(
        &self,
        _repository: &str,
        label: &str,
    ) -> Result<Vec<VoteItem>, PlatformError> {
        self.record("list_open_items".to_string(), "list_open_items")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .items
            .iter()
            .filter(|i| i.is_open && i.has_label(label))
            .cloned()
            .collect())
    }

    async fn get_comment(
        &self,
        _item: &VoteItem,
        comment_id: &str,
    ) -> Result<Option<CommentSignal>, PlatformError> {
        let suffix = format!("#issuecomment-{}", comment_id);
        Ok(self
            .state
            .lock()
            .unwrap()
            .comments
            .iter()
            .find(|c| c.url.ends_with(&suffix))
            .cloned())
    }
}

#[async_trait]
impl PlatformMutation for FakePlatform {
    async fn upsert_comment(
        &self,
        item: &VoteItem,
        existing: Option<&CommentRef>,
        body: &str,
    ) -> Result<CommentRef, PlatformError> {
        if let Some(delay) = self.upsert_delay {
            tokio::time::sleep(delay).await;
        }
        let call = if existing.is_some() {
            "update_comment"
        } else {
            "create_comment"
        };
        self.record(call.to_string(), "upsert_comment")?;
        let mut state = self.state.lock().unwrap();
        let comment = CommentRef {
            id: existing.map(|c| c.id.clone()).unwrap_or_else(|| "100".to_string()),
            url: existing
                .map(|c| c.url.clone())
                .unwrap_or_else(|| format!("{}#issuecomment-100", item.url)),
            body: body.to_string(),
        };
        state.bot_comment = Some(comment.clone());
        Ok(comment)
    }

    async fn set_item_body(&self, _item: &VoteItem, body: &str) -> Result<(), PlatformError> {
        self.record("set_item_body".to_string(), "set_item_body")?;
        self.state.lock().unwrap().body = Some(body.to_string());
        Ok(())
    }

    async fn add_label(&self, _item: &VoteItem, name: &str) -> Result<(), PlatformError> {
        self.record(format!("add_label:{}", name), "add_label")?;
        self.state.lock().unwrap().labels.push(name.to_string());
        Ok(())
    }

    async fn remove_labels(&self, _item: &VoteItem, names: &[String]) -> Result<(), PlatformError> {
        self.record(format!("remove_labels:{}", names.join(",")), "remove_labels")?;
        self.state.lock().unwrap().labels.retain(|l| !names.contains(l));
        Ok(())
    }

    async fn add_bot_reaction(
        &self,
        _item: &VoteItem,
        kind: ReactionKind,
    ) -> Result<(), PlatformError> {
        self.record(format!("add_reaction:{}", kind.as_str()), "add_bot_reaction")?;
        let mut state = self.state.lock().unwrap();
        if !state
            .reactions
            .iter()
            .any(|r| r.actor.login == BOT && r.kind == kind)
        {
            state.reactions.push(ReactionSignal {
                actor: Identity::from_login(BOT),
                kind,
                created_at: at(59),
            });
        }
        Ok(())
    }

    async fn remove_bot_reaction(
        &self,
        _item: &VoteItem,
        kind: ReactionKind,
    ) -> Result<(), PlatformError> {
        self.record(format!("remove_reaction:{}", kind.as_str()), "remove_bot_reaction")?;
        self.state
            .lock()
            .unwrap()
            .reactions
            .retain(|r| !(r.actor.login == BOT && r.kind == kind));
        Ok(())
    }
}

#[async_trait]
impl MembershipProvider for FakePlatform {
    async fn list_team_members(&self, handle: &str) -> Result<Vec<Identity>, PlatformError> {
        self.record(format!("list_team_members:{}", handle), "list_team_members")?;
        self.state
            .lock()
            .unwrap()
            .teams
            .get(handle)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(handle.to_string()))
    }

    async fn list_pull_request_reviews(
        &self,
        _item: &VoteItem,
    ) -> Result<Vec<Review>, PlatformError> {
        self.record("list_reviews".to_string(), "list_reviews")?;
        Ok(self.state.lock().unwrap().reviews.clone())
    }
}

#[async_trait]
impl SourceFileProvider for FakePlatform {
    async fn read_structured_file(
        &self,
        repository: &str,
        path: &str,
    ) -> Result<Option<serde_json::Value>, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.file_reads += 1;
        Ok(state
            .files
            .get(&(repository.to_string(), path.to_string()))
            .cloned())
    }
}

/// Error reporter that keeps every report
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, subject: &str, body: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
    }
}
