//! Scan use case
//!
//! Re-evaluates every open vote in a repository. Used as a periodic sweep
//! that catches up on events the bot missed.

use crate::config::RepositoryConfig;
use crate::ports::platform::{PlatformError, PlatformQuery};
use crate::ports::progress::{NoProgress, ScanProgressNotifier};
use crate::use_cases::run_vote::{TriggerKind, VoteLifecycleUseCase, VoteOutcome};
use govbot_domain::VoteItem;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Input for a repository scan
#[derive(Debug, Clone)]
pub struct ScanVotesInput {
    pub config: RepositoryConfig,
    /// Evaluations running at the same time
    pub concurrency: usize,
}

impl ScanVotesInput {
    pub fn new(config: RepositoryConfig) -> Self {
        Self {
            config,
            concurrency: 4,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Use case for sweeping all open votes of a repository
pub struct ScanVotesUseCase {
    query: Arc<dyn PlatformQuery>,
    lifecycle: VoteLifecycleUseCase,
}

impl ScanVotesUseCase {
    pub fn new(query: Arc<dyn PlatformQuery>, lifecycle: VoteLifecycleUseCase) -> Self {
        Self { query, lifecycle }
    }

    pub async fn execute(
        &self,
        input: ScanVotesInput,
    ) -> Result<Vec<(VoteItem, VoteOutcome)>, PlatformError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Evaluate every open vote, reporting each as it completes
    ///
    /// Results are returned in item number order.
    pub async fn execute_with_progress(
        &self,
        input: ScanVotesInput,
        progress: &dyn ScanProgressNotifier,
    ) -> Result<Vec<(VoteItem, VoteOutcome)>, PlatformError> {
        let config = Arc::new(input.config);
        let items = self
            .query
            .list_open_items(&config.repository, &config.labels.open)
            .await?;
        info!("Scanning {} open votes in {}", items.len(), config.repository);
        progress.on_scan_start(items.len());

        let permits = Arc::new(Semaphore::new(input.concurrency.max(1)));
        let mut join_set = JoinSet::new();
        for item in items {
            let lifecycle = self.lifecycle.clone();
            let config = Arc::clone(&config);
            let permits = Arc::clone(&permits);
            join_set.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let outcome = lifecycle
                    .handle_vote_event(TriggerKind::Scan, &item, &config)
                    .await;
                (item, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((item, outcome)) => {
                    progress.on_item_complete(&item, outcome.status(), !outcome.is_failure());
                    results.push((item, outcome));
                }
                Err(e) => warn!("Scan task join error: {}", e),
            }
        }

        progress.on_scan_complete();
        results.sort_by_key(|(item, _)| item.number);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LifecycleParams;
    use crate::use_cases::test_support::{FakePlatform, item};
    use govbot_domain::ReactionKind;
    use std::sync::Mutex;

    const BODY: &str = "voting group: @org/council\n<!--vote::manual -->";

    #[derive(Default)]
    struct CountingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ScanProgressNotifier for CountingProgress {
        fn on_scan_start(&self, total_items: usize) {
            self.events.lock().unwrap().push(format!("start:{}", total_items));
        }

        fn on_item_complete(&self, item: &VoteItem, status: &str, success: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("#{}:{}:{}", item.number, status, success));
        }

        fn on_scan_complete(&self) {
            self.events.lock().unwrap().push("complete".to_string());
        }
    }

    fn scan(platform: &Arc<FakePlatform>) -> ScanVotesUseCase {
        let lifecycle = VoteLifecycleUseCase::new(
            platform.clone(),
            platform.clone(),
            platform.clone(),
            platform.clone(),
            LifecycleParams::default(),
        );
        ScanVotesUseCase::new(platform.clone(), lifecycle)
    }

    #[tokio::test]
    async fn test_scan_evaluates_open_votes_only() {
        let platform = FakePlatform::new();
        platform.set_team("org/council", &["a", "b", "c"]);
        platform.add_item(item(3, BODY, &["vote/open"]));
        platform.add_item(item(1, BODY, &["vote/open"]));
        platform.add_item(item(2, BODY, &["other"]));
        let mut closed = item(4, BODY, &["vote/open"]);
        closed.is_open = false;
        platform.add_item(closed);
        platform.add_reaction("a", ReactionKind::Heart, 1);
        let platform = Arc::new(platform);

        let progress = CountingProgress::default();
        let results = scan(&platform)
            .execute_with_progress(
                ScanVotesInput::new(RepositoryConfig::new("org/repo")).with_concurrency(2),
                &progress,
            )
            .await
            .unwrap();

        let numbers: Vec<_> = results.iter().map(|(i, _)| i.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert!(results.iter().all(|(_, o)| o.status() == "pending"));

        let events = progress.events.lock().unwrap().clone();
        assert_eq!(events.first().unwrap(), "start:2");
        assert_eq!(events.last().unwrap(), "complete");
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn test_scan_listing_failure() {
        let platform = Arc::new(FakePlatform::new());
        platform.fail("list_open_items");
        let result = scan(&platform)
            .execute(ScanVotesInput::new(RepositoryConfig::new("org/repo")))
            .await;
        assert!(result.is_err());
    }
}
