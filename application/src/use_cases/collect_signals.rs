//! Signal collection
//!
//! Gathers everything a tally consumes from the platform and normalizes it:
//! reactions and comments on the item, and for pull requests the latest
//! review of each reviewer, translated into the directive's vocabulary.
//! The bot's own activity never becomes a signal.

use crate::config::RepositoryConfig;
use crate::ports::platform::{MembershipProvider, PlatformError, PlatformQuery};
use govbot_domain::{
    CommentSignal, CountingMode, Identity, ReactionKind, Review, ReviewState, Signal,
    VoteDirective, VoteItem,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Normalized inputs for one evaluation
#[derive(Debug, Clone, Default)]
pub struct CollectedSignals {
    /// Votes, in the shape the counting mode expects
    pub signals: Vec<Signal>,
    /// Comments recording a manual result
    pub manual_results: Vec<CommentSignal>,
    /// Whether the bot has flagged the item with a confused reaction
    pub bot_confused: bool,
}

/// Collects vote signals from the platform
#[derive(Clone)]
pub struct SignalCollector {
    query: Arc<dyn PlatformQuery>,
    members: Arc<dyn MembershipProvider>,
}

impl SignalCollector {
    pub fn new(query: Arc<dyn PlatformQuery>, members: Arc<dyn MembershipProvider>) -> Self {
        Self { query, members }
    }

    pub async fn collect(
        &self,
        item: &VoteItem,
        directive: &VoteDirective,
        config: &RepositoryConfig,
    ) -> Result<CollectedSignals, PlatformError> {
        let is_bot = |actor: &Identity| actor.is_bot() || config.is_bot(&actor.login);

        let (reactions, comments) = tokio::try_join!(
            self.query.list_reactions(item),
            self.query.list_comments(item)
        )?;
        let reviews = if item.is_pull_request() {
            self.members.list_pull_request_reviews(item).await?
        } else {
            Vec::new()
        };

        let bot_confused = reactions
            .iter()
            .any(|r| config.is_bot(&r.actor.login) && r.kind == ReactionKind::Confused);

        let comments: Vec<CommentSignal> = comments
            .into_iter()
            .filter(|c| !is_bot(&c.actor))
            .collect();
        let manual_results = manual_results(&comments, config);

        let reviews: Vec<Review> = reviews.into_iter().filter(|r| !is_bot(&r.author)).collect();
        let mut signals = translate_reviews(&reviews, directive);

        match directive.mode {
            CountingMode::WeightedReactions | CountingMode::ManualReactions => {
                signals.extend(
                    reactions
                        .into_iter()
                        .filter(|r| !is_bot(&r.actor))
                        .map(Signal::Reaction),
                );
            }
            CountingMode::ManualComments => {
                signals.extend(
                    comments
                        .into_iter()
                        .filter(|c| !is_manual_result(c, config))
                        .map(Signal::Comment),
                );
            }
            CountingMode::Undefined => signals.clear(),
        }

        debug!(
            "Collected {} signals and {} manual results for {}",
            signals.len(),
            manual_results.len(),
            item.id
        );

        Ok(CollectedSignals {
            signals,
            manual_results,
            bot_confused,
        })
    }
}

/// Whether `comment` records a manual result
pub fn is_manual_result(comment: &CommentSignal, config: &RepositoryConfig) -> bool {
    comment.body.contains(&config.manual_result_marker) && config.is_manager(&comment.actor.login)
}

/// Comments recording a manual result, authored by a manager
pub fn manual_results(comments: &[CommentSignal], config: &RepositoryConfig) -> Vec<CommentSignal> {
    comments
        .iter()
        .filter(|c| is_manual_result(c, config))
        .cloned()
        .collect()
}

/// The latest review of each reviewer, as vote signals
///
/// Pending reviews are not submitted yet and are ignored. A reviewer whose
/// latest review was dismissed contributes nothing. Under
/// [`CountingMode::ManualComments`] reviews become comments; otherwise they
/// become reactions.
pub fn translate_reviews(reviews: &[Review], directive: &VoteDirective) -> Vec<Signal> {
    let mut latest: HashMap<&str, &Review> = HashMap::new();
    for review in reviews.iter().filter(|r| r.state != ReviewState::Pending) {
        latest
            .entry(review.author.login.as_str())
            .and_modify(|current| {
                if review.submitted_at > current.submitted_at {
                    *current = review;
                }
            })
            .or_insert(review);
    }

    let mut reviews: Vec<&Review> = latest
        .into_values()
        .filter(|r| r.state != ReviewState::Dismissed)
        .collect();
    reviews.sort_by(|a, b| a.author.login.cmp(&b.author.login));

    reviews
        .into_iter()
        .filter_map(|review| {
            if directive.mode == CountingMode::ManualComments {
                return Some(Signal::comment(
                    review.author.clone(),
                    review.submitted_at,
                    review.body.clone(),
                    review.url.clone(),
                ));
            }
            let kind = review_reaction(review.state, directive)?;
            Some(Signal::reaction(
                review.author.clone(),
                kind,
                review.submitted_at,
            ))
        })
        .collect()
}

fn review_reaction(state: ReviewState, directive: &VoteDirective) -> Option<ReactionKind> {
    let weighted = directive.mode == CountingMode::WeightedReactions;
    let pick = |list: &[ReactionKind], default: ReactionKind| {
        if weighted {
            list.first().copied().unwrap_or(default)
        } else {
            default
        }
    };
    match state {
        ReviewState::Approved => Some(pick(&directive.approve, VoteDirective::DEFAULT_APPROVE)),
        ReviewState::Commented => Some(pick(&directive.ok, VoteDirective::DEFAULT_OK)),
        ReviewState::ChangesRequested => {
            Some(pick(&directive.revise, VoteDirective::DEFAULT_REVISE))
        }
        ReviewState::Dismissed | ReviewState::Pending => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{BOT, FakePlatform, at, comment, item};
    use govbot_domain::{ItemKind, ThresholdTier};

    fn review(login: &str, state: ReviewState, minute: u32) -> Review {
        Review {
            author: Identity::from_login(login),
            state,
            submitted_at: at(minute),
            body: format!("{:?}", state),
            url: format!("https://github.com/org/repo/pull/1#pullrequestreview-{}", minute),
        }
    }

    fn directive(body: &str, kind: ItemKind) -> VoteDirective {
        VoteDirective::parse(body, kind, ThresholdTier::Majority)
    }

    fn config() -> RepositoryConfig {
        RepositoryConfig::new("org/repo").with_managers(vec!["chair".to_string()])
    }

    #[test]
    fn test_latest_review_per_reviewer() {
        let reviews = vec![
            review("alice", ReviewState::ChangesRequested, 1),
            review("alice", ReviewState::Approved, 5),
            review("bob", ReviewState::Approved, 2),
            review("bob", ReviewState::Pending, 9),
        ];
        let signals = translate_reviews(&reviews, &directive("", ItemKind::PullRequest));
        assert_eq!(signals.len(), 2);
        for signal in &signals {
            match signal {
                Signal::Reaction(r) => assert_eq!(r.kind, ReactionKind::ThumbsUp),
                Signal::Comment(_) => panic!("expected reaction"),
            }
        }
    }

    #[test]
    fn test_dismissed_latest_review_is_ignored() {
        let reviews = vec![
            review("alice", ReviewState::Approved, 1),
            review("alice", ReviewState::Dismissed, 3),
        ];
        assert!(translate_reviews(&reviews, &directive("", ItemKind::PullRequest)).is_empty());
    }

    #[test]
    fn test_weighted_reviews_use_first_configured_reaction() {
        let directive = directive(
            "<!--vote::marthas approve=\"rocket,+1\" ok=\"eyes\" revise=\"confused\" -->",
            ItemKind::PullRequest,
        );
        let reviews = vec![
            review("alice", ReviewState::Approved, 1),
            review("bob", ReviewState::ChangesRequested, 1),
            review("carol", ReviewState::Commented, 1),
        ];
        let kinds: Vec<_> = translate_reviews(&reviews, &directive)
            .into_iter()
            .map(|s| match s {
                Signal::Reaction(r) => r.kind,
                Signal::Comment(_) => panic!("expected reaction"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![ReactionKind::Rocket, ReactionKind::Confused, ReactionKind::Eyes]
        );
    }

    #[test]
    fn test_manual_mode_reviews_use_defaults() {
        let directive = directive("<!--vote::manual -->", ItemKind::PullRequest);
        let reviews = vec![review("bob", ReviewState::ChangesRequested, 1)];
        match &translate_reviews(&reviews, &directive)[0] {
            Signal::Reaction(r) => assert_eq!(r.kind, ReactionKind::ThumbsDown),
            Signal::Comment(_) => panic!("expected reaction"),
        }
    }

    #[test]
    fn test_comment_mode_reviews_become_comments() {
        let directive = directive("<!--vote::manual comments -->", ItemKind::PullRequest);
        let reviews = vec![review("bob", ReviewState::Approved, 1)];
        assert!(matches!(
            translate_reviews(&reviews, &directive)[0],
            Signal::Comment(_)
        ));
    }

    #[test]
    fn test_manual_results_require_manager() {
        let comments = vec![
            comment("chair", 1, "vote::result accepted", 1),
            comment("member", 2, "vote::result rejected", 2),
            comment("chair", 3, "thanks all", 3),
        ];
        let results = manual_results(&comments, &config());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].actor.login, "chair");
    }

    #[tokio::test]
    async fn test_collect_reactions_skips_bot_and_detects_confused() {
        let platform = Arc::new(FakePlatform::new());
        platform.add_reaction("alice", ReactionKind::ThumbsUp, 1);
        platform.add_reaction(BOT, ReactionKind::Confused, 2);
        platform.add_reaction("dependabot[bot]", ReactionKind::Heart, 3);
        let collector = SignalCollector::new(platform.clone(), platform.clone());

        let item = item(1, "", &[]);
        let collected = collector
            .collect(&item, &directive("<!--vote::manual -->", ItemKind::Issue), &config())
            .await
            .unwrap();
        assert!(collected.bot_confused);
        assert_eq!(collected.signals.len(), 1);
        assert_eq!(collected.signals[0].actor().login, "alice");
        assert!(!platform.calls().contains(&"list_reviews".to_string()));
    }

    #[tokio::test]
    async fn test_collect_comment_mode_excludes_results_and_bot() {
        let platform = Arc::new(FakePlatform::new());
        platform.add_comment(comment("alice", 1, "+1 from me", 1));
        platform.add_comment(comment(BOT, 2, "### Vote progress", 2));
        platform.add_comment(comment("chair", 3, "vote::result accepted", 3));
        platform.add_reaction("bob", ReactionKind::ThumbsUp, 1);
        let collector = SignalCollector::new(platform.clone(), platform.clone());

        let item = item(1, "", &[]);
        let collected = collector
            .collect(
                &item,
                &directive("<!--vote::manual comments -->", ItemKind::Issue),
                &config(),
            )
            .await
            .unwrap();
        assert_eq!(collected.signals.len(), 1);
        assert!(matches!(collected.signals[0], Signal::Comment(_)));
        assert_eq!(collected.manual_results.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_pull_request_includes_reviews() {
        let platform = Arc::new(FakePlatform::new());
        platform.add_review(review("carol", ReviewState::Approved, 4));
        platform.add_reaction("alice", ReactionKind::Eyes, 1);
        let collector = SignalCollector::new(platform.clone(), platform.clone());

        let mut pr = item(2, "", &[]);
        pr.kind = ItemKind::PullRequest;
        let collected = collector
            .collect(&pr, &directive("", ItemKind::PullRequest), &config())
            .await
            .unwrap();
        assert_eq!(collected.signals.len(), 2);
    }

    #[tokio::test]
    async fn test_collect_propagates_platform_errors() {
        let platform = Arc::new(FakePlatform::new());
        platform.fail("list_comments");
        let collector = SignalCollector::new(platform.clone(), platform.clone());
        let result = collector
            .collect(&item(1, "", &[]), &directive("", ItemKind::Issue), &config())
            .await;
        assert!(matches!(result, Err(PlatformError::RequestFailed(_))));
    }
}
