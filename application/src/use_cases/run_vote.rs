//! Vote lifecycle use case
//!
//! Evaluates one item end to end: checks the repository is set up for
//! voting, parses the directive, resolves the voting group, collects
//! signals, tallies them, and reconciles the status comment, the status
//! link in the item body, labels, and the bot's own reactions with the
//! result.
//!
//! Every evaluation of an item runs under its single-flight guard. A vote
//! event that finds the item busy is skipped. A manual result event is
//! never dropped: it is re-queued after a short delay until the guard is
//! free or the attempt cap is reached.

use crate::config::{LifecycleParams, RepositoryConfig};
use crate::ports::error_reporter::{ErrorReporter, NoErrorReporter};
use crate::ports::platform::{
    MembershipProvider, PlatformError, PlatformMutation, PlatformQuery, SourceFileProvider,
};
use crate::use_cases::collect_signals::{CollectedSignals, SignalCollector};
use crate::use_cases::resolve_group::TeamResolver;
use crate::use_cases::single_flight::SingleFlightRegistry;
use futures::FutureExt;
use futures::future::BoxFuture;
use govbot_domain::util::clip;
use govbot_domain::vote::{status_link, with_status_link};
use govbot_domain::{
    CommentSignal, Membership, ReactionKind, VoteDirective, VoteItem, VoteTally,
    remediation_message, tally,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const MAX_REPORT_BYTES: usize = 4000;

/// Errors that abort an evaluation
#[derive(Error, Debug)]
pub enum VoteError {
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Manual result event for {0} carries no closing comment")]
    MissingClosingComment(String),

    #[error("Manual result for {item} still contended after {attempts} attempts")]
    RequeueExhausted { item: String, attempts: u32 },
}

/// What started an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// A platform event on the item
    Webhook,
    /// A periodic sweep of open votes
    Scan,
    /// A manager recorded the result
    ManualResult,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerKind::Webhook => write!(f, "webhook"),
            TriggerKind::Scan => write!(f, "scan"),
            TriggerKind::ManualResult => write!(f, "manual result"),
        }
    }
}

/// Why an evaluation did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another evaluation of the item is running
    InFlight,
    /// The item is closed or not labeled as an open vote
    NotOpen,
    /// The manual result was not recorded by a manager
    NotManager,
}

/// Result of handling one event
#[derive(Debug)]
pub enum VoteOutcome {
    /// The tally was computed and reconciled
    Applied(Box<VoteTally>),
    /// The item or repository is misconfigured; remediation was posted
    Invalid(Vec<String>),
    Skipped(SkipReason),
    /// Retried later; the handle resolves to the retry's outcome
    Requeued(JoinHandle<VoteOutcome>),
    Failed(VoteError),
}

impl VoteOutcome {
    /// Short label for progress output
    pub fn status(&self) -> &'static str {
        match self {
            VoteOutcome::Applied(t) if t.done => "closed",
            VoteOutcome::Applied(t) if t.has_quorum => "quorum",
            VoteOutcome::Applied(_) => "pending",
            VoteOutcome::Invalid(_) => "invalid",
            VoteOutcome::Skipped(_) => "skipped",
            VoteOutcome::Requeued(_) => "requeued",
            VoteOutcome::Failed(_) => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, VoteOutcome::Failed(_))
    }

    pub fn tally(&self) -> Option<&VoteTally> {
        match self {
            VoteOutcome::Applied(t) => Some(t),
            _ => None,
        }
    }
}

/// Use case orchestrating one vote evaluation
#[derive(Clone)]
pub struct VoteLifecycleUseCase {
    query: Arc<dyn PlatformQuery>,
    mutation: Arc<dyn PlatformMutation>,
    resolver: Arc<TeamResolver>,
    collector: SignalCollector,
    guards: Arc<SingleFlightRegistry>,
    reporter: Arc<dyn ErrorReporter>,
    params: LifecycleParams,
}

impl VoteLifecycleUseCase {
    pub fn new(
        query: Arc<dyn PlatformQuery>,
        mutation: Arc<dyn PlatformMutation>,
        members: Arc<dyn MembershipProvider>,
        files: Arc<dyn SourceFileProvider>,
        params: LifecycleParams,
    ) -> Self {
        Self {
            collector: SignalCollector::new(Arc::clone(&query), Arc::clone(&members)),
            resolver: Arc::new(TeamResolver::new(members, files, params.alternates_cache_ttl)),
            guards: SingleFlightRegistry::new(params.guard_idle_ttl),
            reporter: Arc::new(NoErrorReporter),
            query,
            mutation,
            params,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn guards(&self) -> &Arc<SingleFlightRegistry> {
        &self.guards
    }

    /// Evaluate an item after a platform event or during a scan
    pub async fn handle_vote_event(
        &self,
        trigger: TriggerKind,
        item: &VoteItem,
        config: &RepositoryConfig,
    ) -> VoteOutcome {
        let Some(_guard) = self.guards.try_acquire(&item.id) else {
            debug!("Skipping {} ({}): evaluation in flight", item.id, trigger);
            return VoteOutcome::Skipped(SkipReason::InFlight);
        };
        self.run_guarded(trigger, item, config, None).await
    }

    /// Record a manager's result and close the vote
    pub async fn handle_manual_result_event(
        &self,
        item: VoteItem,
        closing: Option<CommentSignal>,
        config: RepositoryConfig,
    ) -> VoteOutcome {
        self.manual_attempt(item, closing, config, 0).await
    }

    fn manual_attempt(
        &self,
        item: VoteItem,
        closing: Option<CommentSignal>,
        config: RepositoryConfig,
        attempt: u32,
    ) -> BoxFuture<'static, VoteOutcome> {
        let this = self.clone();
        async move {
            let Some(closing) = closing else {
                let error = VoteError::MissingClosingComment(item.id.clone());
                this.report(TriggerKind::ManualResult, &item, &error);
                return VoteOutcome::Failed(error);
            };
            if !config.is_manager(&closing.actor.login) {
                info!(
                    "Ignoring result on {} from {}: not a manager",
                    item.id, closing.actor.login
                );
                return VoteOutcome::Skipped(SkipReason::NotManager);
            }

            let Some(_guard) = this.guards.try_acquire(&item.id) else {
                if attempt >= this.params.max_requeue_attempts {
                    let error = VoteError::RequeueExhausted {
                        item: item.id.clone(),
                        attempts: attempt,
                    };
                    this.report(TriggerKind::ManualResult, &item, &error);
                    return VoteOutcome::Failed(error);
                }
                debug!(
                    "Re-queueing manual result for {} (attempt {})",
                    item.id,
                    attempt + 1
                );
                let delay = this.params.requeue_delay;
                let retry = this.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    retry
                        .manual_attempt(item, Some(closing), config, attempt + 1)
                        .await
                });
                return VoteOutcome::Requeued(handle);
            };

            this.run_guarded(TriggerKind::ManualResult, &item, &config, Some(closing))
                .await
        }
        .boxed()
    }

    async fn run_guarded(
        &self,
        trigger: TriggerKind,
        item: &VoteItem,
        config: &RepositoryConfig,
        closing: Option<CommentSignal>,
    ) -> VoteOutcome {
        info!("Evaluating {} ({})", item.id, trigger);
        match self.evaluate(item, config, closing).await {
            Ok(outcome) => {
                info!("Evaluated {}: {}", item.id, outcome.status());
                outcome
            }
            Err(error) => {
                warn!("Evaluation of {} failed: {}", item.id, error);
                self.report(trigger, item, &error);
                VoteOutcome::Failed(error)
            }
        }
    }

    async fn evaluate(
        &self,
        item: &VoteItem,
        config: &RepositoryConfig,
        closing: Option<CommentSignal>,
    ) -> Result<VoteOutcome, VoteError> {
        let manual = closing.is_some();

        let defined = self.query.repository_labels(&item.repository).await?;
        let missing: Vec<&str> = config
            .labels
            .required()
            .into_iter()
            .filter(|l| !defined.iter().any(|d| d == l))
            .collect();
        if !missing.is_empty() {
            warn!("{} is missing vote labels: {}", item.repository, missing.join(", "));
            self.mutation
                .add_bot_reaction(item, ReactionKind::Confused)
                .await?;
            self.post_status(item, &missing_labels_message(&missing))
                .await?;
            return Ok(VoteOutcome::Invalid(
                missing.iter().map(|l| format!("missing label {}", l)).collect(),
            ));
        }

        if !manual && (!item.is_open || !item.has_label(&config.labels.open)) {
            debug!("{} is not an open vote", item.id);
            return Ok(VoteOutcome::Skipped(SkipReason::NotOpen));
        }

        let directive = VoteDirective::parse(&item.body, item.kind, config.threshold);
        let membership = match &directive.group {
            Some(handle) => self.resolver.resolve_group(config, handle).await?,
            None => None,
        };
        let problems = directive.problems(membership.as_ref());

        if !problems.is_empty() && !manual {
            info!("{} has an unusable vote directive", item.id);
            self.mutation
                .add_bot_reaction(item, ReactionKind::Confused)
                .await?;
            self.post_status(item, &remediation_message(&problems))
                .await?;
            if item.has_label(&config.labels.quorum) {
                self.mutation
                    .remove_labels(item, &[config.labels.quorum.clone()])
                    .await?;
            }
            return Ok(VoteOutcome::Invalid(
                problems.iter().map(|p| p.to_string()).collect(),
            ));
        }

        let collected = if problems.is_empty() {
            self.collector.collect(item, &directive, config).await?
        } else {
            CollectedSignals::default()
        };
        if collected.bot_confused {
            self.mutation
                .remove_bot_reaction(item, ReactionKind::Confused)
                .await?;
        }

        let alternates = match &directive.group {
            Some(group) => self.resolver.resolve_alternates(config, group).await,
            None => None,
        };

        let mut results = collected.manual_results;
        if let Some(closing) = closing
            && !results.iter().any(|r| r.url == closing.url)
        {
            results.push(closing);
        }

        let membership = membership.unwrap_or_else(|| {
            Membership::new(directive.group.clone().unwrap_or_default(), Vec::new())
        });
        let result = tally(
            &directive,
            &membership,
            alternates.as_deref(),
            &collected.signals,
            &results,
        );

        self.post_status(item, &result.status_comment()).await?;
        self.apply_labels(item, config, &result).await?;

        Ok(VoteOutcome::Applied(Box::new(result)))
    }

    /// Create or update the status comment and point the item body at it
    async fn post_status(&self, item: &VoteItem, body: &str) -> Result<(), PlatformError> {
        let existing = self.query.find_existing_bot_comment(item, &item.body).await?;
        if existing.as_ref().is_some_and(|c| c.body == body) {
            debug!("Status of {} unchanged", item.id);
            return Ok(());
        }

        let comment = self
            .mutation
            .upsert_comment(item, existing.as_ref(), body)
            .await?;
        if status_link(&item.body) != Some(comment.url.as_str()) {
            self.mutation
                .set_item_body(item, &with_status_link(&item.body, &comment.url))
                .await?;
        }
        Ok(())
    }

    async fn apply_labels(
        &self,
        item: &VoteItem,
        config: &RepositoryConfig,
        result: &VoteTally,
    ) -> Result<(), PlatformError> {
        let labels = &config.labels;
        let has_quorum_label = item.has_label(&labels.quorum);
        if result.has_quorum && !has_quorum_label {
            self.mutation.add_label(item, &labels.quorum).await?;
        } else if !result.has_quorum && has_quorum_label {
            self.mutation
                .remove_labels(item, &[labels.quorum.clone()])
                .await?;
        }

        if result.done {
            if item.has_label(&labels.open) {
                self.mutation
                    .remove_labels(item, &[labels.open.clone()])
                    .await?;
            }
            if !item.has_label(&labels.done) {
                self.mutation.add_label(item, &labels.done).await?;
            }
        }
        Ok(())
    }

    fn report(&self, trigger: TriggerKind, item: &VoteItem, error: &VoteError) {
        let subject = format!("Vote evaluation failed for {}", item.id);
        let body = format!(
            "Item: {}\nTrigger: {}\nError: {}\n\n{:#?}",
            item.url, trigger, error, error
        );
        self.reporter
            .report(&subject, &clip(&body, MAX_REPORT_BYTES));
    }
}

fn missing_labels_message(missing: &[&str]) -> String {
    let labels: Vec<_> = missing.iter().map(|l| format!("`{}`", l)).collect();
    format!(
        "### Vote configuration needs attention\n\n\
         This repository is missing labels the vote lifecycle relies on: {}.\n\n\
         Create them, then edit this item or react to it to re-run the evaluation.\n",
        labels.join(", ")
    )
}
