//! Vote tallying
//!
//! [`tally`] turns the normalized signals on an item into a [`VoteTally`]:
//!
//! 1. Reactions are walked newest first (ties broken by reaction priority),
//!    so the most recent, highest-priority reaction of each actor is the one
//!    that counts. Later signals from the same actor land in `duplicates`.
//! 2. Comments count once per actor, first comment wins.
//! 3. Absent primary members are filled by their delegate's vote.
//! 4. Quorum is checked against the threshold tier.
//!
//! The function is pure. Running it twice on the same inputs yields an equal
//! tally and byte-identical rendered output.

use super::directive::{CountingMode, VoteDirective};
use super::membership::{AlternateMap, Identity, Membership};
use super::signal::{CommentSignal, ReactionKind, ReactionSignal, Signal};
use crate::quorum::ThresholdTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Reserved category for reactions matching no weighted category
pub const IGNORED_CATEGORY: &str = "ignored";

/// The single category used when counting comments
pub const COMMENT_CATEGORY: &str = "comment";

/// One counted (or dropped) vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub actor: Identity,
    pub category: String,
    /// Reaction cast, for reaction-based modes
    pub reaction: Option<ReactionKind>,
    pub created_at: DateTime<Utc>,
    /// Link to the comment, for comment-based modes
    pub url: Option<String>,
    /// Primary member this delegate vote stands in for
    pub on_behalf_of: Option<String>,
}

impl VoteRecord {
    fn from_reaction(signal: &ReactionSignal, category: &str) -> Self {
        Self {
            actor: signal.actor.clone(),
            category: category.to_string(),
            reaction: Some(signal.kind),
            created_at: signal.created_at,
            url: None,
            on_behalf_of: None,
        }
    }

    fn from_comment(signal: &CommentSignal) -> Self {
        Self {
            actor: signal.actor.clone(),
            category: COMMENT_CATEGORY.to_string(),
            reaction: None,
            created_at: signal.created_at,
            url: Some(signal.url.clone()),
            on_behalf_of: None,
        }
    }
}

/// One bucket of a tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Reactions this category accepts (empty for comments)
    pub reactions: Vec<ReactionKind>,
    pub records: Vec<VoteRecord>,
    /// Every counted record
    pub total: usize,
    /// Records counted toward the voting group
    pub team_total: usize,
}

impl Category {
    fn new(name: impl Into<String>, reactions: Vec<ReactionKind>) -> Self {
        Self {
            name: name.into(),
            reactions,
            records: Vec::new(),
            total: 0,
            team_total: 0,
        }
    }
}

/// The authoritative manual result of a vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingRecord {
    pub author: Identity,
    pub created_at: DateTime<Utc>,
    pub body: String,
    pub url: String,
}

impl From<&CommentSignal> for ClosingRecord {
    fn from(comment: &CommentSignal) -> Self {
        Self {
            author: comment.actor.clone(),
            created_at: comment.created_at,
            body: comment.body.clone(),
            url: comment.url.clone(),
        }
    }
}

/// Immutable result of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub mode: CountingMode,
    pub group: Option<String>,
    pub threshold: ThresholdTier,
    pub group_size: usize,
    pub required_votes: usize,
    /// Votes cast by (or on behalf of) group members
    pub group_votes: usize,
    /// Votes counted from anyone, group or not
    pub counted_votes: usize,
    /// Duplicates plus ignored reactions
    pub dropped_votes: usize,
    /// Counted categories in render order
    pub categories: Vec<Category>,
    pub ignored: Category,
    pub duplicates: Vec<VoteRecord>,
    pub missing_group_actors: Vec<Identity>,
    pub has_quorum: bool,
    pub done: bool,
    pub closing: Option<ClosingRecord>,
}

impl VoteTally {
    /// Category by name
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Every counted record across categories
    pub fn records(&self) -> impl Iterator<Item = &VoteRecord> {
        self.categories.iter().flat_map(|c| c.records.iter())
    }
}

/// Compute the tally for one evaluation
///
/// Never fails. A zero-size group produces a tally that only reports quorum
/// under the unanimous tier; callers are expected to reject such groups first.
pub fn tally(
    directive: &VoteDirective,
    membership: &Membership,
    alternates: Option<&AlternateMap>,
    signals: &[Signal],
    manual_close: &[CommentSignal],
) -> VoteTally {
    let mut ignored = Category::new(IGNORED_CATEGORY, Vec::new());
    let mut duplicates = Vec::new();

    let mut categories = match directive.mode {
        CountingMode::ManualComments => vec![count_comments(signals)],
        CountingMode::WeightedReactions | CountingMode::ManualReactions => {
            count_reactions(directive, signals, &mut ignored, &mut duplicates)
        }
        CountingMode::Undefined => Vec::new(),
    };

    let counted: HashSet<String> = categories
        .iter()
        .flat_map(|c| c.records.iter().map(|r| r.actor.login.clone()))
        .collect();

    let substituted = match (alternates, directive.group.as_deref()) {
        (Some(alternates), Some(group)) if alternates.applies_to(group) => {
            substitute_delegates(&mut categories, membership, alternates, &counted)
        }
        _ => HashSet::new(),
    };

    for category in &mut categories {
        category.total = category.records.len();
        category.team_total = category
            .records
            .iter()
            .filter(|r| r.on_behalf_of.is_some() || membership.contains(&r.actor.login))
            .count();
    }
    ignored.total = ignored.records.len();
    ignored.team_total = ignored
        .records
        .iter()
        .filter(|r| membership.contains(&r.actor.login))
        .count();

    let missing_group_actors = membership
        .members()
        .filter(|m| !counted.contains(&m.login) && !substituted.contains(&m.login))
        .cloned()
        .collect();

    let group_size = membership.len();
    let group_votes = categories.iter().map(|c| c.team_total).sum();
    let counted_votes = categories.iter().map(|c| c.total).sum();
    let dropped_votes = duplicates.len() + ignored.total;

    let has_quorum = if group_size == 0 {
        directive.threshold == ThresholdTier::Unanimous
    } else {
        directive.threshold.has_quorum(group_size, group_votes)
    };

    let closing = manual_close
        .iter()
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.url.cmp(&b.url))
        })
        .map(ClosingRecord::from);

    VoteTally {
        mode: directive.mode,
        group: directive.group.clone(),
        threshold: directive.threshold,
        group_size,
        required_votes: directive.threshold.required_votes(group_size),
        group_votes,
        counted_votes,
        dropped_votes,
        categories,
        ignored,
        duplicates,
        missing_group_actors,
        has_quorum,
        done: closing.is_some(),
        closing,
    }
}

fn count_comments(signals: &[Signal]) -> Category {
    let mut comments: Vec<&CommentSignal> = signals
        .iter()
        .filter_map(|s| match s {
            Signal::Comment(c) => Some(c),
            Signal::Reaction(_) => None,
        })
        .collect();
    comments.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.actor.login.cmp(&b.actor.login))
    });

    let mut category = Category::new(COMMENT_CATEGORY, Vec::new());
    let mut seen = HashSet::new();
    for comment in comments {
        if seen.insert(comment.actor.login.as_str()) {
            category.records.push(VoteRecord::from_comment(comment));
        }
    }
    category
}

fn count_reactions(
    directive: &VoteDirective,
    signals: &[Signal],
    ignored: &mut Category,
    duplicates: &mut Vec<VoteRecord>,
) -> Vec<Category> {
    let mut reactions: Vec<&ReactionSignal> = signals
        .iter()
        .filter_map(|s| match s {
            Signal::Reaction(r) => Some(r),
            Signal::Comment(_) => None,
        })
        .collect();
    reactions.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.kind.priority().cmp(&b.kind.priority()))
            .then_with(|| a.actor.login.cmp(&b.actor.login))
    });

    let weighted = directive.mode == CountingMode::WeightedReactions;
    let mut categories: Vec<Category> = if weighted {
        directive
            .categories()
            .into_iter()
            .map(|(name, kinds)| Category::new(name, kinds.to_vec()))
            .collect()
    } else {
        Vec::new()
    };

    let mut seen = HashSet::new();
    for reaction in reactions {
        let index = if weighted {
            directive
                .category_of(reaction.kind)
                .and_then(|name| categories.iter().position(|c| c.name == name))
        } else {
            let name = reaction.kind.as_str();
            match categories.iter().position(|c| c.name == name) {
                Some(i) => Some(i),
                None => {
                    categories.push(Category::new(name, vec![reaction.kind]));
                    Some(categories.len() - 1)
                }
            }
        };

        let Some(index) = index else {
            ignored
                .records
                .push(VoteRecord::from_reaction(reaction, IGNORED_CATEGORY));
            continue;
        };

        let category = &mut categories[index];
        let record = VoteRecord::from_reaction(reaction, &category.name);
        if seen.insert(reaction.actor.login.as_str()) {
            category.records.push(record);
        } else {
            duplicates.push(record);
        }
    }

    if !weighted {
        categories.sort_by_key(|c| c.reactions.first().map(ReactionKind::priority));
    }
    categories
}

/// Attribute a delegate's vote to each absent primary member
///
/// Returns the logins of primaries whose slot was filled.
fn substitute_delegates(
    categories: &mut [Category],
    membership: &Membership,
    alternates: &AlternateMap,
    counted: &HashSet<String>,
) -> HashSet<String> {
    let mut substituted = HashSet::new();
    let mut used = HashSet::new();

    for (primary, delegate) in alternates.iter() {
        if !membership.contains(primary)
            || counted.contains(primary)
            || membership.contains(&delegate.login)
            || used.contains(&delegate.login)
        {
            continue;
        }
        let record = categories
            .iter_mut()
            .flat_map(|c| c.records.iter_mut())
            .find(|r| r.actor.login == delegate.login && r.on_behalf_of.is_none());
        if let Some(record) = record {
            record.on_behalf_of = Some(primary.to_string());
            used.insert(delegate.login.clone());
            substituted.insert(primary.to_string());
        }
    }
    substituted
}
