//! Domain layer for govbot
//!
//! This crate contains the vote tallying logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Directive
//!
//! An item (issue, pull request, discussion) opts into a vote through its
//! body: a `voting group: @org/team` line and a hidden `<!--vote::... -->`
//! marker selecting how votes are counted.
//!
//! ## Tally
//!
//! Reactions, comments and reviews are normalized into signals and counted
//! per category. The tally reports whether enough group members voted to
//! reach the configured [`ThresholdTier`].

pub mod core;
pub mod quorum;
pub mod util;
pub mod vote;

pub use core::error::DomainError;
pub use quorum::ThresholdTier;
pub use vote::{
    AlternateMap, Category, ClosingRecord, CommentSignal, CountingMode, DirectiveProblem,
    Identity, ItemKind, Membership, ReactionKind, ReactionSignal, Review, ReviewState, Signal,
    TallySnapshot, VoteDirective, VoteItem, VoteRecord, VoteTally, remediation_message, tally,
};
