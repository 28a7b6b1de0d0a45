//! Vote tallying domain
//!
//! Everything needed to turn the raw signals on an item into a quorum
//! decision, without any platform I/O:
//!
//! ```text
//! item body ──► VoteDirective ─┐
//! team roster ─► Membership ───┼─► tally() ──► VoteTally ──► markdown / snapshot
//! alternates ──► AlternateMap ─┤
//! reactions / comments ─► Signal
//! ```

pub mod directive;
pub mod item;
pub mod membership;
pub mod render;
pub mod signal;
pub mod status_link;
pub mod tally;

pub use directive::{CountingMode, DirectiveProblem, VoteDirective, remediation_message};
pub use item::{ItemKind, VoteItem};
pub use membership::{AlternateMap, Identity, Membership};
pub use render::{CategorySnapshot, DATA_MARKER, TallySnapshot};
pub use signal::{CommentSignal, ReactionKind, ReactionSignal, Review, ReviewState, Signal};
pub use status_link::{status_link, with_status_link};
pub use tally::{
    COMMENT_CATEGORY, Category, ClosingRecord, IGNORED_CATEGORY, VoteRecord, VoteTally, tally,
};
