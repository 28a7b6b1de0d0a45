//! Normalized vote inputs
//!
//! Everything the tally consumes is one of two shapes: a reaction-like
//! signal (actor, reaction, timestamp) or a comment-like signal (actor,
//! timestamp, text). Pull-request reviews are translated into one of these
//! before they reach the tally.

use super::membership::Identity;
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reactions supported by the platform
///
/// Declaration order is the tie-break priority used when two reactions from
/// the same actor share a timestamp (earlier variant wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReactionKind {
    #[serde(rename = "rocket")]
    Rocket,
    #[serde(rename = "heart")]
    Heart,
    #[serde(rename = "hooray")]
    Hooray,
    #[serde(rename = "laugh")]
    Laugh,
    #[serde(rename = "+1")]
    ThumbsUp,
    #[serde(rename = "eyes")]
    Eyes,
    #[serde(rename = "confused")]
    Confused,
    #[serde(rename = "-1")]
    ThumbsDown,
}

impl ReactionKind {
    /// Tie-break rank; lower wins
    pub fn priority(&self) -> u8 {
        *self as u8
    }

    /// Platform name (`+1`, `eyes`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Rocket => "rocket",
            ReactionKind::Heart => "heart",
            ReactionKind::Hooray => "hooray",
            ReactionKind::Laugh => "laugh",
            ReactionKind::ThumbsUp => "+1",
            ReactionKind::Eyes => "eyes",
            ReactionKind::Confused => "confused",
            ReactionKind::ThumbsDown => "-1",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ReactionKind::Rocket => "🚀",
            ReactionKind::Heart => "❤️",
            ReactionKind::Hooray => "🎉",
            ReactionKind::Laugh => "😄",
            ReactionKind::ThumbsUp => "👍",
            ReactionKind::Eyes => "👀",
            ReactionKind::Confused => "😕",
            ReactionKind::ThumbsDown => "👎",
        }
    }
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.emoji())
    }
}

impl std::str::FromStr for ReactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches(':').to_lowercase().as_str() {
            "rocket" | "🚀" => Ok(ReactionKind::Rocket),
            "heart" | "❤️" | "❤" => Ok(ReactionKind::Heart),
            "hooray" | "tada" | "🎉" => Ok(ReactionKind::Hooray),
            "laugh" | "smile" | "😄" => Ok(ReactionKind::Laugh),
            "+1" | "thumbsup" | "thumbs_up" | "👍" => Ok(ReactionKind::ThumbsUp),
            "eyes" | "👀" => Ok(ReactionKind::Eyes),
            "confused" | "😕" => Ok(ReactionKind::Confused),
            "-1" | "thumbsdown" | "thumbs_down" | "👎" => Ok(ReactionKind::ThumbsDown),
            other => Err(DomainError::UnknownReaction(other.to_string())),
        }
    }
}

/// A reaction left on the item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSignal {
    pub actor: Identity,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

/// A comment left on the item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSignal {
    pub actor: Identity,
    pub created_at: DateTime<Utc>,
    pub body: String,
    pub url: String,
}

/// A normalized vote input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    Reaction(ReactionSignal),
    Comment(CommentSignal),
}

impl Signal {
    pub fn reaction(actor: Identity, kind: ReactionKind, created_at: DateTime<Utc>) -> Self {
        Signal::Reaction(ReactionSignal {
            actor,
            kind,
            created_at,
        })
    }

    pub fn comment(
        actor: Identity,
        created_at: DateTime<Utc>,
        body: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Signal::Comment(CommentSignal {
            actor,
            created_at,
            body: body.into(),
            url: url.into(),
        })
    }

    pub fn actor(&self) -> &Identity {
        match self {
            Signal::Reaction(r) => &r.actor,
            Signal::Comment(c) => &c.actor,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Signal::Reaction(r) => r.created_at,
            Signal::Comment(c) => c.created_at,
        }
    }
}

/// State of a pull-request review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

/// A pull-request review as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub author: Identity,
    pub state: ReviewState,
    pub submitted_at: DateTime<Utc>,
    pub body: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let mut kinds = vec![
            ReactionKind::ThumbsDown,
            ReactionKind::Eyes,
            ReactionKind::Rocket,
            ReactionKind::Confused,
            ReactionKind::ThumbsUp,
            ReactionKind::Laugh,
            ReactionKind::Heart,
            ReactionKind::Hooray,
        ];
        kinds.sort_by_key(|k| k.priority());
        assert_eq!(
            kinds,
            vec![
                ReactionKind::Rocket,
                ReactionKind::Heart,
                ReactionKind::Hooray,
                ReactionKind::Laugh,
                ReactionKind::ThumbsUp,
                ReactionKind::Eyes,
                ReactionKind::Confused,
                ReactionKind::ThumbsDown,
            ]
        );
    }

    #[test]
    fn test_parse_reaction_aliases() {
        assert_eq!("+1".parse::<ReactionKind>().ok(), Some(ReactionKind::ThumbsUp));
        assert_eq!(
            ":thumbsup:".parse::<ReactionKind>().ok(),
            Some(ReactionKind::ThumbsUp)
        );
        assert_eq!("👎".parse::<ReactionKind>().ok(), Some(ReactionKind::ThumbsDown));
        assert_eq!("tada".parse::<ReactionKind>().ok(), Some(ReactionKind::Hooray));
        assert!("party".parse::<ReactionKind>().is_err());
    }

    #[test]
    fn test_platform_names_round_trip_through_serde() {
        let kind: ReactionKind = serde_json::from_str("\"-1\"").unwrap();
        assert_eq!(kind, ReactionKind::ThumbsDown);
        assert_eq!(serde_json::to_string(&ReactionKind::ThumbsUp).unwrap(), "\"+1\"");
    }

    #[test]
    fn test_review_state_from_platform() {
        let state: ReviewState = serde_json::from_str("\"CHANGES_REQUESTED\"").unwrap();
        assert_eq!(state, ReviewState::ChangesRequested);
    }
}
