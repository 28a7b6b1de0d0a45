//! Threshold tiers for quorum determination
//!
//! A vote is decided once the number of group members who voted reaches the
//! minimum required by the tier. The minimum is computed with exact integer
//! arithmetic: `ceil(group_size * numerator / denominator)`.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Threshold tier for a vote
///
/// # Example
///
/// ```
/// use govbot_domain::quorum::ThresholdTier;
///
/// let tier = ThresholdTier::Majority;
/// assert_eq!(tier.required_votes(10), 5);
/// assert!(tier.has_quorum(5, 3));
/// assert!(!tier.has_quorum(5, 2));
///
/// assert_eq!(ThresholdTier::SupermajorityTwoThirds.required_votes(10), 7);
/// assert_eq!(ThresholdTier::SupermajorityFourFifths.required_votes(10), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdTier {
    /// Every member must vote
    #[serde(alias = "all")]
    Unanimous,

    /// At least half of the members must vote
    #[default]
    Majority,

    /// At least two thirds of the members must vote
    #[serde(alias = "twothirds")]
    SupermajorityTwoThirds,

    /// At least four fifths of the members must vote
    #[serde(alias = "fourfifths")]
    SupermajorityFourFifths,
}

impl ThresholdTier {
    /// All tiers, in increasing order of strictness (unanimous last)
    pub const ALL: [ThresholdTier; 4] = [
        ThresholdTier::Majority,
        ThresholdTier::SupermajorityTwoThirds,
        ThresholdTier::SupermajorityFourFifths,
        ThresholdTier::Unanimous,
    ];

    /// The `(numerator, denominator)` fraction of the group this tier requires
    pub const fn fraction(&self) -> (usize, usize) {
        match self {
            ThresholdTier::Unanimous => (1, 1),
            ThresholdTier::Majority => (1, 2),
            ThresholdTier::SupermajorityTwoThirds => (2, 3),
            ThresholdTier::SupermajorityFourFifths => (4, 5),
        }
    }

    /// Minimum number of votes needed for a group of `group_size` members
    pub fn required_votes(&self, group_size: usize) -> usize {
        let (num, den) = self.fraction();
        (group_size * num).div_ceil(den)
    }

    /// Whether `votes_cast` satisfies this tier for a group of `group_size`
    ///
    /// A group size of zero is trivially satisfied at zero votes.
    pub fn has_quorum(&self, group_size: usize, votes_cast: usize) -> bool {
        votes_cast >= self.required_votes(group_size)
    }

    /// Canonical name used in configuration and directives
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdTier::Unanimous => "all",
            ThresholdTier::Majority => "majority",
            ThresholdTier::SupermajorityTwoThirds => "twothirds",
            ThresholdTier::SupermajorityFourFifths => "fourfifths",
        }
    }

    /// Human-readable description used in rendered summaries
    pub fn description(&self) -> &'static str {
        match self {
            ThresholdTier::Unanimous => "all members",
            ThresholdTier::Majority => "a majority",
            ThresholdTier::SupermajorityTwoThirds => "a two-thirds supermajority",
            ThresholdTier::SupermajorityFourFifths => "a four-fifths supermajority",
        }
    }
}

impl std::fmt::Display for ThresholdTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ThresholdTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "unanimous" => Ok(ThresholdTier::Unanimous),
            "majority" => Ok(ThresholdTier::Majority),
            "twothirds" | "two-thirds" | "supermajority-two-thirds" => {
                Ok(ThresholdTier::SupermajorityTwoThirds)
            }
            "fourfifths" | "four-fifths" | "supermajority-four-fifths" => {
                Ok(ThresholdTier::SupermajorityFourFifths)
            }
            other => Err(DomainError::UnknownThreshold(other.to_string())),
        }
    }
}
