//! Vote directive parsing
//!
//! An item describes how its vote is counted with two pieces of free text in
//! its body: a `voting group: @org/team` line naming the voters, and a hidden
//! `<!--vote::... -->` marker selecting the counting mode. These functions are
//! pure text matching and never touch the platform.
//!
//! | Marker | Mode |
//! |--------|------|
//! | `<!--vote::marthas approve="+1" ok="eyes" revise="-1" -->` | [`CountingMode::WeightedReactions`] |
//! | `<!--vote::manual -->` | [`CountingMode::ManualReactions`] |
//! | `<!--vote::manual comments -->` | [`CountingMode::ManualComments`] |
//! | absent (pull request) | [`CountingMode::WeightedReactions`] with defaults |
//! | absent (otherwise) | [`CountingMode::Undefined`] |

use super::item::ItemKind;
use super::membership::Membership;
use super::signal::ReactionKind;
use crate::quorum::ThresholdTier;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static GROUP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)voting\s+group[^@\n]*@(\S+)").expect("group pattern is valid")
});

static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s*vote(.*?)-->").expect("directive pattern is valid")
});

static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-z]+)\s*=\s*"([^"]*)""#).expect("attribute pattern is valid")
});

/// How votes on an item are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Reactions sorted into approve / ok / revise categories
    WeightedReactions,
    /// Every distinct reaction is its own category
    ManualReactions,
    /// One vote per commenter
    ManualComments,
    /// No usable directive
    Undefined,
}

impl CountingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountingMode::WeightedReactions => "marthas",
            CountingMode::ManualReactions => "manual",
            CountingMode::ManualComments => "manual-comments",
            CountingMode::Undefined => "undefined",
        }
    }

    /// Whether the tally for this mode is built from reactions
    pub fn counts_reactions(&self) -> bool {
        matches!(
            self,
            CountingMode::WeightedReactions | CountingMode::ManualReactions
        )
    }
}

impl std::fmt::Display for CountingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reason a directive cannot be counted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveProblem {
    /// No `voting group: @...` line
    MissingGroup,
    /// The named group resolved to no members
    EmptyGroup(String),
    /// No recognizable `<!--vote::... -->` marker
    UndefinedMode,
    /// A weighted category has no reactions
    EmptyCategory(&'static str),
    /// Two weighted categories share a reaction
    OverlappingCategories(&'static str, &'static str),
    /// `threshold="..."` is not a known tier
    UnknownThreshold(String),
}

impl std::fmt::Display for DirectiveProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectiveProblem::MissingGroup => write!(
                f,
                "No voting group was found. Add a line such as `voting group: @org/team`."
            ),
            DirectiveProblem::EmptyGroup(handle) => write!(
                f,
                "The voting group `@{}` could not be resolved or has no members.",
                handle
            ),
            DirectiveProblem::UndefinedMode => write!(
                f,
                "No vote directive was found. Add a hidden `<!--vote::... -->` marker describing how votes are counted."
            ),
            DirectiveProblem::EmptyCategory(name) => write!(
                f,
                "The `{}` category does not list any recognized reactions.",
                name
            ),
            DirectiveProblem::OverlappingCategories(a, b) => write!(
                f,
                "The `{}` and `{}` categories share a reaction; each reaction may only count once.",
                a, b
            ),
            DirectiveProblem::UnknownThreshold(value) => write!(
                f,
                "`threshold=\"{}\"` is not recognized. Use one of: all, majority, twothirds, fourfifths.",
                value
            ),
        }
    }
}

/// Parsed description of how an item's vote is counted
///
/// Immutable once parsed. Validity is derived on demand from the directive
/// and the resolved group; it is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDirective {
    /// Group handle without the leading `@`
    pub group: Option<String>,
    pub mode: CountingMode,
    pub approve: Vec<ReactionKind>,
    pub ok: Vec<ReactionKind>,
    pub revise: Vec<ReactionKind>,
    pub threshold: ThresholdTier,
    /// Raw `threshold="..."` value that did not name a tier
    pub unknown_threshold: Option<String>,
}

impl VoteDirective {
    pub const DEFAULT_APPROVE: ReactionKind = ReactionKind::ThumbsUp;
    pub const DEFAULT_OK: ReactionKind = ReactionKind::Eyes;
    pub const DEFAULT_REVISE: ReactionKind = ReactionKind::ThumbsDown;

    /// Parse the directive out of an item body
    ///
    /// `default_threshold` is the repository's configured tier; a
    /// `threshold="..."` attribute overrides it for this item only.
    ///
    /// # Example
    ///
    /// ```
    /// use govbot_domain::vote::{CountingMode, ItemKind, VoteDirective};
    /// use govbot_domain::quorum::ThresholdTier;
    ///
    /// let body = "voting group: @org/council\n<!--vote::manual comments -->";
    /// let directive = VoteDirective::parse(body, ItemKind::Issue, ThresholdTier::Majority);
    /// assert_eq!(directive.group.as_deref(), Some("org/council"));
    /// assert_eq!(directive.mode, CountingMode::ManualComments);
    /// ```
    pub fn parse(body: &str, kind: ItemKind, default_threshold: ThresholdTier) -> Self {
        let group = parse_group(body);
        let contents = DIRECTIVE_PATTERN
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_lowercase())
            .unwrap_or_default();

        let mut directive = Self {
            group,
            mode: CountingMode::Undefined,
            approve: vec![Self::DEFAULT_APPROVE],
            ok: vec![Self::DEFAULT_OK],
            revise: vec![Self::DEFAULT_REVISE],
            threshold: default_threshold,
            unknown_threshold: None,
        };

        if contents.is_empty() {
            if kind == ItemKind::PullRequest {
                directive.mode = CountingMode::WeightedReactions;
            }
            return directive;
        }

        if contents.starts_with("::marthas") {
            directive.mode = CountingMode::WeightedReactions;
        } else if contents.starts_with("::manual") {
            directive.mode = if contents.contains("comments") {
                CountingMode::ManualComments
            } else {
                CountingMode::ManualReactions
            };
        }

        for cap in ATTRIBUTE_PATTERN.captures_iter(&contents) {
            let value = &cap[2];
            match &cap[1] {
                "approve" => directive.approve = parse_reaction_list(value),
                "ok" => directive.ok = parse_reaction_list(value),
                "revise" => directive.revise = parse_reaction_list(value),
                "threshold" => match value.parse::<ThresholdTier>() {
                    Ok(tier) => directive.threshold = tier,
                    Err(_) => directive.unknown_threshold = Some(value.to_string()),
                },
                _ => {}
            }
        }

        directive
    }

    /// The group could not be resolved to any members
    pub fn invalid_group(&self, membership: Option<&Membership>) -> bool {
        self.group.is_none() || membership.is_none_or(Membership::is_empty)
    }

    /// The counting mode is unusable
    ///
    /// True when the mode is undefined, or when weighted categories are empty
    /// or intersect.
    pub fn invalid_reactions(&self) -> bool {
        if self.mode == CountingMode::Undefined {
            return true;
        }
        self.mode == CountingMode::WeightedReactions && !self.category_problems().is_empty()
    }

    pub fn invalid_threshold(&self) -> bool {
        self.unknown_threshold.is_some()
    }

    /// Every reason this directive cannot be counted, in a stable order
    pub fn problems(&self, membership: Option<&Membership>) -> Vec<DirectiveProblem> {
        let mut problems = Vec::new();
        match &self.group {
            None => problems.push(DirectiveProblem::MissingGroup),
            Some(handle) if self.invalid_group(membership) => {
                problems.push(DirectiveProblem::EmptyGroup(handle.clone()))
            }
            Some(_) => {}
        }
        match self.mode {
            CountingMode::Undefined => problems.push(DirectiveProblem::UndefinedMode),
            CountingMode::WeightedReactions => problems.extend(self.category_problems()),
            _ => {}
        }
        if let Some(value) = &self.unknown_threshold {
            problems.push(DirectiveProblem::UnknownThreshold(value.clone()));
        }
        problems
    }

    pub fn is_valid(&self, membership: Option<&Membership>) -> bool {
        self.problems(membership).is_empty()
    }

    /// Weighted category lists in render order
    pub fn categories(&self) -> [(&'static str, &[ReactionKind]); 3] {
        [
            ("approve", self.approve.as_slice()),
            ("ok", self.ok.as_slice()),
            ("revise", self.revise.as_slice()),
        ]
    }

    /// Name of the weighted category a reaction belongs to
    pub fn category_of(&self, kind: ReactionKind) -> Option<&'static str> {
        self.categories()
            .into_iter()
            .find(|(_, reactions)| reactions.contains(&kind))
            .map(|(name, _)| name)
    }

    fn category_problems(&self) -> Vec<DirectiveProblem> {
        let categories = self.categories();
        let mut problems: Vec<_> = categories
            .iter()
            .filter(|(_, reactions)| reactions.is_empty())
            .map(|(name, _)| DirectiveProblem::EmptyCategory(*name))
            .collect();

        for (i, (a, first)) in categories.iter().enumerate() {
            for (b, second) in &categories[i + 1..] {
                if first.iter().any(|r| second.contains(r)) {
                    problems.push(DirectiveProblem::OverlappingCategories(*a, *b));
                }
            }
        }
        problems
    }
}

/// Human-readable remediation posted back to an item whose directive is unusable
///
/// Deterministic for a given list of problems.
pub fn remediation_message(problems: &[DirectiveProblem]) -> String {
    let mut message = String::from(
        "### Vote configuration needs attention\n\nThis item is open for a vote, but votes cannot be counted yet:\n\n",
    );
    for problem in problems {
        message.push_str(&format!("- {}\n", problem));
    }
    message.push_str(
        "\nThe item body should name the voting group and describe how votes are counted, for example:\n\n\
         ```markdown\n\
         voting group: @org/team\n\
         <!--vote::marthas approve=\"+1\" ok=\"eyes\" revise=\"-1\" -->\n\
         ```\n\n\
         Other supported markers:\n\n\
         - `<!--vote::manual -->` counts every distinct reaction separately\n\
         - `<!--vote::manual comments -->` counts one comment per member\n\
         - `threshold=\"all|majority|twothirds|fourfifths\"` overrides the required quorum\n",
    );
    message
}

fn parse_group(body: &str) -> Option<String> {
    GROUP_PATTERN
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ')']).to_string())
        .filter(|handle| !handle.is_empty())
}

fn parse_reaction_list(value: &str) -> Vec<ReactionKind> {
    let mut reactions = Vec::new();
    for kind in value.split(',').filter_map(|s| s.parse::<ReactionKind>().ok()) {
        if !reactions.contains(&kind) {
            reactions.push(kind);
        }
    }
    reactions
}
