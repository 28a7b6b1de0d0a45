//! Rendering of a [`VoteTally`]
//!
//! Two renderings are produced from the same immutable tally: a markdown
//! summary for humans, and a compact JSON snapshot that is embedded in the
//! posted status comment as a hidden marker for machines.

use super::directive::CountingMode;
use super::tally::{Category, VoteRecord, VoteTally};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Prefix of the hidden marker carrying the JSON snapshot
pub const DATA_MARKER: &str = "<!-- govbot:data ";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Per-category counts in a [`TallySnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub name: String,
    pub total: usize,
    pub team_total: usize,
    pub voters: Vec<String>,
}

/// Machine-readable summary of a tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySnapshot {
    pub mode: CountingMode,
    pub group: Option<String>,
    pub threshold: String,
    pub group_size: usize,
    pub required_votes: usize,
    pub group_votes: usize,
    pub counted_votes: usize,
    pub dropped_votes: usize,
    pub categories: Vec<CategorySnapshot>,
    pub missing: Vec<String>,
    pub has_quorum: bool,
    pub done: bool,
    pub closed_by: Option<String>,
}

impl VoteTally {
    /// Structured snapshot of this tally
    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            mode: self.mode,
            group: self.group.clone(),
            threshold: self.threshold.to_string(),
            group_size: self.group_size,
            required_votes: self.required_votes,
            group_votes: self.group_votes,
            counted_votes: self.counted_votes,
            dropped_votes: self.dropped_votes,
            categories: self
                .categories
                .iter()
                .map(|c| CategorySnapshot {
                    name: c.name.clone(),
                    total: c.total,
                    team_total: c.team_total,
                    voters: c.records.iter().map(|r| r.actor.login.clone()).collect(),
                })
                .collect(),
            missing: self
                .missing_group_actors
                .iter()
                .map(|m| m.login.clone())
                .collect(),
            has_quorum: self.has_quorum,
            done: self.done,
            closed_by: self.closing.as_ref().map(|c| c.author.login.clone()),
        }
    }

    /// Markdown summary
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("### Vote progress\n\n");
        out.push_str(&self.status_line());
        out.push_str("\n\n");

        let group = self
            .group
            .as_deref()
            .map(|g| format!("@{}", g))
            .unwrap_or_else(|| "(none)".to_string());
        let _ = writeln!(
            out,
            "Voting group: {} · counting: {} · threshold: {}\n",
            group, self.mode, self.threshold
        );

        if !self.categories.is_empty() {
            self.write_table(&mut out);
            self.write_voters(&mut out);
        }

        if !self.missing_group_actors.is_empty() {
            let missing: Vec<_> = self
                .missing_group_actors
                .iter()
                .map(|m| m.markdown_link())
                .collect();
            let _ = writeln!(
                out,
                "**Not yet voted ({}):** {}\n",
                missing.len(),
                missing.join(", ")
            );
        }

        if !self.duplicates.is_empty() {
            let _ = writeln!(
                out,
                "> [!NOTE]\n> Only the most recent vote of each person counts. {} earlier {} ignored: {}\n",
                self.duplicates.len(),
                plural(self.duplicates.len(), "vote was", "votes were"),
                describe_records(&self.duplicates)
            );
        }

        if self.ignored.total > 0 {
            let _ = writeln!(
                out,
                "> [!NOTE]\n> {} {} not match any category: {}\n",
                self.ignored.total,
                plural(self.ignored.total, "reaction does", "reactions do"),
                describe_records(&self.ignored.records)
            );
        }

        if let Some(closing) = &self.closing {
            let _ = writeln!(
                out,
                "### Result\n\nRecorded by {} on [{}]({}):\n",
                closing.author.markdown_link(),
                closing.created_at.format(TIMESTAMP_FORMAT),
                closing.url
            );
            for line in closing.body.lines() {
                let _ = writeln!(out, "> {}", line);
            }
            out.push('\n');
        }

        out.trim_end().to_string()
    }

    /// Full status comment body: markdown plus the hidden snapshot marker
    pub fn status_comment(&self) -> String {
        let data = serde_json::to_string(&self.snapshot()).unwrap_or_default();
        format!("{}\n\n{}{} -->\n", self.to_markdown(), DATA_MARKER, data)
    }

    fn status_line(&self) -> String {
        if self.group_size == 0 {
            return "⚠️ No votes possible: the voting group has no members.".to_string();
        }
        let (icon, state) = if self.done {
            ("🏁", "Vote closed")
        } else if self.has_quorum {
            ("✅", "Quorum reached")
        } else {
            ("⏳", "Quorum not reached")
        };
        format!(
            "{} **{}**: {} of {} members have voted ({} requires {}).",
            icon,
            state,
            self.group_votes,
            self.group_size,
            self.threshold.description(),
            self.required_votes
        )
    }

    fn write_table(&self, out: &mut String) {
        if self.mode == CountingMode::ManualComments {
            out.push_str("| Category | Total | Group |\n|----------|------:|------:|\n");
            for category in &self.categories {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    category.name, category.total, category.team_total
                );
            }
        } else {
            out.push_str(
                "| Category | Reactions | Total | Group |\n|----------|-----------|------:|------:|\n",
            );
            for category in &self.categories {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    category.name,
                    reactions(category),
                    category.total,
                    category.team_total
                );
            }
        }
        out.push('\n');
    }

    fn write_voters(&self, out: &mut String) {
        for category in self.categories.iter().filter(|c| !c.records.is_empty()) {
            let voters: Vec<_> = category.records.iter().map(voter).collect();
            let _ = writeln!(out, "- **{}**: {}", category.name, voters.join(", "));
        }
        if self.categories.iter().any(|c| !c.records.is_empty()) {
            out.push('\n');
        }
    }
}

fn reactions(category: &Category) -> String {
    category
        .reactions
        .iter()
        .map(|r| r.emoji())
        .collect::<Vec<_>>()
        .join(" ")
}

fn voter(record: &VoteRecord) -> String {
    let link = match &record.url {
        Some(url) => format!("[{}]({})", record.actor.login, url),
        None => record.actor.markdown_link(),
    };
    match &record.on_behalf_of {
        Some(primary) => format!("{} (for {})", link, primary),
        None => link,
    }
}

fn describe_records(records: &[VoteRecord]) -> String {
    records
        .iter()
        .map(|r| match r.reaction {
            Some(kind) => format!("{} {}", r.actor.login, kind.emoji()),
            None => r.actor.login.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::ThresholdTier;
    use crate::vote::directive::VoteDirective;
    use crate::vote::item::ItemKind;
    use crate::vote::membership::{Identity, Membership};
    use crate::vote::signal::{CommentSignal, ReactionKind, Signal};
    use crate::vote::tally::tally;
    use chrono::{TimeZone, Utc};

    fn scenario() -> VoteTally {
        let directive = VoteDirective::parse(
            "voting group: @org/quorum\n<!--vote::marthas approve=\"+1\" ok=\"eyes\" revise=\"-1\" -->",
            ItemKind::Issue,
            ThresholdTier::Majority,
        );
        let members = Membership::new(
            "org/quorum",
            ["a", "b", "c", "d", "e"].iter().map(|l| Identity::from_login(*l)),
        );
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let signals = vec![
            Signal::reaction(Identity::from_login("a"), ReactionKind::ThumbsUp, at),
            Signal::reaction(Identity::from_login("b"), ReactionKind::ThumbsUp, at),
            Signal::reaction(Identity::from_login("c"), ReactionKind::ThumbsUp, at),
            Signal::reaction(Identity::from_login("d"), ReactionKind::Eyes, at),
        ];
        tally(&directive, &members, None, &signals, &[])
    }

    #[test]
    fn test_summary_mentions_progress() {
        let markdown = scenario().to_markdown();
        assert!(markdown.contains("✅ **Quorum reached**"));
        assert!(markdown.contains("4 of 5 members"));
        assert!(markdown.contains("| approve | 👍 | 3 | 3 |"));
        assert!(markdown.contains("| ok | 👀 | 1 | 1 |"));
        assert!(markdown.contains("**Not yet voted (1):** [e](https://github.com/e)"));
    }

    #[test]
    fn test_rendering_is_byte_identical() {
        assert_eq!(scenario().status_comment(), scenario().status_comment());
        assert_eq!(scenario().snapshot(), scenario().snapshot());
    }

    #[test]
    fn test_status_comment_embeds_snapshot() {
        let comment = scenario().status_comment();
        let start = comment.find(DATA_MARKER).unwrap() + DATA_MARKER.len();
        let end = comment[start..].find(" -->").unwrap() + start;
        let snapshot: TallySnapshot = serde_json::from_str(&comment[start..end]).unwrap();
        assert_eq!(snapshot.group_votes, 4);
        assert!(snapshot.has_quorum);
        assert_eq!(snapshot.missing, vec!["e".to_string()]);
    }

    #[test]
    fn test_empty_group_renders_no_votes_possible() {
        let directive =
            VoteDirective::parse("<!--vote::manual -->", ItemKind::Issue, ThresholdTier::Majority);
        let result = tally(&directive, &Membership::default(), None, &[], &[]);
        assert!(
            result
                .to_markdown()
                .contains("No votes possible: the voting group has no members")
        );
    }

    #[test]
    fn test_closing_record_block() {
        let directive =
            VoteDirective::parse("", ItemKind::Issue, ThresholdTier::Majority);
        let close = CommentSignal {
            actor: Identity::from_login("mgr"),
            created_at: Utc.with_ymd_and_hms(2024, 6, 2, 9, 30, 0).unwrap(),
            body: "vote::result\nApproved by the council".to_string(),
            url: "https://github.com/org/repo/issues/1#issuecomment-9".to_string(),
        };
        let result = tally(
            &directive,
            &Membership::new("org/quorum", vec![Identity::from_login("a")]),
            None,
            &[],
            &[close],
        );
        let markdown = result.to_markdown();
        assert!(markdown.contains("🏁 **Vote closed**"));
        assert!(markdown.contains("Recorded by [mgr](https://github.com/mgr)"));
        assert!(markdown.contains("2024-06-02 09:30 UTC"));
        assert!(markdown.contains("> Approved by the council"));
    }
}
