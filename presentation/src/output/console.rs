//! Console output formatter for vote evaluations

use colored::Colorize;
use govbot_application::{SkipReason, VoteOutcome};
use govbot_domain::{VoteItem, VoteTally};
use serde_json::json;

/// Formats evaluation outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format one evaluated item
    pub fn format(item: &VoteItem, outcome: &VoteOutcome) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} {}\n",
            format!("#{}", item.number).cyan().bold(),
            item.title.bold(),
            Self::status_badge(outcome)
        ));
        output.push_str(&format!("  {}\n", item.url.dimmed()));

        match outcome {
            VoteOutcome::Applied(tally) => output.push_str(&Self::format_tally(tally)),
            VoteOutcome::Invalid(reasons) => {
                for reason in reasons {
                    output.push_str(&format!("  {} {}\n", "!".yellow(), reason));
                }
            }
            VoteOutcome::Skipped(reason) => {
                output.push_str(&format!("  {}\n", Self::skip_text(*reason).dimmed()));
            }
            VoteOutcome::Requeued(_) => {
                output.push_str(&format!("  {}\n", "retry scheduled".dimmed()));
            }
            VoteOutcome::Failed(error) => {
                output.push_str(&format!("  {} {}\n", "Error:".red().bold(), error));
            }
        }

        output
    }

    /// Counts, categories and missing voters of a tally
    pub fn format_tally(tally: &VoteTally) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "  {} {} of {} voted, {} required ({})\n",
            "Group:".cyan(),
            tally.group_votes,
            tally.group_size,
            tally.required_votes,
            tally.threshold.description()
        ));

        for category in &tally.categories {
            let voters: Vec<_> = category
                .records
                .iter()
                .map(|r| r.actor.login.as_str())
                .collect();
            output.push_str(&format!(
                "  {:<10} {:>3} {}\n",
                category.name.bold(),
                category.total,
                voters.join(", ").dimmed()
            ));
        }

        if !tally.missing_group_actors.is_empty() {
            let missing: Vec<_> = tally
                .missing_group_actors
                .iter()
                .map(|m| m.login.as_str())
                .collect();
            output.push_str(&format!(
                "  {} {}\n",
                "Not yet voted:".yellow(),
                missing.join(", ")
            ));
        }

        if tally.dropped_votes > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                "Dropped:".dimmed(),
                tally.dropped_votes
            ));
        }

        if let Some(closing) = &tally.closing {
            output.push_str(&format!(
                "  {} by {} at {}\n",
                "Closed".green().bold(),
                closing.author.login,
                closing.created_at.to_rfc3339()
            ));
        }

        output
    }

    /// Format a scan: one block per item, then a summary line
    pub fn format_scan(results: &[(VoteItem, VoteOutcome)]) -> String {
        let mut output = String::new();
        for (item, outcome) in results {
            output.push_str(&Self::format(item, outcome));
            output.push('\n');
        }

        let failed = results.iter().filter(|(_, o)| o.is_failure()).count();
        let summary = format!("{} items evaluated, {} failed", results.len(), failed);
        if failed > 0 {
            output.push_str(&format!("{}\n", summary.red()));
        } else {
            output.push_str(&format!("{}\n", summary.green()));
        }
        output
    }

    /// Format as JSON
    pub fn format_json(item: &VoteItem, outcome: &VoteOutcome) -> String {
        serde_json::to_string_pretty(&Self::outcome_json(item, outcome))
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a scan as a JSON array
    pub fn format_scan_json(results: &[(VoteItem, VoteOutcome)]) -> String {
        let values: Vec<_> = results
            .iter()
            .map(|(item, outcome)| Self::outcome_json(item, outcome))
            .collect();
        serde_json::to_string_pretty(&values).unwrap_or_else(|_| "[]".to_string())
    }

    fn outcome_json(item: &VoteItem, outcome: &VoteOutcome) -> serde_json::Value {
        let mut value = json!({
            "item": item.id,
            "url": item.url,
            "status": outcome.status(),
        });
        match outcome {
            VoteOutcome::Applied(tally) => value["tally"] = json!(tally.snapshot()),
            VoteOutcome::Invalid(reasons) => value["reasons"] = json!(reasons),
            VoteOutcome::Skipped(reason) => value["reason"] = json!(Self::skip_text(*reason)),
            VoteOutcome::Failed(error) => value["error"] = json!(error.to_string()),
            VoteOutcome::Requeued(_) => {}
        }
        value
    }

    fn status_badge(outcome: &VoteOutcome) -> String {
        let label = format!("[{}]", outcome.status());
        match outcome {
            VoteOutcome::Applied(t) if t.done => label.green().bold().to_string(),
            VoteOutcome::Applied(t) if t.has_quorum => label.green().to_string(),
            VoteOutcome::Applied(_) => label.yellow().to_string(),
            VoteOutcome::Invalid(_) => label.yellow().bold().to_string(),
            VoteOutcome::Failed(_) => label.red().bold().to_string(),
            VoteOutcome::Skipped(_) | VoteOutcome::Requeued(_) => label.dimmed().to_string(),
        }
    }

    fn skip_text(reason: SkipReason) -> &'static str {
        match reason {
            SkipReason::InFlight => "another evaluation is in progress",
            SkipReason::NotOpen => "not an open vote",
            SkipReason::NotManager => "result not recorded by a manager",
        }
    }
}
