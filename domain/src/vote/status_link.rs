//! Link from an item body to its status comment
//!
//! The item body carries a small hidden-delimited block pointing at the
//! status comment the bot maintains. The block is how an existing status
//! comment is found again on the next evaluation.

use regex::Regex;
use std::sync::LazyLock;

const BLOCK_START: &str = "<!-- govbot:status -->";
const BLOCK_END: &str = "<!-- /govbot:status -->";

static BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\n*<!-- govbot:status -->.*?<!-- /govbot:status -->\n*")
        .expect("status block pattern is valid")
});

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!-- govbot:status -->.*?\[Vote progress\]\(([^)\s]+)\)")
        .expect("status link pattern is valid")
});

/// URL of the status comment referenced by the body, if any
pub fn status_link(body: &str) -> Option<&str> {
    LINK_PATTERN
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// The body with its status block pointing at `url`
///
/// Replaces an existing block in place, or appends one.
pub fn with_status_link(body: &str, url: &str) -> String {
    let block = format!("{}\n[Vote progress]({})\n{}", BLOCK_START, url, BLOCK_END);
    let stripped = BLOCK_PATTERN.replace_all(body, "\n\n");
    let trimmed = stripped.trim_end();
    if trimmed.is_empty() {
        block
    } else {
        format!("{}\n\n{}", trimmed, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://github.com/org/repo/issues/1#issuecomment-1";

    #[test]
    fn test_missing_link() {
        assert_eq!(status_link("voting group: @org/quorum"), None);
        assert_eq!(status_link("[Vote progress](https://elsewhere)"), None);
    }

    #[test]
    fn test_append_then_find() {
        let body = with_status_link("voting group: @org/quorum\n", URL);
        assert!(body.starts_with("voting group: @org/quorum\n\n<!-- govbot:status -->"));
        assert_eq!(status_link(&body), Some(URL));
    }

    #[test]
    fn test_replace_existing_block() {
        let body = with_status_link("intro", URL);
        let moved = "https://github.com/org/repo/issues/1#issuecomment-2";
        let rewritten = with_status_link(&body, moved);
        assert_eq!(status_link(&rewritten), Some(moved));
        assert_eq!(rewritten.matches(BLOCK_START).count(), 1);
        assert!(rewritten.starts_with("intro\n\n"));
    }

    #[test]
    fn test_rewrite_is_stable() {
        let once = with_status_link("intro", URL);
        assert_eq!(with_status_link(&once, URL), once);
    }
}
