//! Voting group membership and alternates

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A platform user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    pub login: String,
    pub url: String,
}

impl Identity {
    pub fn new(login: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            url: url.into(),
        }
    }

    /// Identity with a profile URL derived from the login
    pub fn from_login(login: impl Into<String>) -> Self {
        let login = login.into();
        let url = format!("https://github.com/{}", login);
        Self { login, url }
    }

    /// App accounts carry a `[bot]` suffix
    pub fn is_bot(&self) -> bool {
        self.login.ends_with("[bot]")
    }

    /// Markdown link to the user's profile
    pub fn markdown_link(&self) -> String {
        format!("[{}]({})", self.login, self.url)
    }
}

/// A resolved voting group
///
/// Members are unique by login and kept sorted so that anything derived from
/// the membership (missing members, rendered lists) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Group handle, e.g. `org/council`
    pub handle: String,
    members: BTreeMap<String, Identity>,
}

impl Membership {
    pub fn new(handle: impl Into<String>, members: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            handle: handle.into(),
            members: members
                .into_iter()
                .map(|m| (m.login.clone(), m))
                .collect(),
        }
    }

    /// Drop bot accounts and the given logins (case-insensitive)
    pub fn without(mut self, excluded: &[String]) -> Self {
        self.members.retain(|login, identity| {
            !identity.is_bot() && !excluded.iter().any(|e| e.eq_ignore_ascii_case(login))
        });
        self
    }

    pub fn contains(&self, login: &str) -> bool {
        self.members.contains_key(login)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members sorted by login
    pub fn members(&self) -> impl Iterator<Item = &Identity> {
        self.members.values()
    }
}

/// Delegates for absent primary members of one voting group
///
/// Maps a primary member's login to the identity allowed to vote in their place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateMap {
    /// Group handle these alternates apply to
    pub group: String,
    alternates: BTreeMap<String, Identity>,
}

impl AlternateMap {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            alternates: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, primary: impl Into<String>, delegate: Identity) {
        self.alternates.insert(primary.into(), delegate);
    }

    pub fn with(mut self, primary: impl Into<String>, delegate: Identity) -> Self {
        self.insert(primary, delegate);
        self
    }

    pub fn delegate_for(&self, primary: &str) -> Option<&Identity> {
        self.alternates.get(primary)
    }

    /// Whether these alternates apply to the given group handle
    pub fn applies_to(&self, group: &str) -> bool {
        !self.alternates.is_empty() && self.group.eq_ignore_ascii_case(group)
    }

    pub fn is_empty(&self) -> bool {
        self.alternates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alternates.len()
    }

    /// `(primary, delegate)` pairs sorted by primary login
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Identity)> {
        self.alternates.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_excludes_bots_and_configured_logins() {
        let group = Membership::new(
            "org/council",
            vec![
                Identity::from_login("alice"),
                Identity::from_login("Bob"),
                Identity::from_login("helper[bot]"),
            ],
        )
        .without(&["bob".to_string()]);

        assert_eq!(group.len(), 1);
        assert!(group.contains("alice"));
        assert!(!group.contains("Bob"));
        assert!(!group.contains("helper[bot]"));
    }

    #[test]
    fn test_members_sorted_and_unique() {
        let group = Membership::new(
            "org/council",
            vec![
                Identity::from_login("zed"),
                Identity::from_login("amy"),
                Identity::from_login("zed"),
            ],
        );
        let logins: Vec<_> = group.members().map(|m| m.login.as_str()).collect();
        assert_eq!(logins, vec!["amy", "zed"]);
    }

    #[test]
    fn test_alternates_apply_to_group() {
        let alternates = AlternateMap::new("org/Council").with("alice", Identity::from_login("al"));
        assert!(alternates.applies_to("org/council"));
        assert!(!alternates.applies_to("org/other"));
        assert!(!AlternateMap::new("org/council").applies_to("org/council"));
        assert_eq!(
            alternates.delegate_for("alice").map(|d| d.login.as_str()),
            Some("al")
        );
    }
}
