//! Team and alternates resolution
//!
//! [`TeamResolver`] turns the voting group handle named by a directive into a
//! [`Membership`], and builds the [`AlternateMap`] for that group from the
//! repository's alternate mappings.
//!
//! Building alternates costs one file read and two roster fetches per
//! mapping, so results are cached per `(repository, hash of the mappings)`
//! for a configurable TTL. Concurrent requests for the same key share one
//! computation.

use crate::config::{AlternateMapping, RepositoryConfig};
use crate::ports::platform::{MembershipProvider, PlatformError, SourceFileProvider};
use govbot_domain::{AlternateMap, Identity, Membership};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Why one alternate mapping could not be built
#[derive(Error, Debug)]
enum AlternatesError {
    #[error("{0}")]
    Platform(#[from] PlatformError),

    #[error("file {path} not found in {repo}")]
    MissingFile { repo: String, path: String },

    #[error("file {path} in {repo} has no `members` list")]
    MissingMembers { repo: String, path: String },
}

/// Alternate maps of one repository, keyed by lowercased group handle
type GroupAlternates = HashMap<String, Arc<AlternateMap>>;

type CacheKey = (String, String);

struct CacheEntry {
    created: Instant,
    cell: Arc<OnceCell<Arc<GroupAlternates>>>,
}

/// TTL cache of computed alternates
pub struct AlternatesCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl AlternatesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache key for a repository's alternate mappings
    pub fn key(config: &RepositoryConfig) -> CacheKey {
        let serialized = serde_json::to_string(&config.alternates).unwrap_or_default();
        let digest = Sha256::digest(serialized.as_bytes());
        (config.repository.clone(), hex::encode(digest))
    }

    /// The shared cell for `key`, replacing it once expired
    fn cell(&self, key: CacheKey) -> Arc<OnceCell<Arc<GroupAlternates>>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, e| now.duration_since(e.created) < self.ttl);
        let entry = entries.entry(key).or_insert_with(|| CacheEntry {
            created: now,
            cell: Arc::new(OnceCell::new()),
        });
        Arc::clone(&entry.cell)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves voting groups and their alternates
pub struct TeamResolver {
    members: Arc<dyn MembershipProvider>,
    files: Arc<dyn SourceFileProvider>,
    cache: AlternatesCache,
}

impl TeamResolver {
    pub fn new(
        members: Arc<dyn MembershipProvider>,
        files: Arc<dyn SourceFileProvider>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            members,
            files,
            cache: AlternatesCache::new(cache_ttl),
        }
    }

    pub fn cache(&self) -> &AlternatesCache {
        &self.cache
    }

    /// Members of `handle`, minus bots and excluded logins
    ///
    /// Returns `Ok(None)` when the team does not exist, which makes the
    /// directive invalid rather than failing the evaluation.
    pub async fn resolve_group(
        &self,
        config: &RepositoryConfig,
        handle: &str,
    ) -> Result<Option<Membership>, PlatformError> {
        match self.members.list_team_members(handle).await {
            Ok(members) => {
                let membership =
                    Membership::new(handle, members).without(&config.excluded_logins);
                debug!("Resolved @{} to {} members", handle, membership.len());
                Ok(Some(membership))
            }
            Err(PlatformError::NotFound(e)) => {
                info!("Voting group @{} not found: {}", handle, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Alternates for `group`, if any mapping applies to it
    ///
    /// Mappings that cannot be built are logged and skipped.
    pub async fn resolve_alternates(
        &self,
        config: &RepositoryConfig,
        group: &str,
    ) -> Option<Arc<AlternateMap>> {
        if config.alternates_for(group).is_empty() {
            return None;
        }

        let cell = self.cache.cell(AlternatesCache::key(config));
        let all = cell
            .get_or_init(|| async { Arc::new(self.build_all(&config.alternates).await) })
            .await;
        all.get(&group.to_lowercase()).cloned()
    }

    async fn build_all(&self, mappings: &[AlternateMapping]) -> GroupAlternates {
        let mut by_group: HashMap<String, AlternateMap> = HashMap::new();
        for mapping in mappings {
            match self.build(mapping).await {
                Ok(map) => {
                    let merged = by_group
                        .entry(mapping.group.to_lowercase())
                        .or_insert_with(|| AlternateMap::new(mapping.group.clone()));
                    for (primary, delegate) in map.iter() {
                        merged.insert(primary, delegate.clone());
                    }
                }
                Err(e) => warn!(
                    "Skipping alternates for @{} from {}/{}: {}",
                    mapping.group, mapping.source_repo, mapping.path, e
                ),
            }
        }
        by_group
            .into_iter()
            .map(|(group, map)| (group, Arc::new(map)))
            .collect()
    }

    async fn build(&self, mapping: &AlternateMapping) -> Result<AlternateMap, AlternatesError> {
        let data = self
            .files
            .read_structured_file(&mapping.source_repo, &mapping.path)
            .await?
            .ok_or_else(|| AlternatesError::MissingFile {
                repo: mapping.source_repo.clone(),
                path: mapping.path.clone(),
            })?;
        let entries = data
            .get("members")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| AlternatesError::MissingMembers {
                repo: mapping.source_repo.clone(),
                path: mapping.path.clone(),
            })?;

        let field_of = |login: &str| -> Option<&str> {
            entries
                .iter()
                .find(|e| {
                    e.get("login")
                        .and_then(serde_json::Value::as_str)
                        .is_some_and(|l| l.eq_ignore_ascii_case(login))
                })
                .and_then(|e| e.get(&mapping.field))
                .and_then(serde_json::Value::as_str)
        };

        let primaries = self.members.list_team_members(&mapping.primary_team).await?;
        let secondaries: Vec<Identity> =
            self.members.list_team_members(&mapping.secondary_team).await?;

        let mut map = AlternateMap::new(mapping.group.clone());
        for primary in &primaries {
            let Some(value) = field_of(&primary.login) else {
                continue;
            };
            let delegate = secondaries.iter().find(|s| {
                !s.login.eq_ignore_ascii_case(&primary.login) && field_of(&s.login) == Some(value)
            });
            if let Some(delegate) = delegate {
                map.insert(primary.login.clone(), delegate.clone());
            }
        }
        debug!(
            "Built {} alternates for @{} from {}/{}",
            map.len(),
            mapping.group,
            mapping.source_repo,
            mapping.path
        );
        Ok(map)
    }
}
