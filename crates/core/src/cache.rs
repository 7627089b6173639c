//! Cache tags and a tag-invalidated query cache.
//!
//! Every service mutation reports the tags it affected; readers cache
//! results under a key plus the tags the result depends on. Invalidating a
//! tag drops every cached entry that depends on it, so no reader needs to
//! know which writers exist.
//!
//! Each tag also carries a generation that every invalidation bumps. A
//! reader stamps its tags before going to the store and stores the result
//! with [`QueryCache::insert_stamped`], which refuses the value if any tag
//! was invalidated in between.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::types::DbId;

/// A unit of data a cached read can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CacheTag {
    /// Thread list of a project (announcement + project threads).
    ProjectThreads(DbId),
    /// Direct threads owned by a GC user.
    DirectThreads(DbId),
    /// Every thread a trade profile participates in.
    TradeThreads(DbId),
    /// A single thread record.
    Thread(DbId),
    /// Messages of a thread.
    Messages(DbId),
    /// Trades linked to a project.
    ProjectTrades(DbId),
    /// A GC profile's rolodex.
    Rolodex(DbId),
    /// Invites sent by a GC profile.
    Invites(DbId),
    /// Projects mirrored from CompanyCam.
    CompanyCamProjects,
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTag::ProjectThreads(id) => write!(f, "project_threads:{id}"),
            CacheTag::DirectThreads(id) => write!(f, "direct_threads:{id}"),
            CacheTag::TradeThreads(id) => write!(f, "trade_threads:{id}"),
            CacheTag::Thread(id) => write!(f, "thread:{id}"),
            CacheTag::Messages(id) => write!(f, "messages:{id}"),
            CacheTag::ProjectTrades(id) => write!(f, "project_trades:{id}"),
            CacheTag::Rolodex(id) => write!(f, "rolodex:{id}"),
            CacheTag::Invites(id) => write!(f, "invites:{id}"),
            CacheTag::CompanyCamProjects => f.write_str("companycam_projects"),
        }
    }
}

/// The result of a mutation together with the cache tags it invalidates.
#[derive(Debug, Clone, Serialize)]
pub struct Mutation<T> {
    pub value: T,
    pub invalidates: Vec<CacheTag>,
}

impl<T> Mutation<T> {
    pub fn new(value: T, invalidates: Vec<CacheTag>) -> Self {
        let mut mutation = Self {
            value,
            invalidates: Vec::with_capacity(invalidates.len()),
        };
        mutation.extend_tags(invalidates);
        mutation
    }

    /// Add more affected tags, skipping duplicates.
    pub fn extend_tags(&mut self, tags: impl IntoIterator<Item = CacheTag>) {
        for tag in tags {
            if !self.invalidates.contains(&tag) {
                self.invalidates.push(tag);
            }
        }
    }

    /// Transform the value, keeping the tags.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Mutation<U> {
        Mutation {
            value: f(self.value),
            invalidates: self.invalidates,
        }
    }
}

struct CacheEntry<V> {
    value: V,
    tags: Vec<CacheTag>,
}

/// Tag generations observed before a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStamp {
    generations: Vec<(CacheTag, u64)>,
}

impl CacheStamp {
    pub fn tags(&self) -> impl Iterator<Item = CacheTag> + '_ {
        self.generations.iter().map(|(tag, _)| *tag)
    }
}

/// Outcome of [`QueryCache::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    Hit(V),
    /// Read the store, then hand the stamp to [`QueryCache::insert_stamped`].
    Miss(CacheStamp),
}

/// In-process query cache keyed by string, invalidated by [`CacheTag`].
///
/// Not internally synchronised; wrap it in a lock to share it.
pub struct QueryCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    dependents: HashMap<CacheTag, HashSet<String>>,
    generations: HashMap<CacheTag, u64>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            dependents: HashMap::new(),
            generations: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Current generations of `tags`.
    pub fn stamp(&self, tags: &[CacheTag]) -> CacheStamp {
        CacheStamp {
            generations: tags.iter().map(|tag| (*tag, self.generation(tag))).collect(),
        }
    }

    /// The cached value for `key`, or a stamp of `tags` for a later
    /// [`insert_stamped`](Self::insert_stamped).
    pub fn lookup(&self, key: &str, tags: &[CacheTag]) -> Lookup<V> {
        match self.get(key) {
            Some(value) => Lookup::Hit(value),
            None => Lookup::Miss(self.stamp(tags)),
        }
    }

    /// Store `value` under `key` with the stamp's tags unless one of them
    /// was invalidated after the stamp was taken. Returns whether the value
    /// was stored.
    pub fn insert_stamped(&mut self, key: impl Into<String>, value: V, stamp: CacheStamp) -> bool {
        if stamp
            .generations
            .iter()
            .any(|(tag, seen)| self.generation(tag) != *seen)
        {
            return false;
        }
        self.insert(key, value, stamp.tags().collect());
        true
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, value: V, tags: Vec<CacheTag>) {
        let key = key.into();
        self.remove(&key);
        for tag in &tags {
            self.dependents.entry(*tag).or_default().insert(key.clone());
        }
        self.entries.insert(key, CacheEntry { value, tags });
    }

    /// Drop every entry that depends on any of `tags`. Returns how many
    /// entries were removed.
    pub fn invalidate(&mut self, tags: &[CacheTag]) -> usize {
        for tag in tags {
            *self.generations.entry(*tag).or_insert(0) += 1;
        }
        let keys: HashSet<String> = tags
            .iter()
            .filter_map(|tag| self.dependents.get(tag))
            .flatten()
            .cloned()
            .collect();
        for key in &keys {
            self.remove(key);
        }
        keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn generation(&self, tag: &CacheTag) -> u64 {
        self.generations.get(tag).copied().unwrap_or(0)
    }

    fn remove(&mut self, key: &str) {
        let Some(entry) = self.entries.remove(key) else {
            return;
        };
        for tag in entry.tags {
            if let Some(keys) = self.dependents.get_mut(&tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.dependents.remove(&tag);
                }
            }
        }
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidating_a_tag_drops_dependents_only() {
        let mut cache = QueryCache::new();
        cache.insert("threads:1", 1, vec![CacheTag::ProjectThreads(1)]);
        cache.insert("threads:2", 2, vec![CacheTag::ProjectThreads(2)]);

        let removed = cache.invalidate(&[CacheTag::ProjectThreads(1)]);
        assert_eq!(removed, 1);
        assert_eq!(cache.get("threads:1"), None);
        assert_eq!(cache.get("threads:2"), Some(2));
    }

    #[test]
    fn entry_with_several_tags_is_dropped_by_any() {
        let mut cache = QueryCache::new();
        cache.insert(
            "direct:5",
            "list",
            vec![CacheTag::DirectThreads(5), CacheTag::Thread(40)],
        );
        assert_eq!(cache.invalidate(&[CacheTag::Thread(40)]), 1);
        assert!(cache.is_empty());
        // The other tag no longer points at anything.
        assert_eq!(cache.invalidate(&[CacheTag::DirectThreads(5)]), 0);
    }

    #[test]
    fn reinsert_replaces_previous_tags() {
        let mut cache = QueryCache::new();
        cache.insert("k", 1, vec![CacheTag::Messages(1)]);
        cache.insert("k", 2, vec![CacheTag::Messages(2)]);
        assert_eq!(cache.invalidate(&[CacheTag::Messages(1)]), 0);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn read_that_raced_an_invalidation_is_not_stored() {
        let mut cache: QueryCache<i32> = QueryCache::new();
        let Lookup::Miss(stamp) = cache.lookup("messages:7", &[CacheTag::Messages(7)]) else {
            panic!("empty cache must miss");
        };
        // A writer lands between the store read and the insert.
        cache.invalidate(&[CacheTag::Messages(7)]);

        assert!(!cache.insert_stamped("messages:7", 1, stamp));
        assert_eq!(cache.get("messages:7"), None);

        let stamp = cache.stamp(&[CacheTag::Messages(7)]);
        assert!(cache.insert_stamped("messages:7", 2, stamp));
        assert_eq!(
            cache.lookup("messages:7", &[CacheTag::Messages(7)]),
            Lookup::Hit(2)
        );
    }

    #[test]
    fn unrelated_invalidation_keeps_stamp_valid() {
        let mut cache: QueryCache<&str> = QueryCache::new();
        let stamp = cache.stamp(&[CacheTag::Rolodex(1)]);
        cache.invalidate(&[CacheTag::Rolodex(2), CacheTag::Messages(1)]);
        assert!(cache.insert_stamped("rolodex:1", "list", stamp));
        assert_eq!(cache.invalidate(&[CacheTag::Rolodex(1)]), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn mutation_deduplicates_tags() {
        let mut mutation = Mutation::new((), vec![CacheTag::Thread(1), CacheTag::Thread(1)]);
        mutation.extend_tags([CacheTag::Messages(1), CacheTag::Thread(1)]);
        assert_eq!(
            mutation.invalidates,
            vec![CacheTag::Thread(1), CacheTag::Messages(1)]
        );
    }

    #[test]
    fn tag_display_and_serialization() {
        assert_eq!(CacheTag::ProjectThreads(3).to_string(), "project_threads:3");
        let json = serde_json::to_value(CacheTag::Rolodex(9)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "rolodex", "id": 9}));
        let json = serde_json::to_value(CacheTag::CompanyCamProjects).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "company_cam_projects"}));
    }
}
