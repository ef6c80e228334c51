use std::collections::HashMap;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::allocation::{AllocationResult, Pattern};
use crate::parser::SeatingInput;

/// Content address of an uploaded payload
pub fn fingerprint(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub input: SeatingInput,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Allocations already computed for this upload, per pattern
    pub results: HashMap<Pattern, AllocationResult>,
}

/// Parsed uploads keyed by fingerprint, with expiry and a size bound
#[derive(Debug)]
pub struct UploadCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl UploadCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        UploadCache {
            entries: HashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry whose expiry has passed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        let purged = before - self.entries.len();
        if purged > 0 {
            log::info!("Purged {} expired uploads", purged);
        }
        purged
    }

    /// Stores an upload and returns its expiry. Re-uploading the same content refreshes
    /// the expiry and keeps computed results.
    pub fn insert(&mut self, key: String, input: SeatingInput, now: DateTime<Utc>) -> DateTime<Utc> {
        self.purge_expired(now);
        let expires_at = now + self.ttl;

        if let Some(existing) = self.entries.get_mut(&key) {
            existing.expires_at = expires_at;
            return expires_at;
        }

        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.created_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    log::info!("Evicting upload {} to make room", k);
                    self.entries.remove(&k);
                }
                None => break,
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                input,
                created_at: now,
                expires_at,
                results: HashMap::new(),
            },
        );
        expires_at
    }

    /// Looks up a live entry
    pub fn get_mut(&mut self, key: &str, now: DateTime<Utc>) -> Option<&mut CacheEntry> {
        self.purge_expired(now);
        self.entries.get_mut(key)
    }

    /// Returns the allocation for an upload and pattern, computing it at most once
    pub fn allocation<F>(
        &mut self,
        key: &str,
        pattern: Pattern,
        now: DateTime<Utc>,
        compute: F,
    ) -> Option<AllocationResult>
    where
        F: FnOnce(&SeatingInput) -> AllocationResult,
    {
        let entry = self.get_mut(key, now)?;
        if let Some(done) = entry.results.get(&pattern) {
            return Some(done.clone());
        }
        let result = compute(&entry.input);
        entry.results.insert(pattern, result.clone());
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{allocate, CandidatePair, RoomDescriptor};
    use chrono::TimeZone;

    fn input(n: u64) -> SeatingInput {
        SeatingInput {
            students: (0..n).map(|i| CandidatePair::single(&format!("{} CSE", i), i)).collect(),
            rooms: vec![RoomDescriptor::new("R1", 1, 1)],
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_fingerprint_is_content_addressed() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_entries_expire() {
        let mut cache = UploadCache::new(Duration::minutes(10), 8);
        cache.insert("k".into(), input(1), t0());
        assert!(cache.get_mut("k", t0() + Duration::minutes(9)).is_some());
        assert!(cache.get_mut("k", t0() + Duration::minutes(10)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache = UploadCache::new(Duration::minutes(60), 2);
        cache.insert("a".into(), input(1), t0());
        cache.insert("b".into(), input(2), t0() + Duration::minutes(1));
        cache.insert("c".into(), input(3), t0() + Duration::minutes(2));
        let now = t0() + Duration::minutes(3);
        assert_eq!(cache.len(), 2);
        assert!(cache.get_mut("a", now).is_none());
        assert!(cache.get_mut("b", now).is_some());
        assert!(cache.get_mut("c", now).is_some());
    }

    #[test]
    fn test_allocation_computed_once_per_pattern() {
        let mut cache = UploadCache::new(Duration::minutes(60), 4);
        cache.insert("k".into(), input(3), t0());
        let mut calls = 0;
        for _ in 0..3 {
            let result = cache
                .allocation("k", Pattern::Snake, t0(), |i| {
                    calls += 1;
                    allocate(&i.students, &i.rooms, "snake")
                })
                .unwrap();
            assert_eq!(result.total_assigned(), 2);
        }
        assert_eq!(calls, 1);
        assert!(cache.allocation("missing", Pattern::Snake, t0(), |_| unreachable!()).is_none());
    }
}
