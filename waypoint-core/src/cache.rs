//! Memoization capability for routing lookups.
//!
//! The routing client consults a [`RoutingCache`] before each backend call
//! and stores successful results afterwards. Storage, eviction and
//! persistence belong to the implementation; the client only needs `get`
//! and `put`.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{CostMatrix, Operation, RouteGeometry};

/// Identifies one memoizable lookup.
///
/// `request` is the fully qualified backend URL, which captures every
/// parameter the result depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Operation that produced the value.
    pub operation: Operation,
    /// Backend request the value answers.
    pub request: String,
}

impl CacheKey {
    /// Build a key for `operation` answering `request`.
    #[must_use]
    pub fn new(operation: Operation, request: impl Into<String>) -> Self {
        Self {
            operation,
            request: request.into(),
        }
    }
}

/// A memoized routing result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// A cost matrix.
    Matrix(CostMatrix),
    /// A single travel time or distance.
    Cost(u64),
    /// A reverse-geocoded address.
    Address(String),
    /// A route geometry.
    Route(RouteGeometry),
}

/// Key-value lookup consulted around routing operations.
///
/// Implementations must be safe to share between concurrent matrix blocks.
pub trait RoutingCache: Send + Sync {
    /// Return the value stored for `key`, if any.
    fn get(&self, key: &CacheKey) -> Option<CachedValue>;

    /// Store `value` for `key`.
    fn put(&self, key: CacheKey, value: CachedValue);
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl RoutingCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<CachedValue> {
        None
    }

    fn put(&self, _key: CacheKey, _value: CachedValue) {}
}

/// Unbounded in-process cache.
///
/// Entries live as long as the cache. Intended for tests and short-lived
/// processes.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, CachedValue>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RoutingCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: CacheKey, value: CachedValue) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn memory_cache_round_trips_values() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(Operation::TravelTime, "http://osrm/route/v1/driving/0,0;1,1");
        cache.put(key.clone(), CachedValue::Cost(42));

        assert_eq!(cache.get(&key), Some(CachedValue::Cost(42)));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn keys_distinguish_operations() {
        let cache = MemoryCache::new();
        let url = "http://osrm/route/v1/driving/0,0;1,1";
        cache.put(CacheKey::new(Operation::TravelTime, url), CachedValue::Cost(1));

        assert_eq!(cache.get(&CacheKey::new(Operation::TravelDistance, url)), None);
    }

    #[rstest]
    fn no_cache_forgets_everything() {
        let key = CacheKey::new(Operation::ReverseGeocode, "http://osrm/nearest");
        NoCache.put(key.clone(), CachedValue::Address("Main St".into()));
        assert_eq!(NoCache.get(&key), None);
    }
}
