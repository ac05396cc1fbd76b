//! Bounded memoization for [`crate::kernel::se_evaluate`] (spec §9: "the SE
//! kernel may be memoized by `(nodes_id, satellite_id, start_time)`").
//!
//! Grounded on the teacher's `solver::tabu_search` neighbor/insertion cache,
//! which also keys a plain `HashMap` by a tuple of (route identity, a
//! version/position stamp) rather than pulling in a dedicated LRU crate.
//! This cache additionally bounds its size with a FIFO eviction queue, since
//! unlike the teacher's per-iteration cache it is expected to live for a
//! whole ALNS run.

use std::collections::{HashMap, VecDeque};

use crate::domain::{NodeId, SERouteData};

type CacheKey = (Vec<NodeId>, NodeId, u64);

/// Caches `se_evaluate` results. `start_time` is folded into the key via its
/// raw bit pattern: route construction always derives start times
/// deterministically from prior schedule state, so repeated lookups for the
/// same logical situation produce bit-identical `f64`s.
pub struct SeEvalCache {
    capacity: usize,
    entries: HashMap<CacheKey, Option<SERouteData>>,
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

impl SeEvalCache {
    pub fn new(capacity: usize) -> Self {
        SeEvalCache {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    fn key(nodes_id: &[NodeId], satellite_id: NodeId, start_time: f64) -> CacheKey {
        (nodes_id.to_vec(), satellite_id, start_time.to_bits())
    }

    pub fn get(
        &mut self,
        nodes_id: &[NodeId],
        satellite_id: NodeId,
        start_time: f64,
    ) -> Option<&Option<SERouteData>> {
        let key = Self::key(nodes_id, satellite_id, start_time);
        if let Some(entry) = self.entries.get(&key) {
            self.hits += 1;
            return Some(entry);
        }
        self.misses += 1;
        None
    }

    pub fn insert(
        &mut self,
        nodes_id: &[NodeId],
        satellite_id: NodeId,
        start_time: f64,
        result: Option<SERouteData>,
    ) {
        let key = Self::key(nodes_id, satellite_id, start_time);
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) {
            if self.entries.len() >= self.capacity {
                if let Some(evict) = self.order.pop_front() {
                    self.entries.remove(&evict);
                }
            }
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, result);
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_entry_past_capacity() {
        let mut cache = SeEvalCache::new(2);
        cache.insert(&[1, 2], 1, 0.0, None);
        cache.insert(&[1, 3], 1, 0.0, None);
        cache.insert(&[1, 4], 1, 0.0, None);
        assert!(cache.get(&[1, 2], 1, 0.0).is_none());
        assert!(cache.get(&[1, 4], 1, 0.0).is_some());
    }

    #[test]
    fn tracks_hit_rate() {
        let mut cache = SeEvalCache::new(4);
        cache.insert(&[1, 2], 1, 0.0, None);
        let _ = cache.get(&[1, 2], 1, 0.0);
        let _ = cache.get(&[1, 3], 1, 0.0);
        assert!((cache.hit_rate() - 0.5).abs() < 1e-9);
    }
}
