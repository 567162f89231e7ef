use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use voxcraft_core::ChunkId;

use crate::chunk::Chunk;

/// Bounded cache of live chunks, evicting the least recently used entry.
///
/// The lock covers only the bookkeeping of a single call; loading a missing
/// chunk happens outside it.
pub struct ChunkMap {
    chunks: Mutex<LruCache<ChunkId, Arc<Chunk>>>,
}

impl ChunkMap {
    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            chunks: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a chunk and mark it most recently used.
    pub fn get(&self, id: ChunkId) -> Option<Arc<Chunk>> {
        self.chunks.lock().get(&id).cloned()
    }

    /// Look up a chunk without touching its recency.
    pub fn peek(&self, id: ChunkId) -> Option<Arc<Chunk>> {
        self.chunks.lock().peek(&id).cloned()
    }

    /// Insert a freshly loaded chunk and return the resident instance.
    ///
    /// If another caller inserted the same id in the meantime, that chunk is
    /// kept and returned so there is only ever one live chunk per id.
    /// Otherwise the new chunk is admitted only if `current` returns true;
    /// `current` runs under the cache lock. Returns `None` on rejection.
    pub fn insert_if(&self, chunk: Chunk, current: impl FnOnce() -> bool) -> Option<Arc<Chunk>> {
        let id = chunk.id();
        let mut chunks = self.chunks.lock();
        if let Some(existing) = chunks.get(&id) {
            return Some(existing.clone());
        }
        if !current() {
            return None;
        }
        let chunk = Arc::new(chunk);
        if let Some((evicted, _)) = chunks.push(id, chunk.clone()) {
            log::debug!("evicted chunk {evicted}");
        }
        Some(chunk)
    }

    /// Number of resident chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.chunks.lock().cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(map: &ChunkMap, id: ChunkId) -> Arc<Chunk> {
        map.insert_if(Chunk::new(id), || true).expect("admitted")
    }

    #[test]
    fn test_insert_and_get() {
        let map = ChunkMap::with_capacity(4);
        let id = ChunkId::new(1, 0, 1);
        assert!(map.get(id).is_none());
        load(&map, id);
        assert_eq!(map.get(id).expect("resident").id(), id);
        assert_eq!(map.loaded_count(), 1);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let map = ChunkMap::with_capacity(2);
        let a = ChunkId::new(0, 0, 0);
        let b = ChunkId::new(1, 0, 0);
        let c = ChunkId::new(2, 0, 0);
        load(&map, a);
        load(&map, b);
        // Touch a so b becomes the eviction candidate.
        map.get(a);
        load(&map, c);

        assert!(map.peek(a).is_some());
        assert!(map.peek(b).is_none(), "least recently used chunk should be evicted");
        assert!(map.peek(c).is_some());
        assert_eq!(map.loaded_count(), 2);
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let map = ChunkMap::with_capacity(2);
        let a = ChunkId::new(0, 0, 0);
        let b = ChunkId::new(0, 0, 1);
        load(&map, a);
        load(&map, b);
        assert!(map.peek(a).is_some());
        load(&map, ChunkId::new(0, 0, 2));
        assert!(map.peek(a).is_none(), "peek must not protect a from eviction");
    }

    #[test]
    fn test_duplicate_insert_keeps_first() {
        let map = ChunkMap::with_capacity(4);
        let id = ChunkId::new(3, 0, 3);
        let first = load(&map, id);
        let second = load(&map, id);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(map.loaded_count(), 1);
    }

    #[test]
    fn test_rejected_insert_leaves_map_untouched() {
        let map = ChunkMap::with_capacity(4);
        let id = ChunkId::new(0, 1, 0);
        assert!(map.insert_if(Chunk::new(id), || false).is_none());
        assert_eq!(map.loaded_count(), 0);

        // A resident chunk is returned even when the new one would be rejected.
        let resident = load(&map, id);
        let again = map.insert_if(Chunk::new(id), || false).expect("resident");
        assert!(Arc::ptr_eq(&resident, &again));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let map = ChunkMap::with_capacity(0);
        assert_eq!(map.capacity(), 1);
        load(&map, ChunkId::new(0, 0, 0));
        load(&map, ChunkId::new(1, 0, 0));
        assert_eq!(map.loaded_count(), 1);
    }
}
