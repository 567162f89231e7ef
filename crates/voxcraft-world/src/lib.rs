pub mod chunk;
pub mod chunk_map;
pub mod config;
pub mod error;
pub mod noise;
pub mod query;
pub mod terrain;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chunk::Chunk;
use chunk_map::ChunkMap;
use parking_lot::Mutex;
use rayon::prelude::*;
use terrain::TerrainGenerator;
use voxcraft_core::{BlockId, BlockType, ChunkId};
use voxcraft_persist::{ChunkRecord, ChunkStore, PersistError};

pub use config::{WorldConfig, MAX_RENDER_RADIUS};
pub use error::WorldError;
pub use query::RayHit;

/// The live world: an LRU cache of chunks in front of the terrain generator
/// and a persistent chunk store.
///
/// All methods take `&self`; the world is meant to be shared behind an `Arc`
/// between a loader thread and the per-frame query loop.
pub struct World {
    chunks: ChunkMap,
    terrain: TerrainGenerator,
    store: Arc<dyn ChunkStore>,
    /// Held across mutate, snapshot and store write in `set_block`.
    writes: Mutex<()>,
    /// Bumped after every store write. A chunk loaded from a store read that
    /// predates a write is not admitted to the cache.
    epoch: AtomicU64,
}

impl World {
    /// Create a world whose cache is sized from `config`.
    pub fn new(store: Arc<dyn ChunkStore>, config: &WorldConfig) -> Self {
        Self::with_capacity(store, config.cache_capacity())
    }

    pub fn with_capacity(store: Arc<dyn ChunkStore>, capacity: usize) -> Self {
        Self {
            chunks: ChunkMap::with_capacity(capacity),
            terrain: TerrainGenerator::default(),
            store,
            writes: Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Fetch a chunk, hydrating it on a cache miss.
    ///
    /// Hydration seeds the grid with generator output and replays the stored
    /// record on top. Returns `None` if the store could not be read.
    ///
    /// # Panics
    /// Panics if the stored record for `id` is malformed.
    pub fn chunk(&self, id: ChunkId) -> Option<Arc<Chunk>> {
        loop {
            if let Some(chunk) = self.chunks.get(id) {
                return Some(chunk);
            }
            let seen = self.epoch.load(Ordering::SeqCst);
            let chunk = match self.hydrate(id) {
                Ok(chunk) => chunk,
                Err(err) if err.is_corruption() => {
                    panic!("corrupt record for chunk {id}: {err}")
                }
                Err(err) => {
                    log::error!("fetch chunk {id} from store: {err}");
                    return None;
                }
            };
            let current = || self.epoch.load(Ordering::SeqCst) == seen;
            if let Some(chunk) = self.chunks.insert_if(chunk, current) {
                return Some(chunk);
            }
            log::debug!("store written while loading chunk {id}, reloading");
        }
    }

    /// Fetch many chunks concurrently. Chunks that fail to load are omitted
    /// and the result order is unspecified.
    pub fn chunks(&self, ids: &[ChunkId]) -> Vec<Arc<Chunk>> {
        ids.par_iter().filter_map(|&id| self.chunk(id)).collect()
    }

    fn hydrate(&self, id: ChunkId) -> Result<Chunk, PersistError> {
        let record = self.store.chunk_blocks(id)?;

        let chunk = Chunk::new(id);
        for (block, block_type) in self.terrain.generate(id) {
            chunk.add(block, block_type);
        }

        match record {
            None => {}
            Some(ChunkRecord::Empty) => {
                if chunk.is_allocated() {
                    let mut generated = Vec::new();
                    chunk.for_each_block(|block, _| generated.push(block));
                    for block in generated {
                        chunk.delete(block);
                    }
                }
            }
            Some(ChunkRecord::Blocks(blocks)) => {
                for (index, &block_type) in blocks.iter().enumerate() {
                    let block = id.block_at_index(index);
                    if !block_type.is_empty() {
                        chunk.add(block, block_type);
                    } else if !chunk.get(block).is_empty() {
                        chunk.delete(block);
                    }
                }
            }
        }
        log::trace!("hydrated chunk {id} ({} blocks)", chunk.block_count());
        Ok(chunk)
    }

    /// Block type at `block`, looking only at resident chunks.
    ///
    /// A block in a chunk that is not cached reads as air; this never
    /// triggers generation.
    pub fn block(&self, block: BlockId) -> BlockType {
        match self.block_chunk(block) {
            Some(chunk) => chunk.get(block),
            None => BlockType::AIR,
        }
    }

    /// Resident chunk owning `block`, if any.
    pub fn block_chunk(&self, block: BlockId) -> Option<Arc<Chunk>> {
        self.chunks.get(block.chunk_id())
    }

    pub fn has_block(&self, block: BlockId) -> bool {
        !self.block(block).is_empty()
    }

    /// Place or clear a block and write the owning chunk through to the store.
    ///
    /// Writing air removes whatever is there.
    ///
    /// Writers are serialized, so the store always receives snapshots in the
    /// order the edits were made.
    pub fn set_block(&self, block: BlockId, block_type: BlockType) -> Result<(), WorldError> {
        let _writing = self.writes.lock();
        let id = block.chunk_id();
        let chunk = self.chunk(id).ok_or(WorldError::ChunkUnavailable(id))?;
        apply(&chunk, block, block_type);
        let snapshot = chunk.snapshot();
        self.store.put_chunk(id, snapshot.as_deref())?;
        self.epoch.fetch_add(1, Ordering::SeqCst);

        // The chunk may have been evicted and reloaded from the old record
        // while the write was in flight.
        if let Some(resident) = self.chunks.peek(id) {
            if !Arc::ptr_eq(&resident, &chunk) {
                apply(&resident, block, block_type);
            }
        }
        Ok(())
    }

    /// Chunk ids in a horizontal square of `radius` chunks around `center`,
    /// on the centre's vertical layer. Nearest rings come first. The radius is
    /// clamped to [`MAX_RENDER_RADIUS`].
    pub fn chunks_around(center: ChunkId, radius: u32) -> Vec<ChunkId> {
        let radius = radius.min(MAX_RENDER_RADIUS) as i32;
        let side = (2 * radius + 1) as usize;
        let mut ids = Vec::with_capacity(side * side);
        for ring in 0..=radius {
            for dx in -ring..=ring {
                for dz in -ring..=ring {
                    if dx.abs().max(dz.abs()) == ring {
                        ids.push(ChunkId::new(center.x + dx, center.y, center.z + dz));
                    }
                }
            }
        }
        ids
    }

    pub fn cached_chunk_count(&self) -> usize {
        self.chunks.loaded_count()
    }

    pub fn capacity(&self) -> usize {
        self.chunks.capacity()
    }

    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }
}

fn apply(chunk: &Chunk, block: BlockId, block_type: BlockType) {
    if block_type.is_empty() {
        if chunk.is_allocated() {
            chunk.delete(block);
        }
    } else {
        chunk.add(block, block_type);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::{OnceLock, Weak};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use voxcraft_persist::{MemoryStore, Store};

    fn memory_world(capacity: usize) -> (Arc<MemoryStore>, World) {
        let store = Arc::new(MemoryStore::new());
        let world = World::with_capacity(store.clone(), capacity);
        (store, world)
    }

    struct FailingStore;

    impl ChunkStore for FailingStore {
        fn chunk_blocks(&self, _id: ChunkId) -> Result<Option<ChunkRecord>, PersistError> {
            Err(PersistError::Storage(redb::StorageError::Io(std::io::Error::other(
                "disk unplugged",
            ))))
        }

        fn put_chunk(&self, _id: ChunkId, _blocks: Option<&[BlockType]>) -> Result<(), PersistError> {
            Ok(())
        }
    }

    struct CorruptStore;

    impl ChunkStore for CorruptStore {
        fn chunk_blocks(&self, _id: ChunkId) -> Result<Option<ChunkRecord>, PersistError> {
            Err(PersistError::InvalidChunkSize {
                expected: 65537,
                actual: 3,
            })
        }

        fn put_chunk(&self, _id: ChunkId, _blocks: Option<&[BlockType]>) -> Result<(), PersistError> {
            Ok(())
        }
    }

    #[test]
    fn test_fresh_chunk_matches_generator() {
        let (_, world) = memory_world(8);
        let id = ChunkId::new(1, 0, 1);
        let chunk = world.chunk(id).expect("chunk");
        let generated = world.terrain().generate(id);

        assert_eq!(chunk.block_count(), generated.len());
        for (block, block_type) in &generated {
            assert_eq!(chunk.get(*block), *block_type, "mismatch at {block}");
        }
    }

    #[test]
    fn test_cache_hit_returns_same_chunk() {
        let (_, world) = memory_world(8);
        let id = ChunkId::new(0, 0, 0);
        let first = world.chunk(id).expect("chunk");
        let second = world.chunk(id).expect("chunk");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(world.cached_chunk_count(), 1);
    }

    #[test]
    fn test_stored_cells_override_generator() {
        let (store, world) = memory_world(8);
        // Chunk (0,0,0) always has ground at y = 0 and open air at y = 31.
        store.add(BlockId::new(3, 0, 3), BlockType::AIR).expect("store add");
        store.add(BlockId::new(3, 31, 3), BlockType::GLASS).expect("store add");

        let chunk = world.chunk(ChunkId::new(0, 0, 0)).expect("chunk");
        assert_eq!(chunk.get(BlockId::new(3, 0, 3)), BlockType::AIR);
        assert_eq!(chunk.get(BlockId::new(3, 31, 3)), BlockType::GLASS);
        // The stored grid covers every cell, so nothing generated survives.
        assert_eq!(chunk.block_count(), 1);
    }

    #[test]
    fn test_empty_record_clears_generated_blocks() {
        let (store, world) = memory_world(8);
        let id = ChunkId::new(0, 0, 0);
        store.put_chunk(id, None).expect("put");

        let chunk = world.chunk(id).expect("chunk");
        assert_eq!(chunk.block_count(), 0);
        assert!(!world.has_block(BlockId::new(0, 0, 0)));
    }

    #[test]
    fn test_edit_survives_eviction() {
        let (_, world) = memory_world(1);
        let ground = BlockId::new(5, 0, 5);
        let id = ground.chunk_id();
        world.chunk(id).expect("chunk");
        assert!(world.has_block(ground), "bedrock layer should be generated");

        world.set_block(ground, BlockType::AIR).expect("set");
        assert!(!world.has_block(ground));

        // Loading a second chunk evicts the first.
        world.chunk(ChunkId::new(1, 0, 0)).expect("chunk");
        assert_eq!(world.cached_chunk_count(), 1);
        assert_eq!(world.block(ground), BlockType::AIR, "evicted chunk reads as air");

        let reloaded = world.chunk(id).expect("chunk");
        assert_eq!(reloaded.get(ground), BlockType::AIR, "deletion should be replayed");
    }

    #[test]
    fn test_set_block_writes_through_durable_store() {
        let store = Arc::new(Store::in_memory().expect("store"));
        let world = World::with_capacity(store.clone(), 4);
        let block = BlockId::new(-7, 40, 12);
        world.set_block(block, BlockType::WOOD).expect("set");
        assert_eq!(world.block(block), BlockType::WOOD);

        let record = store.chunk_blocks(block.chunk_id()).expect("read").expect("record");
        assert_eq!(record.get(block.index()), BlockType::WOOD);
    }

    #[test]
    fn test_clearing_air_chunk_writes_empty_record() {
        let (store, world) = memory_world(4);
        // y = 200 is above every generated feature.
        let block = BlockId::new(0, 200, 0);
        world.set_block(block, BlockType::AIR).expect("set");
        let record = store.chunk_blocks(block.chunk_id()).expect("read");
        assert_eq!(record, Some(ChunkRecord::Empty));
    }

    #[test]
    fn test_block_is_cache_only() {
        let (_, world) = memory_world(4);
        let block = BlockId::new(0, 0, 0);
        assert_eq!(world.block(block), BlockType::AIR);
        assert_eq!(world.cached_chunk_count(), 0, "lookup must not hydrate");
        world.chunk(block.chunk_id()).expect("chunk");
        assert!(world.has_block(block));
    }

    #[test]
    fn test_chunks_fan_out() {
        let (_, world) = memory_world(64);
        let ids = World::chunks_around(ChunkId::new(0, 0, 0), 2);
        let chunks = world.chunks(&ids);
        assert_eq!(chunks.len(), ids.len());

        let mut loaded: Vec<ChunkId> = chunks.iter().map(|c| c.id()).collect();
        loaded.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(loaded, expected);

        let again = world.chunk(ids[0]).expect("chunk");
        let original = chunks.iter().find(|c| c.id() == ids[0]).expect("present");
        assert!(Arc::ptr_eq(&again, original));
    }

    #[test]
    fn test_chunks_around_layout() {
        let center = ChunkId::new(4, -1, 2);
        let ids = World::chunks_around(center, 1);
        assert_eq!(ids.len(), 9);
        assert_eq!(ids[0], center, "centre comes first");
        assert!(ids.iter().all(|id| id.y == -1));
        assert_eq!(World::chunks_around(center, 0), vec![center]);
    }

    #[test]
    fn test_store_failure_reads_as_absent() {
        let world = World::with_capacity(Arc::new(FailingStore), 4);
        assert!(world.chunk(ChunkId::new(0, 0, 0)).is_none());
        assert!(world.chunks(&[ChunkId::new(0, 0, 0), ChunkId::new(1, 0, 0)]).is_empty());
        assert_eq!(world.cached_chunk_count(), 0);

        let err = world
            .set_block(BlockId::new(0, 0, 0), BlockType::GRASS)
            .expect_err("chunk cannot load");
        assert!(matches!(err, WorldError::ChunkUnavailable(_)));
    }

    #[test]
    #[should_panic(expected = "corrupt record")]
    fn test_corrupt_record_panics() {
        let world = World::with_capacity(Arc::new(CorruptStore), 4);
        world.chunk(ChunkId::new(0, 0, 0));
    }

    #[test]
    fn test_capacity_from_config() {
        let config = WorldConfig {
            render_radius: 2,
            cache_scale: 4,
        };
        let world = World::new(Arc::new(MemoryStore::new()), &config);
        assert_eq!(world.capacity(), 32);
    }

    /// Stalls the first chunk write so a second writer can overtake it.
    #[derive(Default)]
    struct StallingStore {
        inner: MemoryStore,
        stalled: AtomicBool,
    }

    impl ChunkStore for StallingStore {
        fn chunk_blocks(&self, id: ChunkId) -> Result<Option<ChunkRecord>, PersistError> {
            self.inner.chunk_blocks(id)
        }

        fn put_chunk(&self, id: ChunkId, blocks: Option<&[BlockType]>) -> Result<(), PersistError> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(300));
            }
            self.inner.put_chunk(id, blocks)
        }
    }

    /// On its first write, evicts the written chunk and reloads it from the
    /// record that is about to be replaced.
    #[derive(Default)]
    struct ReloadingStore {
        inner: MemoryStore,
        world: OnceLock<Weak<World>>,
        fired: AtomicBool,
    }

    impl ChunkStore for ReloadingStore {
        fn chunk_blocks(&self, id: ChunkId) -> Result<Option<ChunkRecord>, PersistError> {
            self.inner.chunk_blocks(id)
        }

        fn put_chunk(&self, id: ChunkId, blocks: Option<&[BlockType]>) -> Result<(), PersistError> {
            if !self.fired.swap(true, Ordering::SeqCst) {
                if let Some(world) = self.world.get().and_then(Weak::upgrade) {
                    world.chunk(ChunkId::new(id.x + 1, id.y, id.z)).expect("neighbour");
                    world.chunk(id).expect("reloaded");
                }
            }
            self.inner.put_chunk(id, blocks)
        }
    }

    #[test]
    fn test_concurrent_writes_to_one_chunk_all_persist() {
        let store = Arc::new(StallingStore::default());
        let world = World::with_capacity(store.clone(), 4);
        let a = BlockId::new(1, 200, 1);
        let b = BlockId::new(2, 200, 2);

        thread::scope(|s| {
            s.spawn(|| world.set_block(a, BlockType::WOOD).expect("set a"));
            s.spawn(|| {
                thread::sleep(Duration::from_millis(100));
                world.set_block(b, BlockType::WOOD).expect("set b");
            });
        });

        let record = store.chunk_blocks(a.chunk_id()).expect("read").expect("record");
        assert_eq!(record.get(a.index()), BlockType::WOOD);
        assert_eq!(record.get(b.index()), BlockType::WOOD, "later edit must not be overwritten");

        let reloaded = World::with_capacity(store.clone(), 4);
        let chunk = reloaded.chunk(a.chunk_id()).expect("chunk");
        assert_eq!(chunk.get(a), BlockType::WOOD);
        assert_eq!(chunk.get(b), BlockType::WOOD);
    }

    #[test]
    fn test_write_reaches_chunk_reloaded_mid_write() {
        let store = Arc::new(ReloadingStore::default());
        let world = Arc::new(World::with_capacity(store.clone(), 1));
        store
            .world
            .set(Arc::downgrade(&world))
            .expect("world registered once");

        let block = BlockId::new(3, 200, 3);
        let before = world.chunk(block.chunk_id()).expect("chunk");
        world.set_block(block, BlockType::GLASS).expect("set");

        let resident = world.block_chunk(block).expect("resident");
        assert!(!Arc::ptr_eq(&before, &resident), "chunk should have been reloaded");
        assert_eq!(world.block(block), BlockType::GLASS);
        assert_eq!(
            store.chunk_blocks(block.chunk_id()).expect("read").expect("record").get(block.index()),
            BlockType::GLASS
        );
    }

    #[test]
    fn test_concurrent_fetch_shares_one_chunk() {
        let (_, world) = memory_world(8);
        let id = ChunkId::new(2, 0, -1);

        let fanned = world.chunks(&[id; 8]);
        assert_eq!(fanned.len(), 8);

        let threaded: Vec<Arc<Chunk>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| world.chunk(id).expect("chunk"))).collect();
            handles.into_iter().map(|h| h.join().expect("join")).collect()
        });

        let first = &fanned[0];
        for chunk in fanned.iter().chain(&threaded) {
            assert!(Arc::ptr_eq(first, chunk), "every fetch must see the resident chunk");
        }
        assert_eq!(world.cached_chunk_count(), 1);
    }
}
