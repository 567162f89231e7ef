use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use voxcraft_core::constants::{BLOCKS_PER_CHUNK, CHUNK_WIDTH};
use voxcraft_core::{BlockId, BlockType, ChunkId};

/// One chunk's block grid.
///
/// The grid is allocated on the first non-empty write; an all-air chunk owns
/// no array. Every access takes the grid lock for that single call only.
pub struct Chunk {
    id: ChunkId,
    blocks: Mutex<Option<Box<[BlockType]>>>,
    /// Wall-clock derived, strictly increasing on every add/delete.
    version: AtomicI64,
}

impl Chunk {
    /// Create an empty chunk. The initial version is the current unix second.
    pub fn new(id: ChunkId) -> Self {
        Self {
            id,
            blocks: Mutex::new(None),
            version: AtomicI64::new(unix_millis() / 1000),
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// Current version. Consumers compare it against the version they last
    /// built from to detect staleness.
    pub fn version(&self) -> i64 {
        self.version.load(Ordering::Acquire)
    }

    /// Whether the grid has been allocated.
    pub fn is_allocated(&self) -> bool {
        self.blocks.lock().is_some()
    }

    /// Block at `block`; air if the grid is unallocated.
    ///
    /// # Panics
    /// Panics if `block` does not belong to this chunk.
    pub fn get(&self, block: BlockId) -> BlockType {
        self.check_owner(block);
        let blocks = self.blocks.lock();
        match blocks.as_deref() {
            Some(grid) => grid[block.index()],
            None => BlockType::AIR,
        }
    }

    /// Write a block. Writing air into an unallocated chunk does nothing.
    ///
    /// # Panics
    /// Panics if `block` does not belong to this chunk.
    pub fn add(&self, block: BlockId, block_type: BlockType) {
        self.check_owner(block);
        let mut blocks = self.blocks.lock();
        if blocks.is_none() && block_type.is_empty() {
            return;
        }
        let grid = blocks.get_or_insert_with(|| vec![BlockType::AIR; BLOCKS_PER_CHUNK].into_boxed_slice());
        grid[block.index()] = block_type;
        self.bump_version();
    }

    /// Clear a block back to air.
    ///
    /// # Panics
    /// Panics if `block` does not belong to this chunk, or if the chunk has
    /// never held a block (nothing can have been there to delete).
    pub fn delete(&self, block: BlockId) {
        self.check_owner(block);
        let mut blocks = self.blocks.lock();
        let Some(grid) = blocks.as_deref_mut() else {
            panic!("delete {block} from chunk {} with no blocks", self.id);
        };
        grid[block.index()] = BlockType::AIR;
        self.bump_version();
    }

    /// Visit every non-empty block in z, y, x nesting order.
    ///
    /// The lock is taken per cell and released before `visit` runs, so the
    /// visitor may call back into this chunk.
    pub fn for_each_block(&self, mut visit: impl FnMut(BlockId, BlockType)) {
        if !self.is_allocated() {
            return;
        }
        let origin = self.id.origin();
        for z in 0..CHUNK_WIDTH {
            for y in 0..CHUNK_WIDTH {
                for x in 0..CHUNK_WIDTH {
                    let block = BlockId::new(origin.x + x, origin.y + y, origin.z + z);
                    let block_type = self
                        .blocks
                        .lock()
                        .as_deref()
                        .map_or(BlockType::AIR, |grid| grid[block.index()]);
                    if !block_type.is_empty() {
                        visit(block, block_type);
                    }
                }
            }
        }
    }

    /// Copy of the grid, or `None` while unallocated.
    pub fn snapshot(&self) -> Option<Vec<BlockType>> {
        self.blocks.lock().as_deref().map(<[BlockType]>::to_vec)
    }

    /// Number of non-empty cells.
    pub fn block_count(&self) -> usize {
        self.blocks
            .lock()
            .as_deref()
            .map_or(0, |grid| grid.iter().filter(|b| !b.is_empty()).count())
    }

    fn check_owner(&self, block: BlockId) {
        if block.chunk_id() != self.id {
            panic!("block {block} does not belong to chunk {}", self.id);
        }
    }

    fn bump_version(&self) {
        let now = unix_millis();
        // The closure always returns Some, so the update cannot fail.
        let _ = self
            .version
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| {
                Some(now.max(prev + 1))
            });
    }
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}
