use std::collections::HashMap;

use parking_lot::Mutex;
use voxcraft_core::constants::BLOCKS_PER_CHUNK;
use voxcraft_core::{BlockId, BlockType, ChunkId};

use crate::error::PersistError;
use crate::format::{self, ChunkRecord};
use crate::store::ChunkStore;

/// Non-durable [`ChunkStore`] keeping encoded records in a map.
///
/// Records go through the same codecs as [`crate::Store`], so anything that
/// round-trips here round-trips on disk.
#[derive(Default)]
pub struct MemoryStore {
    chunks: Mutex<HashMap<ChunkId, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one block inside the persisted record of its chunk, creating an
    /// all-air grid if the chunk has no record yet.
    pub fn add(&self, block: BlockId, block_type: BlockType) -> Result<(), PersistError> {
        let id = block.chunk_id();
        let mut chunks = self.chunks.lock();
        let mut grid = match chunks.get(&id) {
            Some(bytes) => format::decode_chunk_value(bytes)?.into_grid(),
            None => None,
        }
        .unwrap_or_else(|| vec![BlockType::AIR; BLOCKS_PER_CHUNK]);

        grid[block.index()] = block_type;
        chunks.insert(id, format::encode_chunk_value(Some(grid.as_slice())));
        Ok(())
    }

    /// Number of chunks with a record.
    pub fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.lock().is_empty()
    }
}

impl ChunkStore for MemoryStore {
    fn chunk_blocks(&self, id: ChunkId) -> Result<Option<ChunkRecord>, PersistError> {
        let chunks = self.chunks.lock();
        chunks
            .get(&id)
            .map(|bytes| format::decode_chunk_value(bytes))
            .transpose()
    }

    fn put_chunk(&self, id: ChunkId, blocks: Option<&[BlockType]>) -> Result<(), PersistError> {
        let value = format::encode_chunk_value(blocks);
        self.chunks.lock().insert(id, value);
        log::debug!("put chunk {id} (memory)");
        Ok(())
    }
}
