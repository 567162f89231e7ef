//! Byte layouts of everything written to the store.
//!
//! Chunk key:   x:i32, y:i32, z:i32 little-endian (12 bytes).
//! Chunk value: header:u8, then when header == 1 the full grid as
//!              BLOCKS_PER_CHUNK little-endian u16s in index order.
//! Camera:      position [f32; 3], rot_x:f32, rot_y:f32 little-endian (20 bytes).

use glam::Vec3;
use voxcraft_core::constants::{BLOCKS_PER_CHUNK, DEFAULT_SPAWN};
use voxcraft_core::{BlockType, ChunkId};

use crate::error::PersistError;

/// Size of an encoded chunk key.
pub const CHUNK_KEY_SIZE: usize = 12;

/// Header byte: the chunk holds no blocks and no grid follows.
pub const HEADER_EMPTY: u8 = 0;

/// Header byte: a full grid follows.
pub const HEADER_BLOCKS: u8 = 1;

/// Size of a non-empty encoded chunk value.
pub const CHUNK_RECORD_SIZE: usize = 1 + BLOCKS_PER_CHUNK * 2;

/// Size of the encoded camera record.
pub const CAMERA_RECORD_SIZE: usize = 20;

/// A decoded chunk value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkRecord {
    /// The chunk was persisted with no blocks at all.
    Empty,
    /// Full grid of BLOCKS_PER_CHUNK cells.
    Blocks(Vec<BlockType>),
}

impl ChunkRecord {
    /// The grid as stored, or `None` for an empty chunk.
    pub fn into_grid(self) -> Option<Vec<BlockType>> {
        match self {
            ChunkRecord::Empty => None,
            ChunkRecord::Blocks(blocks) => Some(blocks),
        }
    }

    /// Cell value at a flat grid index. Empty records read as air everywhere.
    pub fn get(&self, index: usize) -> BlockType {
        match self {
            ChunkRecord::Empty => BlockType::AIR,
            ChunkRecord::Blocks(blocks) => blocks[index],
        }
    }
}

/// Camera pose persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Yaw in degrees. Stored exactly as given.
    pub rot_x: f32,
    /// Pitch in degrees. Stored exactly as given.
    pub rot_y: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::from_array(DEFAULT_SPAWN),
            rot_x: 0.0,
            rot_y: 0.0,
        }
    }
}

pub fn encode_chunk_key(id: ChunkId) -> [u8; CHUNK_KEY_SIZE] {
    let mut key = [0u8; CHUNK_KEY_SIZE];
    key[0..4].copy_from_slice(&id.x.to_le_bytes());
    key[4..8].copy_from_slice(&id.y.to_le_bytes());
    key[8..12].copy_from_slice(&id.z.to_le_bytes());
    key
}

pub fn decode_chunk_key(bytes: &[u8]) -> Result<ChunkId, PersistError> {
    let key: &[u8; CHUNK_KEY_SIZE] = bytes
        .try_into()
        .map_err(|_| PersistError::InvalidKeyLength(bytes.len()))?;
    let x = i32::from_le_bytes([key[0], key[1], key[2], key[3]]);
    let y = i32::from_le_bytes([key[4], key[5], key[6], key[7]]);
    let z = i32::from_le_bytes([key[8], key[9], key[10], key[11]]);
    Ok(ChunkId::new(x, y, z))
}

/// Encode a chunk grid. `None` (an unallocated chunk) encodes as the single
/// header byte instead of a grid of zeros.
///
/// # Panics
/// Panics if a grid is given whose length is not BLOCKS_PER_CHUNK.
pub fn encode_chunk_value(blocks: Option<&[BlockType]>) -> Vec<u8> {
    let Some(blocks) = blocks else {
        return vec![HEADER_EMPTY];
    };
    assert_eq!(
        blocks.len(),
        BLOCKS_PER_CHUNK,
        "chunk grid must hold exactly {BLOCKS_PER_CHUNK} cells"
    );

    let mut out = Vec::with_capacity(CHUNK_RECORD_SIZE);
    out.push(HEADER_BLOCKS);

    #[cfg(target_endian = "little")]
    out.extend_from_slice(bytemuck::cast_slice(blocks));

    #[cfg(not(target_endian = "little"))]
    for block in blocks {
        out.extend_from_slice(&block.0.to_le_bytes());
    }

    out
}

pub fn decode_chunk_value(bytes: &[u8]) -> Result<ChunkRecord, PersistError> {
    let (&header, grid) = bytes.split_first().ok_or(PersistError::EmptyRecord)?;
    if header == HEADER_EMPTY {
        return Ok(ChunkRecord::Empty);
    }

    if bytes.len() != CHUNK_RECORD_SIZE {
        return Err(PersistError::InvalidChunkSize {
            expected: CHUNK_RECORD_SIZE,
            actual: bytes.len(),
        });
    }

    // Payload starts at offset 1, so it is not u16-aligned; decode per cell.
    let blocks = grid
        .chunks_exact(2)
        .map(|pair| BlockType(u16::from_le_bytes([pair[0], pair[1]])))
        .collect();
    Ok(ChunkRecord::Blocks(blocks))
}

pub fn encode_camera(camera: &CameraState) -> [u8; CAMERA_RECORD_SIZE] {
    let fields = [
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.rot_x,
        camera.rot_y,
    ];
    let mut out = [0u8; CAMERA_RECORD_SIZE];
    for (slot, value) in out.chunks_exact_mut(4).zip(fields) {
        slot.copy_from_slice(&value.to_le_bytes());
    }
    out
}

pub fn decode_camera(bytes: &[u8]) -> Result<CameraState, PersistError> {
    if bytes.len() != CAMERA_RECORD_SIZE {
        return Err(PersistError::InvalidCameraRecord(bytes.len()));
    }
    let mut fields = [0f32; 5];
    for (value, raw) in fields.iter_mut().zip(bytes.chunks_exact(4)) {
        *value = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    }
    Ok(CameraState {
        position: Vec3::new(fields[0], fields[1], fields[2]),
        rot_x: fields[3],
        rot_y: fields[4],
    })
}
