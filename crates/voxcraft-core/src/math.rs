use crate::constants::CHUNK_WIDTH;
use glam::{IVec3, Vec3};

/// Convert an absolute block coordinate to its containing chunk coordinate.
///
/// Floor division: x = -1 lands in chunk -1, not chunk 0.
pub fn block_to_chunk(block: IVec3) -> IVec3 {
    IVec3::new(
        block.x.div_euclid(CHUNK_WIDTH),
        block.y.div_euclid(CHUNK_WIDTH),
        block.z.div_euclid(CHUNK_WIDTH),
    )
}

/// Convert an absolute block coordinate to its offset within the owning chunk.
/// Every component of the result lies in [0, CHUNK_WIDTH).
pub fn block_to_local(block: IVec3) -> IVec3 {
    IVec3::new(
        block.x.rem_euclid(CHUNK_WIDTH),
        block.y.rem_euclid(CHUNK_WIDTH),
        block.z.rem_euclid(CHUNK_WIDTH),
    )
}

/// Flatten a local offset into an array index, x fastest then y then z.
pub fn local_to_index(local: IVec3) -> usize {
    (local.x + local.y * CHUNK_WIDTH + local.z * CHUNK_WIDTH * CHUNK_WIDTH) as usize
}

/// Inverse of [`local_to_index`].
pub fn index_to_local(index: usize) -> IVec3 {
    let i = index as i32;
    IVec3::new(
        i % CHUNK_WIDTH,
        (i / CHUNK_WIDTH) % CHUNK_WIDTH,
        i / (CHUNK_WIDTH * CHUNK_WIDTH),
    )
}

/// Convert a chunk coordinate and local offset back to absolute block space.
pub fn chunk_local_to_block(chunk: IVec3, local: IVec3) -> IVec3 {
    chunk * CHUNK_WIDTH + local
}

/// Round half up: `floor(v + 0.5)`. Unlike `f32::round`, -0.5 goes to 0.
pub fn round_half_up(v: f32) -> f32 {
    (v + 0.5).floor()
}

/// Nearest integer lattice point for a world-space position.
pub fn nearest_lattice(pos: Vec3) -> IVec3 {
    IVec3::new(
        round_half_up(pos.x) as i32,
        round_half_up(pos.y) as i32,
        round_half_up(pos.z) as i32,
    )
}
