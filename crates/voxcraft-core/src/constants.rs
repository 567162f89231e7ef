//! Shared constants for chunk geometry and world defaults.

/// Side length of a chunk in blocks.
pub const CHUNK_WIDTH: i32 = 32;

/// Blocks in one horizontal layer of a chunk (32^2).
pub const BLOCKS_PER_LAYER: usize = (CHUNK_WIDTH * CHUNK_WIDTH) as usize;

/// Total blocks per chunk (32^3).
pub const BLOCKS_PER_CHUNK: usize = BLOCKS_PER_LAYER * CHUNK_WIDTH as usize;

/// Camera spawn position used when nothing has been persisted yet.
pub const DEFAULT_SPAWN: [f32; 3] = [0.0, 16.0, 0.0];

/// Distance kept between a moving body and an obstacle cell boundary.
pub const COLLISION_PAD: f32 = 0.25;

/// Ray marching step length in world units.
pub const RAY_STEP: f32 = 0.125;

/// Maximum ray length in world units.
pub const RAY_MAX_DISTANCE: f32 = 8.0;
