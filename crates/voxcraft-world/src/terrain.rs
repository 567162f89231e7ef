use std::collections::HashMap;

use voxcraft_core::constants::CHUNK_WIDTH;
use voxcraft_core::{BlockId, BlockType, ChunkId};

use crate::noise::Simplex;

/// Fixed world seed; terrain depends only on block coordinates.
pub const WORLD_SEED: u64 = 42;

/// Columns at or below this height become sand beaches clamped to it.
const BEACH_HEIGHT: i32 = 12;

/// Altitude band filled by clouds.
const CLOUD_LAYER: std::ops::Range<i32> = 64..72;

/// Trees keep this many columns clear of the chunk edge so the canopy stays
/// inside the chunk.
const TREE_MARGIN: i32 = 4;

/// Deterministic heightmap terrain with plants, trees and clouds.
pub struct TerrainGenerator {
    noise: Simplex,
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        Self::new(WORLD_SEED)
    }
}

impl TerrainGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: Simplex::new(seed),
        }
    }

    /// Initial blocks for a chunk. Only blocks whose Y lies inside the chunk's
    /// vertical band are returned. Same input, same output.
    pub fn generate(&self, id: ChunkId) -> HashMap<BlockId, BlockType> {
        let mut blocks = HashMap::new();
        let band = id.y_range();
        let origin = id.origin();

        let mut put = |block: BlockId, block_type: BlockType| {
            if band.contains(&block.y) {
                blocks.insert(block, block_type);
            }
        };

        for dx in 0..CHUNK_WIDTH {
            for dz in 0..CHUNK_WIDTH {
                let x = origin.x + dx;
                let z = origin.z + dz;
                let (h, surface) = self.column(x, z);

                for y in 0..h {
                    put(BlockId::new(x, y, z), surface);
                }

                if surface == BlockType::GRASS {
                    if let Some(plant) = self.plant_at(x, z) {
                        put(BlockId::new(x, h, z), plant);
                    }

                    let clear_of_edge =
                        dx >= TREE_MARGIN && dz >= TREE_MARGIN && dx + TREE_MARGIN <= CHUNK_WIDTH
                            && dz + TREE_MARGIN <= CHUNK_WIDTH;
                    if clear_of_edge && self.has_tree(x, z) {
                        for (block, block_type) in tree(x, h, z) {
                            put(block, block_type);
                        }
                    }
                }

                for y in CLOUD_LAYER {
                    if self.is_cloud(x, y, z) {
                        put(BlockId::new(x, y, z), BlockType::CLOUD);
                    }
                }
            }
        }

        blocks
    }

    /// Surface height of a column and the block type filling it.
    pub fn column(&self, x: i32, z: i32) -> (i32, BlockType) {
        let (fx, fz) = (x as f64, z as f64);
        let f = self.noise.fractal2(fx * 0.01, fz * 0.01, 4, 0.5, 2.0);
        let g = self.noise.fractal2(-fx * 0.01, -fz * 0.01, 2, 0.9, 2.0);
        let mountain = (g * 32.0 + 16.0) as i32;
        let h = (f * mountain as f64) as i32;
        if h <= BEACH_HEIGHT {
            (BEACH_HEIGHT, BlockType::SAND)
        } else {
            (h, BlockType::GRASS)
        }
    }

    /// Decoration standing on a grass column, if any. A flower wins over tall grass.
    fn plant_at(&self, x: i32, z: i32) -> Option<BlockType> {
        let (fx, fz) = (x as f64, z as f64);
        let mut plant = None;
        if self.noise.fractal2(-fx * 0.1, fz * 0.1, 4, 0.8, 2.0) > 0.6 {
            plant = Some(BlockType::TALL_GRASS);
        }
        if self.noise.fractal2(fx * 0.05, -fz * 0.05, 4, 0.8, 2.0) > 0.7 {
            let pick = self.noise.fractal2(fx * 0.1, fz * 0.1, 4, 0.8, 2.0);
            let offset = ((pick * 7.0) as u16).min(6);
            plant = Some(BlockType(BlockType::FLOWER.0 + offset));
        }
        plant
    }

    fn has_tree(&self, x: i32, z: i32) -> bool {
        self.noise.fractal2(x as f64, z as f64, 6, 0.5, 2.0) > 0.79
    }

    fn is_cloud(&self, x: i32, y: i32, z: i32) -> bool {
        self.noise
            .fractal3(x as f64 * 0.01, y as f64 * 0.1, z as f64 * 0.01, 8, 0.5, 2.0)
            > 0.69
    }
}

/// Leaf canopy followed by the trunk for a tree rooted at surface height `h`.
/// The trunk is emitted last so it overwrites leaves it passes through.
fn tree(x: i32, h: i32, z: i32) -> Vec<(BlockId, BlockType)> {
    let mut blocks = Vec::new();
    for y in h + 3..h + 8 {
        for ox in -3..=3 {
            for oz in -3..=3 {
                let dy = y - h - 4;
                if ox * ox + oz * oz + dy * dy < 11 {
                    blocks.push((BlockId::new(x + ox, y, z + oz), BlockType::LEAVES));
                }
            }
        }
    }
    for y in h..h + 7 {
        blocks.push((BlockId::new(x, y, z), BlockType::WOOD));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_deterministic() {
        let gen = TerrainGenerator::default();
        let id = ChunkId::new(1, 0, 1);
        assert_eq!(gen.generate(id), gen.generate(id), "terrain generation must be deterministic");
        assert_eq!(
            gen.generate(id),
            TerrainGenerator::default().generate(id),
            "separate generators with the same seed must agree"
        );
    }

    #[test]
    fn test_blocks_stay_inside_chunk() {
        let gen = TerrainGenerator::default();
        for id in [ChunkId::new(0, 0, 0), ChunkId::new(-1, 0, -1), ChunkId::new(3, 1, -2)] {
            for (block, block_type) in gen.generate(id) {
                assert_eq!(block.chunk_id(), id, "{block} escaped chunk {id}");
                assert!(!block_type.is_empty(), "generator must not emit air");
            }
        }
    }

    #[test]
    fn test_every_column_has_ground() {
        let gen = TerrainGenerator::default();
        let id = ChunkId::new(-2, 0, 5);
        let blocks = gen.generate(id);
        let origin = id.origin();
        for dx in 0..CHUNK_WIDTH {
            for dz in 0..CHUNK_WIDTH {
                let x = origin.x + dx;
                let z = origin.z + dz;
                let (h, surface) = gen.column(x, z);
                assert!(h >= BEACH_HEIGHT);
                assert_eq!(blocks.get(&BlockId::new(x, 0, z)), Some(&surface));
                assert_eq!(blocks.get(&BlockId::new(x, BEACH_HEIGHT - 1, z)), Some(&surface));
            }
        }
    }

    #[test]
    fn test_sand_only_at_beach_height() {
        let gen = TerrainGenerator::default();
        for x in -64..64 {
            let (h, surface) = gen.column(x, x * 3);
            if surface == BlockType::SAND {
                assert_eq!(h, BEACH_HEIGHT);
            } else {
                assert!(h > BEACH_HEIGHT);
            }
        }
    }

    #[test]
    fn test_cloud_band_holds_only_clouds() {
        // Terrain tops out below 64, so chunk y=2 (64..96) can only hold clouds.
        let gen = TerrainGenerator::default();
        for (block, block_type) in gen.generate(ChunkId::new(0, 2, 0)) {
            assert_eq!(block_type, BlockType::CLOUD);
            assert!(CLOUD_LAYER.contains(&block.y));
        }
    }

    #[test]
    fn test_below_ground_chunk_is_empty() {
        let gen = TerrainGenerator::default();
        assert!(gen.generate(ChunkId::new(0, -1, 0)).is_empty());
    }

    #[test]
    fn test_tree_shape() {
        let blocks = tree(10, 20, 10);
        let trunk: Vec<_> = blocks
            .iter()
            .filter(|(_, t)| *t == BlockType::WOOD)
            .map(|(b, _)| b.y)
            .collect();
        assert_eq!(trunk, (20..27).collect::<Vec<_>>());
        assert!(blocks
            .iter()
            .filter(|(_, t)| *t == BlockType::LEAVES)
            .all(|(b, _)| (23..28).contains(&b.y) && (b.x - 10).abs() <= 3 && (b.z - 10).abs() <= 3));
    }

    #[test]
    fn test_plants_are_plants() {
        let gen = TerrainGenerator::default();
        for x in -200..200 {
            if let Some(plant) = gen.plant_at(x, -x * 2 + 17) {
                assert!(plant.is_plant(), "{plant:?} is not a plant");
            }
        }
    }
}
