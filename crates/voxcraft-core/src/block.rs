use std::ops::RangeInclusive;

/// Block type identifier stored in every chunk cell. 0 = air/empty.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, bytemuck::Pod, bytemuck::Zeroable,
)]
#[repr(transparent)]
pub struct BlockType(pub u16);

/// Block ids rendered as cross-shaped plants (no collision).
pub const PLANT_RANGE: RangeInclusive<u16> = 17..=31;

impl BlockType {
    pub const AIR: BlockType = BlockType(0);
    pub const GRASS: BlockType = BlockType(1);
    pub const SAND: BlockType = BlockType(2);
    pub const WOOD: BlockType = BlockType(5);
    pub const GLASS: BlockType = BlockType(10);
    pub const LEAVES: BlockType = BlockType(15);
    pub const CLOUD: BlockType = BlockType(16);
    pub const TALL_GRASS: BlockType = BlockType(17);
    /// First of the flower family; flowers occupy 18..=24.
    pub const FLOWER: BlockType = BlockType(18);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_plant(self) -> bool {
        PLANT_RANGE.contains(&self.0)
    }

    /// Light passes through plants, air, glass and leaves.
    pub fn is_transparent(self) -> bool {
        self.is_plant() || matches!(self, Self::AIR | Self::GLASS | Self::LEAVES)
    }

    /// Solid for collision and ray purposes: anything that is neither air nor a plant.
    pub fn is_obstacle(self) -> bool {
        !self.is_plant() && !self.is_empty()
    }
}

impl From<u16> for BlockType {
    fn from(v: u16) -> Self {
        BlockType(v)
    }
}

impl From<BlockType> for u16 {
    fn from(b: BlockType) -> Self {
        b.0
    }
}
