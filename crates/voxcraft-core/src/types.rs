use crate::constants::CHUNK_WIDTH;
use crate::direction::Direction;
use crate::math;
use glam::{IVec3, Vec3};
use std::fmt;

/// Absolute integer coordinate of one block cell in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BlockId {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Coordinate of a chunk in chunk space (each unit = CHUNK_WIDTH blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ChunkId {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockId {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing the given position, rounding each axis half up.
    pub fn nearest(pos: Vec3) -> Self {
        math::nearest_lattice(pos).into()
    }

    pub fn neighbor(self, dir: Direction) -> Self {
        (IVec3::from(self) + dir.offset()).into()
    }

    pub fn left(self) -> Self {
        self.neighbor(Direction::Left)
    }

    pub fn right(self) -> Self {
        self.neighbor(Direction::Right)
    }

    pub fn up(self) -> Self {
        self.neighbor(Direction::Up)
    }

    pub fn down(self) -> Self {
        self.neighbor(Direction::Down)
    }

    pub fn front(self) -> Self {
        self.neighbor(Direction::Front)
    }

    pub fn back(self) -> Self {
        self.neighbor(Direction::Back)
    }

    /// The chunk that owns this block.
    pub fn chunk_id(self) -> ChunkId {
        math::block_to_chunk(self.into()).into()
    }

    /// Offset of this block inside its chunk, each axis in [0, CHUNK_WIDTH).
    pub fn local(self) -> IVec3 {
        math::block_to_local(self.into())
    }

    /// Flat index into the owning chunk's grid: `x' + y'*W + z'*W*W`.
    pub fn index(self) -> usize {
        math::local_to_index(self.local())
    }
}

impl ChunkId {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn neighbor(self, dir: Direction) -> Self {
        (IVec3::from(self) + dir.offset()).into()
    }

    pub fn left(self) -> Self {
        self.neighbor(Direction::Left)
    }

    pub fn right(self) -> Self {
        self.neighbor(Direction::Right)
    }

    pub fn up(self) -> Self {
        self.neighbor(Direction::Up)
    }

    pub fn down(self) -> Self {
        self.neighbor(Direction::Down)
    }

    pub fn front(self) -> Self {
        self.neighbor(Direction::Front)
    }

    pub fn back(self) -> Self {
        self.neighbor(Direction::Back)
    }

    /// Block at the chunk's minimum corner.
    pub fn origin(self) -> BlockId {
        BlockId::new(self.x * CHUNK_WIDTH, self.y * CHUNK_WIDTH, self.z * CHUNK_WIDTH)
    }

    /// Absolute block for a flat grid index of this chunk.
    pub fn block_at_index(self, index: usize) -> BlockId {
        math::chunk_local_to_block(self.into(), math::index_to_local(index)).into()
    }

    /// Half-open range of absolute Y values covered by this chunk.
    pub fn y_range(self) -> std::ops::Range<i32> {
        self.y * CHUNK_WIDTH..(self.y + 1) * CHUNK_WIDTH
    }
}

impl From<IVec3> for BlockId {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockId> for IVec3 {
    fn from(b: BlockId) -> Self {
        IVec3::new(b.x, b.y, b.z)
    }
}

impl From<IVec3> for ChunkId {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<ChunkId> for IVec3 {
    fn from(c: ChunkId) -> Self {
        IVec3::new(c.x, c.y, c.z)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
