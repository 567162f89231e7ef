use glam::IVec3;

/// One of the six axis-aligned face neighbors.
///
/// Naming follows the camera's frame: Left/Right along X, Down/Up along Y,
/// Back/Front along Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Left = 0,
    Right = 1,
    Down = 2,
    Up = 3,
    Back = 4,
    Front = 5,
}

impl Direction {
    /// Offset vector for this direction. Y-up convention: Down = (0,-1,0).
    pub fn offset(self) -> IVec3 {
        match self {
            Direction::Left => IVec3::new(-1, 0, 0),
            Direction::Right => IVec3::new(1, 0, 0),
            Direction::Down => IVec3::new(0, -1, 0),
            Direction::Up => IVec3::new(0, 1, 0),
            Direction::Back => IVec3::new(0, 0, -1),
            Direction::Front => IVec3::new(0, 0, 1),
        }
    }
}
