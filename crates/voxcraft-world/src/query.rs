use glam::Vec3;
use voxcraft_core::constants::{COLLISION_PAD, RAY_MAX_DISTANCE, RAY_STEP};
use voxcraft_core::math::round_half_up;
use voxcraft_core::BlockId;

use crate::World;

/// Result of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayHit {
    /// First non-empty block along the ray.
    pub block: BlockId,
    /// Block sampled just before `block`; `None` when the ray starts inside
    /// the hit block. Placing a block targets this cell.
    pub previous: Option<BlockId>,
}

impl World {
    /// Push `pos` out of obstacle blocks around the player's foot and head
    /// cells.
    ///
    /// Returns the corrected position and whether a floor or ceiling stopped
    /// vertical movement. Only resident chunks are consulted.
    pub fn collide(&self, pos: Vec3) -> (Vec3, bool) {
        let (mut x, mut y, mut z) = (pos.x, pos.y, pos.z);
        let (nx, ny, nz) = (round_half_up(x), round_half_up(y), round_half_up(z));
        let pad = COLLISION_PAD;

        let head = BlockId::new(nx as i32, ny as i32, nz as i32);
        let foot = head.down();

        let mut stop = false;
        for cell in [foot, head] {
            if self.block(cell.left()).is_obstacle() && x < nx && nx - x > pad {
                x = nx - pad;
            }
            if self.block(cell.right()).is_obstacle() && x > nx && x - nx > pad {
                x = nx + pad;
            }
            if self.block(cell.down()).is_obstacle() && y < ny && ny - y > pad {
                y = ny - pad;
                stop = true;
            }
            if self.block(cell.up()).is_obstacle() && y > ny && y - ny > pad {
                y = ny + pad;
                stop = true;
            }
            if self.block(cell.back()).is_obstacle() && z < nz && nz - z > pad {
                z = nz - pad;
            }
            if self.block(cell.front()).is_obstacle() && z > nz && z - nz > pad {
                z = nz + pad;
            }
        }
        (Vec3::new(x, y, z), stop)
    }

    /// March from `origin` along `dir` in fixed steps and return the first
    /// non-empty block, or `None` if nothing lies within range.
    ///
    /// `dir` is not normalized; step length scales with its magnitude.
    pub fn hit_test(&self, origin: Vec3, dir: Vec3) -> Option<RayHit> {
        let steps = (RAY_MAX_DISTANCE / RAY_STEP) as u32;
        let mut previous: Option<BlockId> = None;
        for i in 0..steps {
            let block = BlockId::nearest(origin + dir * (i as f32 * RAY_STEP));
            if previous == Some(block) {
                continue;
            }
            if self.has_block(block) {
                return Some(RayHit { block, previous });
            }
            previous = Some(block);
        }
        None
    }
}
