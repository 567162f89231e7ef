pub mod block;
pub mod constants;
pub mod direction;
pub mod math;
pub mod types;

pub use block::BlockType;
pub use types::{BlockId, ChunkId};
