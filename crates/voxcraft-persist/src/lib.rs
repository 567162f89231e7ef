pub mod error;
pub mod format;
pub mod memory;
pub mod store;

pub use error::PersistError;
pub use format::{CameraState, ChunkRecord};
pub use memory::MemoryStore;
pub use store::{ChunkStore, Store};
