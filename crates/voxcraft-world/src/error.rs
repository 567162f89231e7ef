use voxcraft_core::ChunkId;
use voxcraft_persist::PersistError;

/// Errors returned by world operations that write through to the store.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("chunk {0} could not be loaded")]
    ChunkUnavailable(ChunkId),

    #[error(transparent)]
    Persist(#[from] PersistError),
}
