/// Errors that can occur while reading or writing the world store.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to open database: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("failed to begin transaction: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("failed to open table: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("failed to commit transaction: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("invalid chunk key length {0} (expected 12 bytes)")]
    InvalidKeyLength(usize),

    #[error("invalid chunk record size: expected {expected} bytes, got {actual}")]
    InvalidChunkSize { expected: usize, actual: usize },

    #[error("chunk record has no header byte")]
    EmptyRecord,

    #[error("invalid camera record length {0} (expected 20 bytes)")]
    InvalidCameraRecord(usize),
}

impl PersistError {
    /// True when the error describes malformed on-disk data rather than an I/O failure.
    /// Corruption is never transient; retrying the read returns the same bytes.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            PersistError::InvalidKeyLength(_)
                | PersistError::InvalidChunkSize { .. }
                | PersistError::EmptyRecord
                | PersistError::InvalidCameraRecord(_)
        )
    }
}
