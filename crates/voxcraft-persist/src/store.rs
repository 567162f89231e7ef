use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{Database, Durability, ReadableTable, ReadableTableMetadata, TableDefinition};
use voxcraft_core::{BlockType, ChunkId};

use crate::error::PersistError;
use crate::format::{self, CameraState, ChunkRecord};

const CHUNK_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("chunk");
const CAMERA_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("camera");

/// The camera table holds one record, keyed by the table's own name.
const CAMERA_KEY: &[u8] = b"camera";

/// Chunk persistence seam used by the world cache.
pub trait ChunkStore: Send + Sync {
    /// Persisted record for a chunk, or `None` if the chunk was never written.
    fn chunk_blocks(&self, id: ChunkId) -> Result<Option<ChunkRecord>, PersistError>;

    /// Overwrite the record for a chunk. `None` stores the empty-chunk marker.
    fn put_chunk(&self, id: ChunkId, blocks: Option<&[BlockType]>) -> Result<(), PersistError>;
}

/// Durable world store: a redb database with a "chunk" and a "camera" table.
///
/// Chunk writes commit with eventual durability; [`Store::close`] forces
/// everything to disk.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the database file and make sure both tables exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let db = Database::create(path)?;
        log::info!("opened world store at {}", path.display());
        Self::init(db)
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Result<Self, PersistError> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, PersistError> {
        let txn = db.begin_write()?;
        {
            txn.open_table(CHUNK_TABLE)?;
            txn.open_table(CAMERA_TABLE)?;
        }
        txn.commit()?;
        Ok(Self { db })
    }

    pub fn put_camera(&self, camera: &CameraState) -> Result<(), PersistError> {
        let value = format::encode_camera(camera);
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CAMERA_TABLE)?;
            table.insert(CAMERA_KEY, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Persisted camera, or the default spawn pose if none was saved.
    pub fn camera(&self) -> Result<CameraState, PersistError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CAMERA_TABLE)?;
        match table.get(CAMERA_KEY)? {
            Some(value) => format::decode_camera(value.value()),
            None => Ok(CameraState::default()),
        }
    }

    /// Every persisted chunk id, in key byte order.
    pub fn chunk_ids(&self) -> Result<Vec<ChunkId>, PersistError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CHUNK_TABLE)?;
        let mut ids = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            ids.push(format::decode_chunk_key(key.value())?);
        }
        Ok(ids)
    }

    /// Number of persisted chunk records.
    pub fn chunk_count(&self) -> Result<u64, PersistError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CHUNK_TABLE)?;
        Ok(table.len()?)
    }

    /// Flush pending writes and release the database file.
    pub fn close(self) -> Result<(), PersistError> {
        let mut txn = self.db.begin_write()?;
        txn.set_durability(Durability::Immediate);
        txn.commit()?;
        drop(self.db);
        log::info!("world store closed");
        Ok(())
    }
}

impl ChunkStore for Store {
    fn chunk_blocks(&self, id: ChunkId) -> Result<Option<ChunkRecord>, PersistError> {
        let key = format::encode_chunk_key(id);
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CHUNK_TABLE)?;
        let record = match table.get(key.as_slice())? {
            Some(value) => Some(format::decode_chunk_value(value.value())?),
            None => None,
        };
        Ok(record)
    }

    fn put_chunk(&self, id: ChunkId, blocks: Option<&[BlockType]>) -> Result<(), PersistError> {
        let key = format::encode_chunk_key(id);
        let value = format::encode_chunk_value(blocks);
        let mut txn = self.db.begin_write()?;
        txn.set_durability(Durability::Eventual);
        {
            let mut table = txn.open_table(CHUNK_TABLE)?;
            table.insert(key.as_slice(), value.as_slice())?;
        }
        txn.commit()?;
        log::debug!("put chunk {id} ({} bytes)", value.len());
        Ok(())
    }
}
