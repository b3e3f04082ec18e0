//! Metadata cache database - SQLite via rusqlite
//!
//! The reconciler only needs two things from the cache: the storage ids that
//! back a mount, and a bulk "mark this folder's size as unknown" update.
//! Both go through [`MetadataStore`] so the reconciler can be driven by a
//! fake in tests and by [`FileCacheDatabase`] in production.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

mod error;
mod filecache;
mod schema;

pub use error::DatabaseError;

/// Cached size marking a folder whose contents must be re-derived.
pub const UNKNOWN_SIZE: i64 = -1;

/// Access the reconciler needs to the metadata cache.
pub trait MetadataStore {
    /// Storage ids the mount's content is indexed under (historical re-mounts
    /// can leave more than one).
    fn storage_ids_for_mount(&mut self, mount_id: i64) -> Result<Vec<i64>, DatabaseError>;

    /// Set the cached size to [`UNKNOWN_SIZE`] for every entry with the given
    /// path hash in any of `storage_ids`. Returns the number of rows updated.
    fn invalidate_folder_size(
        &mut self,
        storage_ids: &[i64],
        path_hash: &str,
    ) -> Result<usize, DatabaseError>;

    /// Drop the current connection. Errors while closing are logged, not returned.
    fn close(&mut self);

    /// (Re)open the connection.
    fn connect(&mut self) -> Result<(), DatabaseError>;

    fn is_connected(&self) -> bool;
}

/// Connection to the SQLite metadata cache
pub struct FileCacheDatabase {
    pub(crate) conn: Option<Connection>,
    pub(crate) file_path: PathBuf,
    busy_timeout: Duration,
}

impl FileCacheDatabase {
    /// Open the database and make sure the cache tables exist
    pub fn new<P: AsRef<Path>>(db_path: P, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let file_path = db_path.as_ref().to_path_buf();

        info!("Opening metadata cache at: {}", file_path.display());

        let mut db = Self {
            conn: None,
            file_path,
            busy_timeout,
        };
        db.connect()?;
        db.initialize_schema()?;

        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn open_connection(&self) -> Result<Connection, DatabaseError> {
        let conn = Connection::open(&self.file_path).map_err(|source| DatabaseError::Open {
            path: self.file_path.clone(),
            source,
        })?;

        // Wait for writers holding the lock instead of failing straight away
        conn.busy_timeout(self.busy_timeout)?;

        Ok(conn)
    }

    pub(crate) fn conn(&self) -> Result<&Connection, DatabaseError> {
        self.conn.as_ref().ok_or(DatabaseError::Closed)
    }
}

impl MetadataStore for FileCacheDatabase {
    fn storage_ids_for_mount(&mut self, mount_id: i64) -> Result<Vec<i64>, DatabaseError> {
        self.get_storage_ids_for_mount(mount_id)
    }

    fn invalidate_folder_size(
        &mut self,
        storage_ids: &[i64],
        path_hash: &str,
    ) -> Result<usize, DatabaseError> {
        self.mark_folder_size_unknown(storage_ids, path_hash)
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                warn!("Error while closing database connection: {}", e);
            }
            debug!("Closed database connection to {}", self.file_path.display());
        }
    }

    fn connect(&mut self) -> Result<(), DatabaseError> {
        if self.conn.is_none() {
            self.conn = Some(self.open_connection()?);
            debug!("Connected to {}", self.file_path.display());
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        match &self.conn {
            Some(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            None => false,
        }
    }
}
