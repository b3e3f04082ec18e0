// Cache table bootstrap. The tables are normally owned by the scanner that
// fills the cache; creating them here keeps a fresh database usable.

use super::*;
use tracing::debug;

impl FileCacheDatabase {
    pub(super) fn initialize_schema(&self) -> Result<(), DatabaseError> {
        debug!("Ensuring metadata cache schema");

        self.create_filecache_table()?;
        self.create_mounts_table()?;

        Ok(())
    }

    /// One row per cached file or folder, keyed by (storage, path_hash)
    fn create_filecache_table(&self) -> Result<(), DatabaseError> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS filecache (
                fileid INTEGER PRIMARY KEY AUTOINCREMENT,
                storage INTEGER NOT NULL,
                path TEXT NOT NULL,
                path_hash TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                size INTEGER NOT NULL DEFAULT 0,
                mtime INTEGER NOT NULL DEFAULT 0,
                UNIQUE(storage, path_hash)
            )",
            [],
        )?;

        debug!("Created filecache table");
        Ok(())
    }

    /// Associations between configured mounts and the storage ids they index under
    fn create_mounts_table(&self) -> Result<(), DatabaseError> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS mounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                storage_id INTEGER NOT NULL,
                mount_point TEXT NOT NULL,
                mount_id INTEGER
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_mounts_mount_id ON mounts(mount_id)",
            [],
        )?;

        debug!("Created mounts table and indexes");
        Ok(())
    }
}
