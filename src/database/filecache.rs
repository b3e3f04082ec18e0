// Queries against the filecache and mounts tables

use super::*;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

impl FileCacheDatabase {
    pub fn get_storage_ids_for_mount(&self, mount_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT storage_id FROM mounts WHERE mount_id = ?1 ORDER BY storage_id",
        )?;

        let ids = stmt
            .query_map(params![mount_id], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(ids)
    }

    /// Single bulk update across every storage id backing a mount
    pub fn mark_folder_size_unknown(
        &self,
        storage_ids: &[i64],
        path_hash: &str,
    ) -> Result<usize, DatabaseError> {
        if storage_ids.is_empty() {
            return Ok(0);
        }

        let placeholders = (0..storage_ids.len())
            .map(|i| format!("?{}", i + 3))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE filecache SET size = ?1 WHERE path_hash = ?2 AND storage IN ({})",
            placeholders
        );

        let mut values = Vec::with_capacity(storage_ids.len() + 2);
        values.push(Value::Integer(UNKNOWN_SIZE));
        values.push(Value::Text(path_hash.to_string()));
        values.extend(storage_ids.iter().map(|id| Value::Integer(*id)));

        let updated = self.conn()?.execute(&sql, params_from_iter(values.iter()))?;
        debug!(
            "Marked {} filecache rows with hash {} as unknown size",
            updated, path_hash
        );

        Ok(updated)
    }
}
