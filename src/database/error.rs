use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection is closed")]
    Closed,

    #[error("Failed to open database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Connectivity-class failure; closing and reopening the connection may fix it.
    #[error("Transient database error: {0}")]
    Transient(#[source] rusqlite::Error),

    #[error("Database error: {0}")]
    Query(#[source] rusqlite::Error),
}

impl DatabaseError {
    /// Whether a reconnect-and-retry is worth attempting.
    pub fn is_transient(&self) -> bool {
        match self {
            DatabaseError::Closed | DatabaseError::Open { .. } | DatabaseError::Transient(_) => true,
            DatabaseError::Query(_) => false,
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        let transient = matches!(
            &err,
            rusqlite::Error::SqliteFailure(failure, _)
                if matches!(
                    failure.code,
                    ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::CannotOpen
                        | ErrorCode::SystemIoFailure
                )
        );

        if transient {
            DatabaseError::Transient(err)
        } else {
            DatabaseError::Query(err)
        }
    }
}
