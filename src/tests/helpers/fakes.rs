//! In-memory collaborators for driving the reconciler, listener and
//! self-test without a database or an OS watcher.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::database::{DatabaseError, MetadataStore};
use crate::selftest::PROBE_FOLDER;
use crate::storage::{NotifyStorage, StorageError};
use crate::watcher::{ChangeEvent, ChangeSubscription};

pub fn transient_error() -> DatabaseError {
    DatabaseError::Transient(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
        Some("disk I/O error".to_string()),
    ))
}

pub fn query_error() -> DatabaseError {
    DatabaseError::Query(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
        Some("no such table: mounts".to_string()),
    ))
}

/// Metadata store backed by a map, with scriptable lookup and connect failures
#[derive(Debug)]
pub struct FakeStore {
    pub mounts: HashMap<i64, Vec<i64>>,
    /// Returned (in order) by the next lookups before any real answer
    pub lookup_failures: VecDeque<DatabaseError>,
    /// Number of connect attempts that fail before one succeeds
    pub connect_failures: u32,
    /// Number of connects that succeed but leave an unusable connection
    pub dead_connects: u32,
    /// Rows each update claims to have touched
    pub rows_per_update: usize,
    pub connected: bool,
    pub updates: Vec<(Vec<i64>, String)>,
    pub lookups: u32,
    pub closes: u32,
    pub connects: u32,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            mounts: HashMap::new(),
            lookup_failures: VecDeque::new(),
            connect_failures: 0,
            dead_connects: 0,
            rows_per_update: 1,
            connected: true,
            updates: Vec::new(),
            lookups: 0,
            closes: 0,
            connects: 0,
        }
    }

    pub fn with_mount(mut self, mount_id: i64, storage_ids: &[i64]) -> Self {
        self.mounts.insert(mount_id, storage_ids.to_vec());
        self
    }

    pub fn updated_hashes(&self) -> Vec<String> {
        self.updates.iter().map(|(_, hash)| hash.clone()).collect()
    }
}

impl MetadataStore for FakeStore {
    fn storage_ids_for_mount(&mut self, mount_id: i64) -> Result<Vec<i64>, DatabaseError> {
        self.lookups += 1;
        if let Some(err) = self.lookup_failures.pop_front() {
            return Err(err);
        }
        if !self.connected {
            return Err(DatabaseError::Closed);
        }
        Ok(self.mounts.get(&mount_id).cloned().unwrap_or_default())
    }

    fn invalidate_folder_size(
        &mut self,
        storage_ids: &[i64],
        path_hash: &str,
    ) -> Result<usize, DatabaseError> {
        self.updates.push((storage_ids.to_vec(), path_hash.to_string()));
        Ok(self.rows_per_update)
    }

    fn close(&mut self) {
        self.closes += 1;
        self.connected = false;
    }

    fn connect(&mut self) -> Result<(), DatabaseError> {
        self.connects += 1;
        if self.connect_failures > 0 {
            self.connect_failures -= 1;
            return Err(transient_error());
        }
        if self.dead_connects > 0 {
            self.dead_connects -= 1;
            return Ok(());
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Which probe writes a [`ScriptedStorage`] reports back as changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reporting {
    /// Recursive notifications work
    Everything,
    /// Only changes directly at the scoped root are reported
    RootOnly,
    Nothing,
    /// Like `Everything`, but paths come without the leading slash
    WithoutLeadingSlash,
}

struct QueueSubscription {
    queue: Rc<RefCell<VecDeque<ChangeEvent>>>,
    /// Events that "arrive later": only handed out once the queue is empty,
    /// never by `drain`
    live: VecDeque<ChangeEvent>,
}

impl ChangeSubscription for QueueSubscription {
    fn next_change(&mut self) -> Option<ChangeEvent> {
        let queued = self.queue.borrow_mut().pop_front();
        queued.or_else(|| self.live.pop_front())
    }

    fn drain(&mut self) -> Vec<ChangeEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

/// Storage whose file operations feed its own subscription
pub struct ScriptedStorage {
    reporting: Reporting,
    fail_writes: bool,
    queue: Rc<RefCell<VecDeque<ChangeEvent>>>,
    live: RefCell<Vec<ChangeEvent>>,
    pub ops: RefCell<Vec<String>>,
    pub notify_paths: RefCell<Vec<String>>,
}

impl ScriptedStorage {
    pub fn new(reporting: Reporting) -> Self {
        Self {
            reporting,
            fail_writes: false,
            queue: Rc::new(RefCell::new(VecDeque::new())),
            live: RefCell::new(Vec::new()),
            ops: RefCell::new(Vec::new()),
            notify_paths: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Changes delivered by `listen` after the self-test has finished
    pub fn with_live_events(self, events: Vec<ChangeEvent>) -> Self {
        *self.live.borrow_mut() = events;
        self
    }

    fn record(&self, op: &str, path: &str, event: fn(String) -> ChangeEvent) {
        self.ops.borrow_mut().push(format!("{} {}", op, path));

        let in_subfolder = path.contains(PROBE_FOLDER) && !path.ends_with(PROBE_FOLDER);
        let reported = match self.reporting {
            Reporting::Everything => Some(path.to_string()),
            Reporting::RootOnly if !in_subfolder => Some(path.to_string()),
            Reporting::WithoutLeadingSlash => Some(path.trim_start_matches('/').to_string()),
            _ => None,
        };

        if let Some(reported) = reported {
            self.queue.borrow_mut().push_back(event(reported));
        }
    }
}

impl NotifyStorage for ScriptedStorage {
    fn notify(&self, path: &str) -> Result<Box<dyn ChangeSubscription>, StorageError> {
        self.notify_paths.borrow_mut().push(path.to_string());
        Ok(Box::new(QueueSubscription {
            queue: Rc::clone(&self.queue),
            live: self.live.borrow_mut().drain(..).collect(),
        }))
    }

    fn write_file(&self, path: &str, _contents: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.record("write", path, ChangeEvent::added);
        Ok(())
    }

    fn mkdir(&self, path: &str) -> Result<(), StorageError> {
        self.record("mkdir", path, ChangeEvent::added);
        Ok(())
    }

    fn unlink(&self, path: &str) -> Result<(), StorageError> {
        self.record("unlink", path, ChangeEvent::removed);
        Ok(())
    }

    fn rmdir(&self, path: &str) -> Result<(), StorageError> {
        self.record("rmdir", path, ChangeEvent::removed);
        Ok(())
    }
}
