pub mod fakes;
pub mod tempdir;

pub use fakes::{FakeStore, Reporting, ScriptedStorage, query_error, transient_error};
pub use tempdir::unique_temp_dir;
