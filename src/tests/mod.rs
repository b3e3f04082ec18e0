// mount-notify test suites
//
// Unit tests for small helpers live next to the code; the suites here drive
// whole components through the fakes in `helpers`.

pub mod helpers;

pub mod mounts_tests; // `mounts` listing
pub mod watcher_tests; // Real OS watchers on temp dirs
