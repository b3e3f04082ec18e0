//! Change notification subscriptions
//!
//! A subscription is the consumer side of a live change feed. The producer
//! (a `notify` watcher thread for local storages) pushes raw events into a
//! channel; the subscription turns them into [`ChangeEvent`]s on demand.
//!
//! # Contract
//!
//! - [`listen`] is a blocking, lazy, effectively infinite iterator. It ends
//!   only if the producer goes away, and cannot be restarted.
//! - [`ChangeSubscription::drain`] never blocks; it returns whatever has
//!   queued up so far. The self-test relies on this.
//! - Events are handed out in arrival order on the calling thread; nothing is
//!   processed concurrently.

mod events;
pub mod filtering;
pub mod types;

use notify::{PollWatcher, RecursiveMode, Watcher};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;
use tracing::{debug, info, warn};

pub use events::convert_event;
pub use filtering::IgnoreFilter;
pub use types::{ChangeEvent, ChangeKind};

/// Live feed of changes from a storage backend
pub trait ChangeSubscription {
    /// Block until the next change arrives. `None` means the feed is gone.
    fn next_change(&mut self) -> Option<ChangeEvent>;

    /// Take every change queued so far without blocking.
    fn drain(&mut self) -> Vec<ChangeEvent>;
}

/// Blocking iterator over a subscription, see [`listen`]
pub struct Listen<'a, S: ?Sized> {
    subscription: &'a mut S,
}

impl<S: ChangeSubscription + ?Sized> Iterator for Listen<'_, S> {
    type Item = ChangeEvent;

    fn next(&mut self) -> Option<ChangeEvent> {
        self.subscription.next_change()
    }
}

/// Iterate over changes as they arrive, blocking between them.
pub fn listen<S: ChangeSubscription + ?Sized>(subscription: &mut S) -> Listen<'_, S> {
    Listen { subscription }
}

/// Subscription backed by a `notify` watcher on a local directory tree
pub struct WatcherSubscription {
    // Keeps the producer alive; dropping it closes the channel
    _watcher: Box<dyn Watcher + Send>,
    rx: Receiver<notify::Result<notify::Event>>,
    root: PathBuf,
    pending: VecDeque<ChangeEvent>,
}

impl WatcherSubscription {
    /// Watch `target` recursively, reporting paths relative to `root`.
    ///
    /// With `poll_interval` set, a polling watcher is used instead of the
    /// platform's native notification API.
    pub fn start(
        root: &Path,
        target: &Path,
        poll_interval: Option<Duration>,
    ) -> notify::Result<Self> {
        let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();

        let mut watcher: Box<dyn Watcher + Send> = match poll_interval {
            Some(interval) => {
                info!(
                    "Starting polling watcher for {} (every {:?})",
                    target.display(),
                    interval
                );
                let config = notify::Config::default().with_poll_interval(interval);
                Box::new(PollWatcher::new(tx, config)?)
            }
            None => {
                info!("Starting file watcher for {}", target.display());
                Box::new(notify::recommended_watcher(tx)?)
            }
        };

        watcher.watch(target, RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            root: root.to_path_buf(),
            pending: VecDeque::new(),
        })
    }

    fn accept(&mut self, result: notify::Result<notify::Event>) {
        match result {
            Ok(event) => self.pending.extend(convert_event(&self.root, event)),
            Err(e) => warn!("File watcher error: {}", e),
        }
    }
}

impl ChangeSubscription for WatcherSubscription {
    fn next_change(&mut self) -> Option<ChangeEvent> {
        loop {
            if let Some(change) = self.pending.pop_front() {
                return Some(change);
            }

            match self.rx.recv() {
                Ok(result) => self.accept(result),
                Err(_) => {
                    debug!("Watcher channel closed for {}", self.root.display());
                    return None;
                }
            }
        }
    }

    fn drain(&mut self) -> Vec<ChangeEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(result) => self.accept(result),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.pending.drain(..).collect()
    }
}
