//! Database retry policy
//!
//! Two levels: a storage-id lookup is retried at most `lookup_retries` times,
//! each retry preceded by a full reconnect. The reconnect itself never gives
//! up and keeps trying with a fixed delay.

use std::time::Duration;
use tracing::{info, warn};

use crate::database::{DatabaseError, MetadataStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub lookup_retries: u32,
    pub reconnect_delay: Duration,
}

/// Successful result plus how many reconnects it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt<T> {
    pub value: T,
    pub reconnects: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            lookup_retries: 1,
            reconnect_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            reconnect_delay,
            ..Self::default()
        }
    }

    /// Run `op`, reconnecting and retrying on transient failures.
    /// Non-transient errors and the error of the final attempt are returned.
    pub fn run<S, T, F>(&self, store: &mut S, mut op: F) -> Result<Attempt<T>, DatabaseError>
    where
        S: MetadataStore + ?Sized,
        F: FnMut(&mut S) -> Result<T, DatabaseError>,
    {
        let mut reconnects = 0;
        loop {
            match op(store) {
                Ok(value) => return Ok(Attempt { value, reconnects }),
                Err(e) if e.is_transient() && reconnects < self.lookup_retries => {
                    warn!("Error while trying to find correct storage ids: {}", e);
                    self.reconnect(store);
                    reconnects += 1;
                    info!("Needed to reconnect to the database");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Close the connection and reopen it until the store reports a live
    /// connection, waiting `reconnect_delay` between failed attempts. Returns
    /// the number of attempts it took.
    pub fn reconnect<S: MetadataStore + ?Sized>(&self, store: &mut S) -> u32 {
        store.close();

        let mut attempts = 0;
        loop {
            attempts += 1;
            match store.connect() {
                Ok(()) if store.is_connected() => return attempts,
                Ok(()) => {
                    warn!(
                        "Reopened database connection is not usable (attempt {})",
                        attempts
                    );
                    store.close();
                }
                Err(e) => {
                    warn!(
                        "Error while attempting to reconnect to database (attempt {}): {}",
                        attempts, e
                    );
                }
            }
            std::thread::sleep(self.reconnect_delay);
        }
    }
}
