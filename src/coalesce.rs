use std::{collections::HashMap, future::Future};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::Result;

type Waiters<T> = Vec<oneshot::Sender<Result<T>>>;

/// Deduplicates concurrent loads of the same key.
///
/// The first caller for a key runs the load; callers arriving while it is in
/// flight wait for its outcome instead of starting their own. Nothing is kept
/// once the load finishes, so the next call for that key runs again. If the
/// leading call is dropped before finishing, one of its waiters takes over.
pub struct CallCoalescer<T> {
    /// Keys with a load in flight, with the callers waiting on it
    calls: Mutex<HashMap<String, Waiters<T>>>,
}

impl<T> Default for CallCoalescer<T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> CallCoalescer<T>
where
    T: Clone + Send,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn execute<F, Fut>(&self, key: &str, load: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        loop {
            let rx = {
                let mut calls = self.calls.lock();
                match calls.get_mut(key) {
                    Some(waiters) => {
                        let (tx, rx) = oneshot::channel();
                        waiters.push(tx);
                        rx
                    }
                    None => {
                        calls.insert(key.to_string(), Vec::new());
                        break;
                    }
                }
            };

            match rx.await {
                Ok(result) => return result,
                // The leader was dropped mid-load; race to take its place
                Err(_) => debug!("Load of {} abandoned by its caller, retrying", key),
            }
        }

        let mut flight = InFlight {
            calls: &self.calls,
            key,
            landed: false,
        };
        let result = load().await;
        for waiter in flight.land() {
            // A waiter that gave up is not our concern
            let _ = waiter.send(result.clone());
        }
        result
    }

    /// Number of keys with a load currently in flight
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Removes the in-flight record when the leading call finishes or is dropped.
struct InFlight<'a, T> {
    calls: &'a Mutex<HashMap<String, Waiters<T>>>,
    key: &'a str,
    landed: bool,
}

impl<T> InFlight<'_, T> {
    fn land(&mut self) -> Waiters<T> {
        self.landed = true;
        self.calls.lock().remove(self.key).unwrap_or_default()
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.landed {
            // Dropping the senders wakes every waiter so one can take over
            self.calls.lock().remove(self.key);
        }
    }
}
