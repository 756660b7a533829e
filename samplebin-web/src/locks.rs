//! Per-sample write serialization
//!
//! Two concurrent modify requests for the same sample name would otherwise
//! interleave their read-validate-write-cleanup sequences. Each name gets its
//! own async mutex; independent names proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Map of per-sample-name async mutexes
///
/// Entries are created on first use. Every acquisition prunes entries no
/// request currently holds or awaits, so names of deleted samples do not
/// accumulate in the map.
#[derive(Clone, Default)]
pub struct SampleLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl SampleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a sample name, waiting if another request holds it
    pub async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().expect("lock map poisoned");
            // Guards and waiters hold clones of the Arc; a count of one means
            // the map's own reference is the last
            map.retain(|_, mutex| Arc::strong_count(mutex) > 1);
            map.entry(name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.inner.lock().expect("lock map poisoned").len()
    }
}
