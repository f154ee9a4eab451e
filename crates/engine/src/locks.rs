//! Per-user serialization of the aggregate check and the insert.
//!
//! The risk rules read rolling sums and counts and then write a new row.
//! Two candidates touching the same user must not interleave between those
//! steps, otherwise both could pass a cap that only one of them fits under.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Holds every lock acquired by [`KeyedLocks::lock`] until dropped.
#[derive(Debug)]
pub(crate) struct KeyedGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    /// Locks all `keys`. Keys are sorted and deduplicated first so that two
    /// callers locking overlapping sets cannot deadlock.
    pub(crate) async fn lock<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> KeyedGuard {
        let mut keys: Vec<&str> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let slot = self.slot(key).await;
            guards.push(slot.lock_owned().await);
        }
        KeyedGuard { _guards: guards }
    }

    async fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().await;
        // Slots only referenced by the map are idle.
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        slots.entry(key.to_string()).or_default().clone()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}
