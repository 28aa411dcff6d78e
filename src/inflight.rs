// src/inflight.rs
//! In-flight request registry: concurrent callers for the same key share one
//! computation instead of each issuing its own paid call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use metrics::counter;
use tokio::sync::OnceCell;

pub struct InflightRegistry<T> {
    slots: Mutex<HashMap<String, Arc<OnceCell<T>>>>,
}

impl<T: Clone> InflightRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Run `make` for `key` unless a call for the same key is already running,
    /// in which case wait for that call and return a clone of its output.
    ///
    /// If the driving caller is dropped mid-flight, a waiting caller takes over;
    /// with nobody waiting the slot is released. It is also released once a
    /// value exists, so later calls start fresh.
    pub async fn run<F, Fut>(&self, key: &str, make: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let (cell, joined) = {
            let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
            match slots.get(key) {
                Some(c) => (c.clone(), true),
                None => {
                    let c = Arc::new(OnceCell::new());
                    slots.insert(key.to_string(), c.clone());
                    (c, false)
                }
            }
        };

        if joined {
            counter!("inflight_joined_total").increment(1);
            tracing::debug!(target: "inflight", key, "joined in-flight call");
        }

        let guard = SlotGuard {
            slots: &self.slots,
            key,
            cell,
        };
        let out = guard.cell.get_or_init(make).await.clone();
        drop(guard);
        out
    }

    /// Number of keys with a call currently registered.
    pub fn pending(&self) -> usize {
        self.slots.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

/// Releases a caller's slot on completion or cancellation.
struct SlotGuard<'a, T> {
    slots: &'a Mutex<HashMap<String, Arc<OnceCell<T>>>>,
    key: &'a str,
    cell: Arc<OnceCell<T>>,
}

impl<T> Drop for SlotGuard<'_, T> {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        let ours = slots
            .get(self.key)
            .is_some_and(|c| Arc::ptr_eq(c, &self.cell));
        // Map + this guard are the only holders: no one is left to finish the call.
        let abandoned = Arc::strong_count(&self.cell) <= 2;
        if ours && (self.cell.initialized() || abandoned) {
            slots.remove(self.key);
        }
    }
}

impl<T: Clone> Default for InflightRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
