//! Suspension deadlines: per-route and global "do not send before" points.
//!
//! Deadlines are absolute clock milliseconds (see [`Clock`]); `0` means "not
//! suspended". The per-route map and the global point are synchronized
//! independently, so recording one route's deadline never blocks dispatch on
//! another route.
//!
//! Clearing is freshness-checked: a waiter that slept out deadline `d` only
//! removes `d`. If a concurrent attempt recorded a newer deadline while the
//! waiter slept, the newer one survives.
//!
//! [`Clock`]: crate::clock::Clock

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::route::RouteKey;

/// Shared store of suspension deadlines.
#[derive(Debug, Default)]
pub struct SuspensionStore {
    routes: Mutex<HashMap<RouteKey, u64>>,
    global: AtomicU64,
}

impl SuspensionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current per-route deadline, if one is recorded.
    pub fn suspension_for(&self, key: &RouteKey) -> Option<u64> {
        self.routes.lock().unwrap().get(key).copied()
    }

    /// Record or overwrite a per-route deadline.
    pub fn set_suspension(&self, key: &RouteKey, deadline: u64) {
        self.routes.lock().unwrap().insert(key.clone(), deadline);
    }

    /// Remove the route's entry, but only if it still holds `deadline`.
    pub fn clear_suspension(&self, key: &RouteKey, deadline: u64) {
        let mut routes = self.routes.lock().unwrap();
        if routes.get(key) == Some(&deadline) {
            routes.remove(key);
        }
    }

    /// Current global deadline; `0` when not suspended.
    pub fn global_suspension(&self) -> u64 {
        self.global.load(Ordering::Acquire)
    }

    /// Record or overwrite the global deadline.
    pub fn set_global_suspension(&self, deadline: u64) {
        self.global.store(deadline, Ordering::Release);
    }

    /// Reset the global deadline to none, but only if it is still `deadline`.
    pub fn clear_global_suspension(&self, deadline: u64) {
        let _ = self.global.compare_exchange(deadline, 0, Ordering::AcqRel, Ordering::Relaxed);
    }
}
