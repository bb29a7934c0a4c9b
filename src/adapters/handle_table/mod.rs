// Handle table adapter - Tracks transient segment handles

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::ports::HandleRegistry;

/// In-process handle registry
///
/// Plays the role object URLs play in a browser: one live entry per
/// segment artifact until it is revoked.
#[derive(Debug, Default)]
pub struct HandleTable {
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, String>>,
    revoked: AtomicUsize,
}

impl HandleTable {
    /// Create an empty handle table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles allocated and not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    /// Number of successful revocations so far
    pub fn revoked_count(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }

    pub fn is_live(&self, id: u64) -> bool {
        self.live
            .lock()
            .map(|live| live.contains_key(&id))
            .unwrap_or(false)
    }
}

impl HandleRegistry for HandleTable {
    fn register(&self, name: &str, size: u64) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut live) = self.live.lock() {
            live.insert(id, name.to_string());
        }
        debug!(handle = id, name, size, "Allocated segment handle");
        id
    }

    fn revoke(&self, id: u64) {
        let removed = self.live.lock().ok().and_then(|mut live| live.remove(&id));
        match removed {
            Some(name) => {
                self.revoked.fetch_add(1, Ordering::SeqCst);
                debug!(handle = id, name = %name, "Revoked segment handle");
            }
            None => warn!(handle = id, "Revoke requested for unknown handle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_revoke() {
        let table = HandleTable::new();
        let a = table.register("a.mp4", 10);
        let b = table.register("b.mp4", 20);
        assert_ne!(a, b);
        assert_eq!(table.live_count(), 2);

        table.revoke(a);
        assert!(!table.is_live(a));
        assert!(table.is_live(b));
        assert_eq!(table.revoked_count(), 1);
    }

    #[test]
    fn test_unknown_revoke_is_not_counted() {
        let table = HandleTable::new();
        table.revoke(99);
        assert_eq!(table.revoked_count(), 0);
    }
}
