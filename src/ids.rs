use std::sync::atomic::{AtomicU64, Ordering};

use crate::state::TabId;

/// Hands out unique, monotonically increasing tab ids.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Useful when restoring a session whose ids must not be reissued.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_id(&self) -> TabId {
        TabId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
        assert_eq!(a, TabId(1));
    }

    #[test]
    fn test_starting_at() {
        let ids = IdGenerator::starting_at(40);
        assert_eq!(ids.next_id(), TabId(40));
        assert_eq!(ids.next_id(), TabId(41));
    }
}
