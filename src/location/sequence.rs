//! Request sequencing for stale-response suppression.
//!
//! Searches are cheap and never cancelled. Callers tag each one with an id
//! from [`RequestSequencer::issue`], the server echoes it back, and the
//! caller drops any response that [`RequestSequencer::is_current`] rejects.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id. Ids start at 1 and strictly increase.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// The most recently issued id, 0 if none.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// True only for the most recently issued id. Ids never issued are
    /// rejected.
    pub fn is_current(&self, id: u64) -> bool {
        id != 0 && id == self.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_older_responses_are_stale() {
        let seq = RequestSequencer::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }

    #[test]
    fn test_fresh_sequencer() {
        let seq = RequestSequencer::new();
        assert_eq!(seq.latest(), 0);
        assert!(!seq.is_current(0));
        assert_eq!(seq.issue(), 1);
    }

    #[test]
    fn test_unissued_ids_are_not_current() {
        let seq = RequestSequencer::new();
        let id = seq.issue();
        assert!(seq.is_current(id));
        assert!(!seq.is_current(id + 1));
        assert!(!seq.is_current(u64::MAX));
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let seq = Arc::new(RequestSequencer::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || (0..250).map(|_| seq.issue()).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 1000);
        assert_eq!(seq.latest(), 1000);
    }
}
