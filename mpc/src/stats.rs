use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// A snapshot of the communication a backend has performed.
///
/// `rounds` counts batched network exchanges. When independent computations run concurrently
/// their rounds are counted separately even if a real network would overlap them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommunicationStats {
    /// Number of opening rounds, including those performed inside secure multiplications.
    pub rounds: usize,
    /// Number of field elements opened across all rounds.
    pub opened_elements: usize,
    /// Number of secure (share times share) multiplications.
    pub multiplications: usize,
}

impl CommunicationStats {
    /// The communication performed between `earlier` and `self`.
    #[must_use]
    pub fn since(&self, earlier: &Self) -> Self {
        Self {
            rounds: self.rounds - earlier.rounds,
            opened_elements: self.opened_elements - earlier.opened_elements,
            multiplications: self.multiplications - earlier.multiplications,
        }
    }
}

/// Thread-safe counters backing [`CommunicationStats`].
#[derive(Debug, Default)]
pub struct CommunicationCounter {
    rounds: AtomicUsize,
    opened_elements: AtomicUsize,
    multiplications: AtomicUsize,
}

impl CommunicationCounter {
    pub fn record_opening(&self, elements: usize) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
        self.opened_elements.fetch_add(elements, Ordering::Relaxed);
    }

    pub fn record_multiplications(&self, count: usize) {
        self.multiplications.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CommunicationStats {
        CommunicationStats {
            rounds: self.rounds.load(Ordering::Relaxed),
            opened_elements: self.opened_elements.load(Ordering::Relaxed),
            multiplications: self.multiplications.load(Ordering::Relaxed),
        }
    }
}
