use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stale-response guard for a rendering target.
///
/// Each request made on behalf of a target takes a `Ticket`. Issuing a newer
/// ticket, or tearing the target down with `invalidate`, makes every older
/// ticket stale; a response carrying a stale ticket must not be applied.
/// The cache entry itself is unaffected.
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    generation: Arc<AtomicU64>,
}

/// Proof that a response was requested for a particular generation
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request generation, superseding all outstanding tickets
    pub fn issue(&self) -> Ticket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    /// Tear down: outstanding tickets become stale without issuing a new one
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
