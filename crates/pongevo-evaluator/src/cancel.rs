use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Control value returned when evaluation stops because an abort was requested.
///
/// This is not a failure: it only tells the caller that no result was
/// produced and nothing further was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("evaluation aborted")]
pub struct Aborted;

/// Cooperative abort signal shared between the requester and the simulation.
///
/// Clones share the same flag. The simulation polls it once per tick and once
/// per match boundary.
#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(Aborted)` once the token has been cancelled.
    pub fn check(&self) -> Result<(), Aborted> {
        if self.is_cancelled() {
            Err(Aborted)
        } else {
            Ok(())
        }
    }
}
