//! The celebration banner and its dismissal timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// How long the banner stays up after the last trigger.
pub const CELEBRATION_DURATION: Duration = Duration::from_secs(3);

/// A flag that turns itself off a fixed time after it was last raised.
///
/// Raising it again while a dismissal is pending restarts the countdown.
/// Must be used from within a tokio runtime.
#[derive(Debug, Default)]
pub struct Celebration {
    active: Arc<AtomicBool>,
    dismiss: Option<JoinHandle<()>>,
}

impl Celebration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and (re)start the dismissal countdown.
    pub fn trigger(&mut self) {
        if let Some(pending) = self.dismiss.take() {
            pending.abort();
        }

        self.active.store(true, Ordering::SeqCst);
        let active = Arc::clone(&self.active);
        self.dismiss = Some(tokio::spawn(async move {
            tokio::time::sleep(CELEBRATION_DURATION).await;
            active.store(false, Ordering::SeqCst);
        }));
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Celebration {
    fn drop(&mut self) {
        if let Some(pending) = self.dismiss.take() {
            pending.abort();
        }
    }
}
