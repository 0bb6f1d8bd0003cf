//! Ctrl-C bookkeeping.
//!
//! The handler keeps SIGINT from ending the session. A streamed child
//! receives the signal itself (same process group) and exits; the action
//! that was waiting on it then sees the flag and reports a cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the process-wide handler. Call once, before the menu starts.
pub fn install() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
    })
}

/// Consume a pending interrupt, returning whether one happened
pub fn take() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// Forget any interrupt left over from a previous action
pub fn reset() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Serializes tests that touch the process-wide flag
#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Pretend Ctrl-C was pressed
#[cfg(test)]
pub(crate) fn raise() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes_flag() {
        let _lock = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        raise();
        assert!(take());
        assert!(!take());
    }
}
