//! The process-wide interrupt flag.
//!
//! A Ctrl+C handler may fire at any point, including while a command is
//! running, so all it does is store into an atomic. The read-eval loop
//! swap-clears the flag once per iteration, right before dispatch, and
//! drops the pending command when it was set. Nothing here blocks or takes
//! locks: the handler runs in signal-handling context.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the Ctrl+C handler.
///
/// Call once, before the loop starts; the handler stays installed for the
/// life of the process.
pub fn install() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))
}

/// Report whether an interrupt arrived since the last call, clearing the
/// flag in the same atomic step.
pub fn take() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_reports_once_then_clears() {
        INTERRUPTED.store(true, Ordering::SeqCst);
        assert!(take());
        assert!(!take());
    }
}
