//! Single-fire completion signal.
//!
//! A backend receives a [`Completion`] and fires it once its work is durably
//! done. The lifecycle holds the matching [`CompletionWaiter`]. Clones of a
//! completion share one fired flag, so only the first `complete` call is
//! delivered and later ones are no-ops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

/// Sending half of a completion signal.
#[derive(Debug, Clone)]
pub struct Completion {
    fired: Arc<AtomicBool>,
    sender: SyncSender<()>,
}

/// Receiving half of a completion signal.
#[derive(Debug)]
pub struct CompletionWaiter {
    fired: Arc<AtomicBool>,
    receiver: Receiver<()>,
}

/// The completion was dropped without ever being fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionDropped;

/// Creates a connected completion/waiter pair.
pub fn completion_channel() -> (Completion, CompletionWaiter) {
    let fired = Arc::new(AtomicBool::new(false));
    let (sender, receiver) = sync_channel(1);
    (
        Completion {
            fired: Arc::clone(&fired),
            sender,
        },
        CompletionWaiter { fired, receiver },
    )
}

impl Completion {
    /// Fires the signal.
    ///
    /// Returns `true` for the call that delivered it and `false` for every
    /// later call on this completion or any clone of it.
    pub fn complete(self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            tracing::warn!("completion signalled more than once; ignoring");
            return false;
        }
        // the waiter may already be gone; nothing is listening then
        let _ = self.sender.try_send(());
        true
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl CompletionWaiter {
    /// Blocks until the completion fires.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionDropped`] if every clone of the completion was
    /// dropped without firing.
    pub fn wait(self) -> Result<(), CompletionDropped> {
        self.receiver.recv().map_err(|_| CompletionDropped)
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_delivers_once() {
        let (completion, waiter) = completion_channel();
        let duplicate = completion.clone();

        assert!(completion.complete());
        assert!(!duplicate.complete());
        assert!(waiter.is_fired());
        assert_eq!(waiter.wait(), Ok(()));
    }

    #[test]
    fn test_dropped_completion_is_detected() {
        let (completion, waiter) = completion_channel();
        drop(completion);

        assert_eq!(waiter.wait(), Err(CompletionDropped));
    }

    #[test]
    fn test_complete_from_another_thread() {
        let (completion, waiter) = completion_channel();

        let handle = std::thread::spawn(move || completion.complete());

        assert_eq!(waiter.wait(), Ok(()));
        assert!(handle.join().unwrap());
    }
}
