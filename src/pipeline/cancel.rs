use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender};

#[derive(Debug)]
struct CancelState {
    cancelled: AtomicBool,
    // Never sent on. Dropping it disconnects every token's `signal`, which
    // wakes any `select!` waiting on it.
    trigger: Mutex<Option<Sender<()>>>,
}

/// Cancels a running stream. Cheap to clone and safe to use from any thread.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    state: Arc<CancelState>,
}

impl CancelHandle {
    /// Raises the cancellation signal. Idempotent.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            let trigger = self
                .state
                .trigger
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            drop(trigger);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}

/// The observing side, held by every stage and the producer.
#[derive(Debug, Clone)]
pub(crate) struct CancellationToken {
    state: Arc<CancelState>,
    signal: Receiver<()>,
}

impl CancellationToken {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Becomes ready (disconnected) once cancellation is raised.
    pub(crate) fn signal(&self) -> &Receiver<()> {
        &self.signal
    }
}

pub(crate) fn cancellation() -> (CancelHandle, CancellationToken) {
    let (trigger, signal) = bounded(0);
    let state = Arc::new(CancelState {
        cancelled: AtomicBool::new(false),
        trigger: Mutex::new(Some(trigger)),
    });
    (
        CancelHandle { state: Arc::clone(&state) },
        CancellationToken { state, signal },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::select;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn token_sees_cancel() {
        let (handle, token) = cancellation();
        assert!(!token.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
        assert!(token.signal().recv().is_err());
    }

    #[test]
    fn cancel_wakes_blocked_select() {
        let (handle, token) = cancellation();
        let (_tx, rx) = bounded::<u32>(1);
        let waiter = thread::spawn(move || {
            select! {
                recv(rx) -> _ => false,
                recv(token.signal()) -> _ => true,
            }
        });
        thread::sleep(Duration::from_millis(20));
        handle.cancel();
        assert!(waiter.join().unwrap());
    }
}
