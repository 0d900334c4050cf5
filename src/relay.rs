//! Single-slot hand-off from board taps to the human move source.
//!
//! There is no queue. At most one waiter is pending at a time, and a tap that
//! arrives while nobody is waiting is dropped. A newer waiter supersedes an
//! older one.

use derive_more::{Display, Error};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strictly_checkers::Position;
use tokio::sync::oneshot;
use tracing::{debug, instrument, trace};

/// Why a wait on the relay ended without a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum RelayError {
    /// The relay was closed; no more taps will arrive.
    #[display("Tap relay closed")]
    Closed,
    /// Another waiter took over the slot.
    #[display("Tap wait superseded by a newer waiter")]
    Superseded,
}

#[derive(Debug, Default)]
struct Slot {
    waiter: Option<oneshot::Sender<Position>>,
    closed: bool,
}

/// Thread-safe tap relay.
///
/// Clones share the same slot, so the presentation side can keep one handle
/// while the human move source holds another.
#[derive(Debug, Clone, Default)]
pub struct TapRelay {
    slot: Arc<Mutex<Slot>>,
}

impl TapRelay {
    /// Creates an open relay with no waiter.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands `position` to the pending waiter.
    ///
    /// Returns `false` when nobody was waiting and the tap was dropped.
    /// Callable from any thread, including non-async UI threads.
    #[instrument(skip_all, fields(position = %position))]
    pub fn notify_tap(&self, position: Position) -> bool {
        let waiter = self.lock().waiter.take();
        match waiter.map(|tx| tx.send(position)) {
            Some(Ok(())) => {
                trace!("Tap delivered");
                true
            }
            Some(Err(_)) => {
                debug!("Waiter went away, tap dropped");
                false
            }
            None => {
                debug!("No pending waiter, tap dropped");
                false
            }
        }
    }

    /// Waits for the next tap published after this call.
    ///
    /// # Errors
    ///
    /// [`RelayError::Superseded`] if another `next_tap` call took the slot,
    /// [`RelayError::Closed`] if the relay is or becomes closed.
    pub async fn next_tap(&self) -> Result<Position, RelayError> {
        let rx = {
            let mut slot = self.lock();
            if slot.closed {
                return Err(RelayError::Closed);
            }
            let (tx, rx) = oneshot::channel();
            if slot.waiter.replace(tx).is_some() {
                debug!("Superseded pending tap waiter");
            }
            rx
        };

        match rx.await {
            Ok(position) => Ok(position),
            Err(_) if self.lock().closed => Err(RelayError::Closed),
            Err(_) => Err(RelayError::Superseded),
        }
    }

    /// True while a waiter is registered and still listening.
    pub fn is_waiting(&self) -> bool {
        self.lock()
            .waiter
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Closes the relay, failing the pending and all future waits.
    #[instrument(skip(self))]
    pub fn close(&self) {
        let mut slot = self.lock();
        slot.closed = true;
        if slot.waiter.take().is_some() {
            debug!("Released pending waiter on close");
        }
    }
}
