use std::{
    sync::{
        mpsc::{Receiver, RecvTimeoutError},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use crate::move_event::MoveEvent;

/// Wait slice for one lock-holding receive. Waiting in short slices keeps
/// a long-blocked subscriber from pinning the receiver while the engine
/// wants to drain it between runs.
const RECV_SLICE: Duration = Duration::from_millis(5);

/// Read side of the engine's move-event feed.
///
/// Events are handed out at most once each: concurrent streams split the
/// feed between them rather than each seeing every event.
pub struct EventStream {
    pub(crate) receiver: Arc<Mutex<Receiver<MoveEvent>>>,
}

impl EventStream {
    /// Blocks up to `timeout` for the next event. `None` means the
    /// timeout elapsed without one (or the engine is gone), not that the
    /// search is over; whether a result exists is a separate query.
    pub fn next(&self, timeout: Duration) -> Option<MoveEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let wait = deadline
                .saturating_duration_since(Instant::now())
                .min(RECV_SLICE);

            match self.receiver.lock().unwrap().recv_timeout(wait) {
                Ok(event) => return Some(event),
                Err(RecvTimeoutError::Timeout) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Non-blocking variant of [`next`][Self::next].
    pub fn try_next(&self) -> Option<MoveEvent> {
        self.receiver.lock().unwrap().try_recv().ok()
    }
}
