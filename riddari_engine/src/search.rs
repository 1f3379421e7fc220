use std::{
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        mpsc::{SyncSender, TrySendError},
        Mutex,
    },
    thread,
    time::Duration,
};

use riddari_core::board::{Board, Square};

use crate::{
    move_event::MoveEvent, move_ordering::ordered_candidates, search_stats::SearchStats,
};

/// How long an emit waits between retries while the event channel is
/// full. The channel holds several boards' worth of events, so a healthy
/// consumer never lets it get here.
const EMIT_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Move log and counters mirrored out of the search thread.
///
/// One lock guards both, so a concurrent reader never observes a
/// half-applied update (a placed move without its counter, or vice
/// versa).
#[derive(Debug, Default)]
pub(crate) struct SearchLog {
    pub(crate) moves: Vec<MoveEvent>,
    pub(crate) stats: SearchStats,
}

/// How a search finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchOutcome {
    /// A complete tour was found.
    Complete,
    /// The whole tree was explored without finding a tour.
    Exhausted,
    /// Cancellation was observed before either of the above.
    Aborted,
}

/// Call-stack-shaped state of one in-flight search.
///
/// Only this context (on the search thread) ever touches the board;
/// everything another thread may read goes through the shared log.
pub(crate) struct SearchContext<'a> {
    board: &'a mut Board,
    log: &'a Mutex<SearchLog>,
    events: SyncSender<MoveEvent>,
    completion: SyncSender<SearchOutcome>,
    abort_flag: &'a AtomicBool,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        board: &'a mut Board,
        log: &'a Mutex<SearchLog>,
        events: SyncSender<MoveEvent>,
        completion: SyncSender<SearchOutcome>,
        abort_flag: &'a AtomicBool,
    ) -> Self {
        Self {
            board,
            log,
            events,
            completion,
            abort_flag,
        }
    }

    fn is_aborted(&self) -> bool {
        self.abort_flag.load(AtomicOrdering::Relaxed)
    }

    /// Pushes `event` into the bounded channel, waiting for room if the
    /// consumer has fallen behind. Returns false (dropping the event) if
    /// cancellation fires while waiting, so a full channel can stall the
    /// search but never wedge it.
    fn emit(&self, event: MoveEvent) -> bool {
        let mut event = event;
        loop {
            if self.is_aborted() {
                return false;
            }

            match self.events.try_send(event) {
                Ok(()) => return true,
                Err(TrySendError::Full(returned)) => {
                    event = returned;
                    thread::sleep(EMIT_RETRY_INTERVAL);
                }
                // Receiver gone means the engine itself is gone.
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
    }

    /// Tries to extend the tour by playing move `index` on `square`,
    /// recursing over onward candidates in Warnsdorff order.
    ///
    /// Returns true as soon as any continuation completes the tour,
    /// without trying further candidates. Otherwise restores the square,
    /// reports the backtrack, and returns false. A false return after
    /// cancellation carries no meaning; the coordinator classifies the
    /// outcome from the abort flag.
    pub fn attempt_square(&mut self, square: Square, index: u32) -> bool {
        // Cancellation short-circuits before any further mutation.
        if self.is_aborted() {
            return false;
        }

        {
            let mut log = self.log.lock().unwrap();
            log.stats.attempts += 1;
            log.stats.max_depth = log.stats.max_depth.max(index);
        }

        self.board.place(square, index);
        let placed = MoveEvent::placement(square, index);
        if !self.emit(placed) {
            return false;
        }
        {
            let mut log = self.log.lock().unwrap();
            log.moves.push(placed);
            log.stats.placements += 1;
        }

        if self.board.is_complete() {
            // The sole terminal success state.
            let _ = self.completion.send(SearchOutcome::Complete);
            return true;
        }

        for candidate in ordered_candidates(self.board, square) {
            if self.attempt_square(candidate.square, index + 1) {
                return true;
            }
        }

        // Dead end. Re-check cancellation first: once it is observed the
        // search must unwind without further board writes or events.
        if self.is_aborted() {
            return false;
        }

        self.board.clear(square);
        if !self.emit(MoveEvent::backtrack(square)) {
            return false;
        }
        {
            let mut log = self.log.lock().unwrap();
            log.moves.pop();
            log.stats.backtracks += 1;
        }

        false
    }
}
