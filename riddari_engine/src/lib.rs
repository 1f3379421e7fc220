use std::sync::{
    atomic::{AtomicBool, Ordering as AtomicOrdering},
    mpsc::{self, Receiver, RecvTimeoutError, SyncSender},
    Arc, Mutex,
};
use std::thread;
use std::time::{Duration, Instant};

use riddari_core::board::{Board, Square};
use thiserror::Error;

use crate::{
    event_stream::EventStream,
    move_event::MoveEvent,
    search::{SearchContext, SearchLog, SearchOutcome},
    search_result::SearchResult,
    search_stats::SearchStats,
};

pub mod event_stream;
pub mod move_event;
pub mod move_ordering;
pub mod search_result;
pub mod search_stats;

mod search;

/// Largest board side the engine accepts; depth-first search is not
/// tractable much past this, and it also bounds recursion depth (board
/// area frames) and the usefulness of the event channel capacity.
pub const MAX_BOARD_SIZE: u8 = 20;

/// Event channel capacity: several times the worst-case board area
/// (20 * 20 = 400), so the search practically never has to wait on a
/// healthy consumer.
pub const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// How often the coordinator re-checks its cancellation token while
/// waiting on the completion signal.
const COMPLETION_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cooperative stop signal for an in-flight search.
///
/// Clones observe the same underlying flag. The search checks it at the
/// top of every recursion frame and unwinds without further mutation or
/// emission once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Parameters for one tour search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveRequest {
    pub size: u8,
    pub start: Square,
}

impl SolveRequest {
    pub fn new(size: u8, start: Square) -> Self {
        Self { size, start }
    }

    /// Rejects configurations the search must never see. Checked
    /// synchronously by [`Engine::solve`] before any state changes.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.size == 0 || self.size > MAX_BOARD_SIZE {
            return Err(EngineError::InvalidBoardSize(self.size));
        }
        if self.start.rank() >= self.size || self.start.file() >= self.size {
            return Err(EngineError::StartOutOfBounds {
                start: self.start,
                size: self.size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("board size {0} is outside the supported range 1..={max}", max = MAX_BOARD_SIZE)]
    InvalidBoardSize(u8),
    #[error("start square {start} is outside the {size}x{size} board")]
    StartOutOfBounds { start: Square, size: u8 },
    #[error("search thread terminated unexpectedly")]
    SearchThreadFailed,
}

/// Mid-flight snapshot of a running search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    pub attempts: u64,
    /// Length of the current path prefix.
    pub path_len: u32,
}

/// One knight's tour search engine instance.
///
/// An engine owns the event channel, the mirrored move log, and the
/// abort flag of its current run. One search is in flight at a time;
/// starting a new one cancels the previous run and waits it out before
/// touching any shared state.
pub struct Engine {
    log: Arc<Mutex<SearchLog>>,
    last_result: Mutex<Option<SearchResult>>,
    events_tx: SyncSender<MoveEvent>,
    events_rx: Arc<Mutex<Receiver<MoveEvent>>>,
    curr_abort_flag: Mutex<Arc<AtomicBool>>,
    run_lock: Mutex<()>,
}

impl Engine {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::sync_channel(EVENT_CHANNEL_CAPACITY);

        Self {
            log: Arc::new(Mutex::new(SearchLog::default())),
            last_result: Mutex::new(None),
            events_tx,
            events_rx: Arc::new(Mutex::new(events_rx)),
            curr_abort_flag: Mutex::new(Arc::new(AtomicBool::new(false))),
            run_lock: Mutex::new(()),
        }
    }

    /// Runs one search to completion, exhaustion or cancellation.
    ///
    /// Blocks the caller until then; the search itself runs on a
    /// background thread so subscribers can drain move events while it
    /// progresses. The returned result is also readable afterwards via
    /// [`status`][Self::status]. Cancellation is reported in-band
    /// (`aborted: true`); `Err` means invalid configuration or a dead
    /// search thread.
    pub fn solve(
        &self,
        request: SolveRequest,
        token: &CancellationToken,
    ) -> Result<SearchResult, EngineError> {
        request.validate()?;

        // Starting a new search discards any previous one on this
        // engine. The run lock serializes us behind its unwinding.
        self.abort_search();
        let _running = self.run_lock.lock().unwrap();

        let abort_flag = Arc::new(AtomicBool::new(false));
        *self.curr_abort_flag.lock().unwrap() = abort_flag.clone();

        // Reset. Nothing from a previous run may leak into this one's
        // observations: not log entries, not buffered events, not the
        // previous result.
        {
            let mut log = self.log.lock().unwrap();
            log.moves.clear();
            log.stats = SearchStats::default();
        }
        *self.last_result.lock().unwrap() = None;
        self.drain_events();

        // Fresh one-shot completion signal per run; a stale signal from
        // a cancelled run is unrepresentable this way.
        let (completion_tx, completion_rx) = mpsc::sync_channel(1);

        let start_time = Instant::now();
        let worker = {
            let mut board = Board::new(request.size);
            let log = Arc::clone(&self.log);
            let events = self.events_tx.clone();
            let abort_flag = Arc::clone(&abort_flag);
            let start = request.start;

            thread::spawn(move || {
                let mut ctx = SearchContext::new(
                    &mut board,
                    &log,
                    events,
                    completion_tx.clone(),
                    &abort_flag,
                );

                let solved = ctx.attempt_square(start, 1);
                if !solved {
                    // Success signals itself from the terminal state;
                    // everything else is reported here once the root
                    // call has unwound.
                    let outcome = if abort_flag.load(AtomicOrdering::Relaxed) {
                        SearchOutcome::Aborted
                    } else {
                        SearchOutcome::Exhausted
                    };
                    let _ = completion_tx.send(outcome);
                }
            })
        };

        // Race the completion signal against external cancellation.
        let outcome = loop {
            if token.is_cancelled() {
                abort_flag.store(true, AtomicOrdering::Relaxed);
                break SearchOutcome::Aborted;
            }

            match completion_rx.recv_timeout(COMPLETION_POLL_INTERVAL) {
                Ok(outcome) => break outcome,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    let _ = worker.join();
                    self.log.lock().unwrap().moves.clear();
                    self.drain_events();
                    return Err(EngineError::SearchThreadFailed);
                }
            }
        };

        // The worker still observes cancellation internally; wait for it
        // to actually unwind before reading the log. Its bounded sends
        // wake on the abort flag, so this join cannot hang.
        if worker.join().is_err() {
            self.log.lock().unwrap().moves.clear();
            self.drain_events();
            return Err(EngineError::SearchThreadFailed);
        }

        let solved = outcome == SearchOutcome::Complete;
        let (moves, stats) = {
            let mut log = self.log.lock().unwrap();
            if solved {
                // Defensive copy: the result must stay valid after the
                // log is cleared for the next run.
                (log.moves.clone(), log.stats.clone())
            } else {
                // Never hand back a partial path as if it were a tour.
                log.moves.clear();
                (Vec::new(), log.stats.clone())
            }
        };
        if !solved {
            self.drain_events();
        }

        let result = SearchResult {
            solved,
            aborted: outcome == SearchOutcome::Aborted,
            moves,
            stats,
            elapsed: start_time.elapsed(),
        };
        *self.last_result.lock().unwrap() = Some(result.clone());

        Ok(result)
    }

    /// Cancels whatever search is currently running on this engine.
    pub fn abort_search(&self) {
        self.curr_abort_flag
            .lock()
            .unwrap()
            .store(true, AtomicOrdering::Relaxed);
    }

    /// Live feed of move events for the current (or most recent) run.
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            receiver: Arc::clone(&self.events_rx),
        }
    }

    /// Last completed result, or `None` if no run has finished yet (a
    /// starting run resets this).
    pub fn status(&self) -> Option<SearchResult> {
        self.last_result.lock().unwrap().clone()
    }

    /// Point-in-time view of the in-flight search.
    pub fn progress(&self) -> SearchProgress {
        let log = self.log.lock().unwrap();
        SearchProgress {
            attempts: log.stats.attempts,
            path_len: log.moves.len() as u32,
        }
    }

    fn drain_events(&self) {
        let receiver = self.events_rx.lock().unwrap();
        while receiver.try_recv().is_ok() {}
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.abort_search();
    }
}
