use std::time::Duration;

use crate::{move_event::MoveEvent, search_stats::SearchStats};

/// Final outcome of one tour search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// True iff a complete tour was found.
    pub solved: bool,
    /// True iff the search was cancelled rather than left to finish;
    /// distinguishes "told to stop" from "no tour exists".
    pub aborted: bool,
    /// The tour as its placement events in order. Populated only on
    /// success; a cancelled or exhausted search never hands back a
    /// partial path.
    pub moves: Vec<MoveEvent>,
    pub stats: SearchStats,
    pub elapsed: Duration,
}
