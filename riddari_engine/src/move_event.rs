use riddari_core::board::Square;

/// One unit of observable search progress: a knight placement or the
/// backtrack that undoes one.
///
/// Produced only by the search; immutable once created. Each event is
/// delivered through the event channel to at most one consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveEvent {
    pub square: Square,
    /// 1-based move index for placements; 0 for backtrack clears.
    pub index: u32,
    pub kind: MoveEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEventKind {
    Placement,
    Backtrack,
}

impl MoveEvent {
    pub fn placement(square: Square, index: u32) -> Self {
        Self {
            square,
            index,
            kind: MoveEventKind::Placement,
        }
    }

    pub fn backtrack(square: Square) -> Self {
        Self {
            square,
            index: 0,
            kind: MoveEventKind::Backtrack,
        }
    }

    pub fn is_backtrack(self) -> bool {
        self.kind == MoveEventKind::Backtrack
    }
}
