//! Warnsdorff candidate ordering.

use arrayvec::ArrayVec;

use riddari_core::{
    board::{Board, Square},
    move_gen::knight_destinations,
};

/// A destination under consideration within one recursion frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCandidate {
    pub square: Square,
    /// Onward knight moves available from `square` (Warnsdorff score).
    pub accessibility: u32,
}

/// Legal onward moves from `from`, most constrained first.
///
/// Warnsdorff's rule: trying the square with the fewest onward moves
/// first minimizes dead ends. The sort is stable, so equally accessible
/// destinations stay in offset enumeration order and the search visits
/// the same squares in the same order on every run.
pub fn ordered_candidates(board: &Board, from: Square) -> ArrayVec<MoveCandidate, 8> {
    let mut candidates: ArrayVec<MoveCandidate, 8> = knight_destinations(from)
        .into_iter()
        .filter(|&square| board.is_legal_move(square))
        .map(|square| MoveCandidate {
            square,
            accessibility: board.accessibility(square),
        })
        .collect();

    candidates.sort_by_key(|candidate| candidate.accessibility);
    candidates
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn squares(candidates: &[MoveCandidate]) -> Vec<Square> {
        candidates.iter().map(|candidate| candidate.square).collect()
    }

    #[test]
    fn all_tied_candidates_keep_offset_enumeration_order() {
        let mut board = Board::new(5);
        board.place(Square::new(2, 2), 1);

        let candidates = ordered_candidates(&board, Square::new(2, 2));

        // Every destination of the 5x5 center scores 2 once the center
        // itself is occupied, so the stable sort must not reorder them.
        assert!(candidates
            .iter()
            .all(|candidate| candidate.accessibility == 2));
        assert_eq!(
            squares(&candidates),
            vec![
                Square::new(4, 1),
                Square::new(4, 3),
                Square::new(0, 3),
                Square::new(0, 1),
                Square::new(3, 4),
                Square::new(3, 0),
                Square::new(1, 4),
                Square::new(1, 0),
            ]
        );
    }

    #[test]
    fn candidates_sort_ascending_with_stable_ties() {
        let mut board = Board::new(5);
        board.place(Square::new(1, 2), 1);

        let candidates = ordered_candidates(&board, Square::new(1, 2));

        // The two corner-adjacent destinations score 1; the remaining
        // four all score 3 and keep enumeration order among themselves.
        assert_eq!(
            squares(&candidates),
            vec![
                Square::new(0, 4),
                Square::new(0, 0),
                Square::new(3, 1),
                Square::new(3, 3),
                Square::new(2, 4),
                Square::new(2, 0),
            ]
        );
        assert_eq!(
            candidates
                .iter()
                .map(|candidate| candidate.accessibility)
                .collect::<Vec<_>>(),
            vec![1, 1, 3, 3, 3, 3]
        );
    }

    #[test]
    fn visited_squares_are_not_candidates() {
        let mut board = Board::new(5);
        board.place(Square::new(0, 0), 1);
        board.place(Square::new(2, 1), 2);

        let candidates = ordered_candidates(&board, Square::new(2, 1));

        assert!(!squares(&candidates).contains(&Square::new(0, 0)));
    }

    #[test]
    fn ordering_is_reproducible() {
        let mut board = Board::new(8);
        board.place(Square::new(0, 0), 1);
        board.place(Square::new(2, 1), 2);
        board.place(Square::new(4, 2), 3);

        let first = ordered_candidates(&board, Square::new(4, 2));
        let second = ordered_candidates(&board, Square::new(4, 2));

        assert_eq!(first, second);
    }
}
