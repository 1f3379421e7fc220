//! Knight move enumeration.

use arrayvec::ArrayVec;

use crate::board::Square;

/// The eight knight move offsets as `(rank delta, file delta)`.
///
/// The enumeration order is fixed and observable: candidate ordering
/// keeps it for equally accessible destinations, so changing it changes
/// which tour the search finds first.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, -1),
    (2, 1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Destination squares a knight can reach from `square`, in offset
/// enumeration order.
///
/// Only destinations that stay within the representable coordinate range
/// are produced; whether a destination lies on a particular board (and is
/// unvisited) is checked against that board.
pub fn knight_destinations(square: Square) -> ArrayVec<Square, 8> {
    KNIGHT_OFFSETS
        .iter()
        .filter_map(|&(rank_delta, file_delta)| square.offset(rank_delta, file_delta))
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn corner_has_two_destinations_in_enumeration_order() {
        let destinations = knight_destinations(Square::new(0, 0));

        assert_eq!(
            destinations.as_slice(),
            &[Square::new(2, 1), Square::new(1, 2)]
        );
    }

    #[test]
    fn interior_square_has_all_eight() {
        let destinations = knight_destinations(Square::new(4, 4));

        assert_eq!(
            destinations.as_slice(),
            &[
                Square::new(6, 3),
                Square::new(6, 5),
                Square::new(2, 5),
                Square::new(2, 3),
                Square::new(5, 6),
                Square::new(5, 2),
                Square::new(3, 6),
                Square::new(3, 2),
            ]
        );
    }

    #[test]
    fn destinations_are_symmetric() {
        let from = Square::new(3, 5);
        for to in knight_destinations(from) {
            assert!(
                knight_destinations(to).contains(&from),
                "{to} does not reach back to {from}"
            );
        }
    }
}
