use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// Coordinate on a tour board.
///
/// A square carries no board size of its own; whether it lies on a
/// particular board is the board's question to answer (see
/// [`Board::is_legal_move`][crate::board::Board::is_legal_move]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    pub const fn new(rank: u8, file: u8) -> Self {
        Self { rank, file }
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }

    pub const fn file(self) -> u8 {
        self.file
    }

    /// Returns the square displaced by `(rank_delta, file_delta)`, or
    /// `None` if either coordinate would leave the representable range.
    pub fn offset(self, rank_delta: i8, file_delta: i8) -> Option<Self> {
        let rank = self.rank as i16 + rank_delta as i16;
        let file = self.file as i16 + file_delta as i16;

        if (0..=u8::MAX as i16).contains(&rank) && (0..=u8::MAX as i16).contains(&file) {
            Some(Self::new(rank as u8, file as u8))
        } else {
            None
        }
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.rank, self.file)
    }
}

/// Error parsing a square from its `rank,file` text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSquareError {
    #[error("expected a square of the form `rank,file`")]
    MissingSeparator,
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] std::num::ParseIntError),
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rank, file) = s
            .split_once(',')
            .ok_or(ParseSquareError::MissingSeparator)?;

        Ok(Self::new(rank.trim().parse()?, file.trim().parse()?))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn offset_within_range() {
        assert_eq!(Square::new(3, 4).offset(2, -1), Some(Square::new(5, 3)));
        assert_eq!(Square::new(0, 0).offset(1, 2), Some(Square::new(1, 2)));
    }

    #[test]
    fn offset_going_negative_is_none() {
        assert_eq!(Square::new(0, 0).offset(-1, 2), None);
        assert_eq!(Square::new(0, 0).offset(2, -1), None);
        assert_eq!(Square::new(1, 1).offset(-2, 1), None);
    }

    #[test]
    fn offset_overflowing_is_none() {
        assert_eq!(Square::new(255, 0).offset(1, 0), None);
        assert_eq!(Square::new(0, 255).offset(0, 2), None);
    }

    #[test]
    fn parses_rank_comma_file() {
        assert_eq!("0,0".parse(), Ok(Square::new(0, 0)));
        assert_eq!("3, 4".parse(), Ok(Square::new(3, 4)));
        assert_eq!(" 12 , 7 ".parse(), Ok(Square::new(12, 7)));
    }

    #[test]
    fn rejects_malformed_squares() {
        assert_eq!(
            "34".parse::<Square>(),
            Err(ParseSquareError::MissingSeparator)
        );
        assert!(matches!(
            "a,b".parse::<Square>(),
            Err(ParseSquareError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            "-1,0".parse::<Square>(),
            Err(ParseSquareError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        let square = Square::new(17, 3);
        assert_eq!(square.to_string().parse(), Ok(square));
    }
}
